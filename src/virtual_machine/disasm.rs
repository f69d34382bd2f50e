//! Disassembler for program images.
//!
//! Produces a structured view ([`Disassembly`], [`Line`]) and a text format via
//! [`std::fmt::Display`]. The text uses the [`assembler`](super::assembler) syntax, one
//! statement per line with the address in a trailing comment, so it assembles back to
//! the same image.
//!
//! Decoding is a linear sweep: Intcode freely mixes code and data (and programs patch
//! themselves), so anything that does not decode as a complete instruction is shown as
//! `data`. So is an instruction word with stray mode digits above its last parameter,
//! since re-assembling it would drop those digits.

use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::operand::{Decoded, ParameterMode};
use crate::virtual_machine::program::Program;
use crate::virtual_machine::{Address, Word};
use std::fmt;

/// Column at which the address comment starts.
const COMMENT_COLUMN: usize = 28;

/// One disassembled statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    Instruction {
        address: Address,
        decoded: Decoded,
        params: Vec<Word>,
    },
    Data {
        address: Address,
        value: Word,
    },
}

impl Line {
    pub fn address(&self) -> Address {
        match self {
            Line::Instruction { address, .. } | Line::Data { address, .. } => *address,
        }
    }

    /// The instruction, if this line decoded as one.
    pub fn instruction(&self) -> Option<Instruction> {
        match self {
            Line::Instruction { decoded, .. } => Some(decoded.instruction),
            Line::Data { .. } => None,
        }
    }

    fn statement(&self) -> String {
        match self {
            Line::Data { value, .. } => format!("data {value}"),
            Line::Instruction {
                decoded, params, ..
            } => {
                let operands: Vec<String> = params
                    .iter()
                    .enumerate()
                    .map(|(i, param)| render_operand(decoded.mode(i), *param))
                    .collect();
                if operands.is_empty() {
                    decoded.instruction.mnemonic().to_string()
                } else {
                    format!("{} {}", decoded.instruction.mnemonic(), operands.join(", "))
                }
            }
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<width$}# {}",
            self.statement(),
            self.address(),
            width = COMMENT_COLUMN
        )
    }
}

fn render_operand(mode: ParameterMode, param: Word) -> String {
    match mode {
        ParameterMode::Immediate => param.to_string(),
        ParameterMode::Position => format!("[{param}]"),
        ParameterMode::Relative if param == 0 => "[rb]".to_string(),
        ParameterMode::Relative if param > 0 => format!("[rb+{param}]"),
        ParameterMode::Relative => format!("[rb{param}]"),
    }
}

/// Disassembled program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Disassembly {
    lines: Vec<Line>,
}

impl Disassembly {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Disassembles `program` with a linear sweep from address 0.
pub fn disassemble(program: &Program) -> Disassembly {
    let words = program.words();
    let mut lines = Vec::new();
    let mut pc = 0usize;

    while pc < words.len() {
        let address = pc as Address;
        let line = Decoded::decode(words[pc], address)
            .ok()
            .filter(|decoded| {
                pc + decoded.instruction.width() <= words.len()
                    && !decoded.writes_immediate()
                    && decoded.encode() == words[pc]
            })
            .map(|decoded| Line::Instruction {
                address,
                decoded,
                params: words[pc + 1..pc + decoded.instruction.width()].to_vec(),
            })
            .unwrap_or(Line::Data {
                address,
                value: words[pc],
            });

        pc += match &line {
            Line::Instruction { decoded, .. } => decoded.instruction.width(),
            Line::Data { .. } => 1,
        };
        lines.push(line);
    }

    Disassembly { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_machine::assembler::assemble_source;

    fn program(words: &[Word]) -> Program {
        Program::from(words)
    }

    #[test]
    fn renders_all_modes() {
        let d = disassemble(&program(&[1002, 4, 3, 4, 204, -1, 21101, 2, 3, 0, 99]));
        let statements: Vec<String> = d.lines().iter().map(|l| l.statement()).collect();
        assert_eq!(
            statements,
            vec!["mul [4], 3, [4]", "out [rb-1]", "add 2, 3, [rb]", "hlt"]
        );
        assert_eq!(d.lines()[1].address(), 4);
        assert_eq!(d.lines()[3].instruction(), Some(Instruction::Halt));
    }

    #[test]
    fn undecodable_words_become_data() {
        let d = disassemble(&program(&[99, 0, 42, 1, 5]));
        let statements: Vec<String> = d.lines().iter().map(|l| l.statement()).collect();
        // `1, 5` would be an add whose operands run past the image
        assert_eq!(statements, vec!["hlt", "data 0", "data 42", "data 1", "data 5"]);

        let d = disassemble(&program(&[11101, 1, 1, 5]));
        assert_eq!(d.lines().len(), 4);
        assert!(d.lines().iter().all(|l| l.instruction().is_none()));
    }

    #[test]
    fn stray_mode_digits_become_data() {
        let image = program(&[1104, 7, 99, 1099]);
        let d = disassemble(&image);
        let statements: Vec<String> = d.lines().iter().map(|l| l.statement()).collect();
        assert_eq!(
            statements,
            vec!["data 1104", "data 7", "hlt", "data 1099"]
        );
        assert_eq!(assemble_source(&d.to_string()).unwrap(), image);
    }

    #[test]
    fn display_includes_address_comment() {
        let d = disassemble(&program(&[104, 7, 99]));
        let text = d.to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("out 7"));
        assert!(first.ends_with("# 0"));
    }

    #[test]
    fn output_reassembles_to_same_image() {
        let image = program(&[
            3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36, 98, 0,
            0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000, 1, 20, 4,
            20, 1105, 1, 46, 98, 99,
        ]);
        let text = disassemble(&image).to_string();
        assert_eq!(assemble_source(&text).unwrap(), image);
    }
}
