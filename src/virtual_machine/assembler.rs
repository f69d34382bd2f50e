//! Assembly language parser and image generator.
//!
//! Converts human-readable assembly into a [`Program`] image. Mnemonics and operand
//! counts come from the [`isa`](super::isa) instruction table.
//!
//! # Syntax
//!
//! ```text
//! label: MNEMONIC operand1, operand2, ...  # optional comment
//! ```
//!
//! - Mnemonics are case-insensitive (`add`, `MUL`, `jnz`, ...)
//! - `42` or `label` is an immediate operand (a label stands for its address)
//! - `[42]` or `[label]` is a position operand
//! - `[rb+3]`, `[rb-3]` and `[rb]` are relative operands (no spaces inside brackets)
//! - `data 1, -2, label` emits raw words
//! - `label:` binds a label to the address of the next emitted word
//! - Comments start with `#`
//! - Commas between operands are optional

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Access, Instruction, MAX_PARAMS};
use crate::virtual_machine::operand::{Decoded, ParameterMode};
use crate::virtual_machine::program::Program;
use crate::virtual_machine::Word;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const COMMENT_CHAR: char = '#';
const LABEL_SUFFIX: char = ':';
const DATA_DIRECTIVE: &str = "data";
const RELATIVE_BASE: &str = "rb";

/// A number or a label reference.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Atom {
    Number(Word),
    Label(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Operand {
    mode: ParameterMode,
    value: Atom,
}

#[derive(Clone, Debug)]
enum Statement {
    Instruction {
        instruction: Instruction,
        operands: Vec<Operand>,
    },
    Data(Vec<Atom>),
}

impl Statement {
    fn width(&self) -> usize {
        match self {
            Statement::Instruction { instruction, .. } => instruction.width(),
            Statement::Data(values) => values.len(),
        }
    }
}

/// A parsed source line: labels defined on it and the statement it holds, if any.
#[derive(Clone, Debug)]
struct Line {
    labels: Vec<String>,
    statement: Option<Statement>,
}

fn syntax_error(line: usize, message: impl Into<String>) -> VMError {
    VMError::AssemblyError {
        line,
        message: message.into(),
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && text != RELATIVE_BASE
}

fn parse_atom(line: usize, text: &str) -> Result<Atom, VMError> {
    if let Ok(n) = text.parse::<Word>() {
        return Ok(Atom::Number(n));
    }
    if is_identifier(text) {
        return Ok(Atom::Label(text.to_string()));
    }
    Err(syntax_error(line, format!("invalid operand `{text}`")))
}

fn parse_operand(line: usize, text: &str) -> Result<Operand, VMError> {
    let Some(inner) = text.strip_prefix('[') else {
        return Ok(Operand {
            mode: ParameterMode::Immediate,
            value: parse_atom(line, text)?,
        });
    };
    let inner = inner
        .strip_suffix(']')
        .ok_or_else(|| syntax_error(line, format!("unterminated operand `{text}`")))?;

    if let Some(offset) = inner.strip_prefix(RELATIVE_BASE) {
        let offset = match offset {
            "" => 0,
            _ if offset.starts_with('+') || offset.starts_with('-') => offset
                .parse::<Word>()
                .map_err(|_| syntax_error(line, format!("invalid relative offset `{text}`")))?,
            _ => {
                // an identifier that merely starts with "rb"
                return Ok(Operand {
                    mode: ParameterMode::Position,
                    value: parse_atom(line, inner)?,
                });
            }
        };
        return Ok(Operand {
            mode: ParameterMode::Relative,
            value: Atom::Number(offset),
        });
    }

    Ok(Operand {
        mode: ParameterMode::Position,
        value: parse_atom(line, inner)?,
    })
}

/// Parses one source line. `number` is 1-based.
fn parse_line(number: usize, raw: &str) -> Result<Line, VMError> {
    let code = raw.split(COMMENT_CHAR).next().unwrap_or("");
    let mut tokens = code
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .peekable();

    let mut labels = Vec::new();
    while let Some(label) = tokens.peek().copied().and_then(|t| t.strip_suffix(LABEL_SUFFIX)) {
        if !is_identifier(label) {
            return Err(syntax_error(number, format!("invalid label `{label}`")));
        }
        labels.push(label.to_string());
        tokens.next();
    }

    let Some(head) = tokens.next() else {
        return Ok(Line {
            labels,
            statement: None,
        });
    };
    let rest: Vec<&str> = tokens.collect();

    let statement = if head.eq_ignore_ascii_case(DATA_DIRECTIVE) {
        if rest.is_empty() {
            return Err(syntax_error(number, "data requires at least one value"));
        }
        let values = rest
            .iter()
            .map(|t| parse_atom(number, t))
            .collect::<Result<Vec<_>, _>>()?;
        Statement::Data(values)
    } else {
        let instruction = Instruction::from_mnemonic(head)
            .ok_or_else(|| syntax_error(number, format!("unknown instruction `{head}`")))?;
        if rest.len() != instruction.arity() {
            return Err(syntax_error(
                number,
                format!(
                    "{} expects {} operand(s), got {}",
                    instruction.mnemonic(),
                    instruction.arity(),
                    rest.len()
                ),
            ));
        }
        let operands = rest
            .iter()
            .map(|t| parse_operand(number, t))
            .collect::<Result<Vec<_>, _>>()?;
        for (operand, access) in operands.iter().zip(instruction.params()) {
            if *access == Access::Write && operand.mode == ParameterMode::Immediate {
                return Err(syntax_error(
                    number,
                    format!(
                        "{} writes to its last operand, which cannot be immediate",
                        instruction.mnemonic()
                    ),
                ));
            }
        }
        Statement::Instruction {
            instruction,
            operands,
        }
    };

    Ok(Line {
        labels,
        statement: Some(statement),
    })
}

fn resolve(atom: &Atom, labels: &HashMap<String, Word>) -> Result<Word, VMError> {
    match atom {
        Atom::Number(n) => Ok(*n),
        Atom::Label(name) => labels
            .get(name)
            .copied()
            .ok_or_else(|| VMError::UndefinedLabel {
                label: name.clone(),
            }),
    }
}

/// Assembles source text into a program image.
pub fn assemble_source(source: &str) -> Result<Program, VMError> {
    let lines = source
        .lines()
        .enumerate()
        .map(|(i, raw)| parse_line(i + 1, raw))
        .collect::<Result<Vec<_>, _>>()?;

    // Pass 1: lay out addresses
    let mut labels = HashMap::new();
    let mut address: Word = 0;
    for line in &lines {
        for label in &line.labels {
            if labels.insert(label.clone(), address).is_some() {
                return Err(VMError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        if let Some(statement) = &line.statement {
            address += statement.width() as Word;
        }
    }

    // Pass 2: encode
    let mut words = Vec::with_capacity(address as usize);
    for line in &lines {
        match &line.statement {
            None => {}
            Some(Statement::Data(values)) => {
                for value in values {
                    words.push(resolve(value, &labels)?);
                }
            }
            Some(Statement::Instruction {
                instruction,
                operands,
            }) => {
                let mut modes = [ParameterMode::Position; MAX_PARAMS];
                for (slot, operand) in modes.iter_mut().zip(operands) {
                    *slot = operand.mode;
                }
                words.push(
                    Decoded {
                        instruction: *instruction,
                        modes,
                    }
                    .encode(),
                );
                for operand in operands {
                    words.push(resolve(&operand.value, &labels)?);
                }
            }
        }
    }

    if words.is_empty() {
        return Err(VMError::EmptyProgram);
    }
    Ok(Program::new(words))
}

/// Reads and assembles a source file.
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Program, VMError> {
    let source = fs::read_to_string(path.as_ref())
        .map_err(|e| VMError::Io(format!("{}: {e}", path.as_ref().display())))?;
    assemble_source(&source)
}
