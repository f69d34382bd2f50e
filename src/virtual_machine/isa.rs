//! Instruction Set Architecture (ISA) definitions.
//!
//! Defines the Intcode instruction set. The [`for_each_instruction!`](crate::for_each_instruction)
//! macro holds the canonical instruction table and invokes a callback macro for code
//! generation, so the decoder, the assembler and the disassembler all read from the
//! same definitions.
//!
//! This module generates:
//! - The [`Instruction`] enum with opcode mappings
//! - Mnemonic lookup in both directions
//! - The per-instruction parameter layout ([`Access`] of each parameter)
//!
//! # Instruction word format
//!
//! An instruction word is a non-negative decimal number:
//! - The two lowest digits hold the opcode
//! - Each higher digit holds the mode of one parameter, lowest first
//!   (`0` position, `1` immediate, `2` relative; missing digits are `0`)
//!
//! `1002` is therefore `mul` with modes `[position, immediate, position]`.

use crate::virtual_machine::Word;

/// How an instruction uses one of its parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    /// The parameter is a value source.
    Read,
    /// The parameter names the memory cell that receives the result.
    Write,
}

/// Maximum number of parameters any instruction takes.
pub const MAX_PARAMS: usize = 3;

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Arithmetic
            // =========================
            /// add a, b, dst ; dst = a + b
            Add = 1, "add" => [a: Read, b: Read, dst: Write],
            /// mul a, b, dst ; dst = a * b
            Mul = 2, "mul" => [a: Read, b: Read, dst: Write],
            // =========================
            // I/O
            // =========================
            /// in dst ; dst = next input value, suspends while the input queue is empty
            In = 3, "in" => [dst: Write],
            /// out a ; appends a to the output queue
            Out = 4, "out" => [a: Read],
            // =========================
            // Control flow
            // =========================
            /// jnz a, target ; if a != 0 then pc = target
            JumpIfTrue = 5, "jnz" => [a: Read, target: Read],
            /// jz a, target ; if a == 0 then pc = target
            JumpIfFalse = 6, "jz" => [a: Read, target: Read],
            // =========================
            // Comparison
            // =========================
            /// lt a, b, dst ; dst = (a < b) as 1 or 0
            LessThan = 7, "lt" => [a: Read, b: Read, dst: Write],
            /// eq a, b, dst ; dst = (a == b) as 1 or 0
            Equals = 8, "eq" => [a: Read, b: Read, dst: Write],
            // =========================
            // Machine state
            // =========================
            /// arb a ; relative_base += a
            AdjustBase = 9, "arb" => [a: Read],
            /// hlt ; stops the machine
            Halt = 99, "hlt" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl Instruction {
            /// Every instruction, in opcode order.
            pub const ALL: &'static [Instruction] = &[$( Instruction::$name, )*];

            /// Maps a two-digit opcode to its instruction.
            pub const fn from_opcode(opcode: Word) -> Option<Self> {
                match opcode {
                    $( $opcode => Some(Instruction::$name), )*
                    _ => None,
                }
            }

            /// Looks up an instruction by assembly mnemonic (case-insensitive).
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($mnemonic) {
                        return Some(Instruction::$name);
                    }
                )*
                None
            }

            /// Returns the opcode (two lowest digits of the instruction word).
            pub const fn opcode(&self) -> Word {
                match self {
                    $( Instruction::$name => $opcode, )*
                }
            }

            /// Returns the assembly mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $mnemonic, )*
                }
            }

            /// Returns how each parameter is used, in encoding order.
            pub const fn params(&self) -> &'static [Access] {
                match self {
                    $( Instruction::$name => &[$( Access::$kind ),*], )*
                }
            }
        }
    };
}

for_each_instruction!(define_instructions);

impl Instruction {
    /// Number of parameter words following the instruction word.
    pub const fn arity(&self) -> usize {
        self.params().len()
    }

    /// Total words occupied by the instruction, including the instruction word.
    pub const fn width(&self) -> usize {
        self.arity() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_roundtrip() {
        for instr in Instruction::ALL {
            assert_eq!(Instruction::from_opcode(instr.opcode()), Some(*instr));
            assert_eq!(Instruction::from_mnemonic(instr.mnemonic()), Some(*instr));
        }
    }

    #[test]
    fn unknown_opcodes() {
        assert_eq!(Instruction::from_opcode(0), None);
        assert_eq!(Instruction::from_opcode(10), None);
        assert_eq!(Instruction::from_opcode(98), None);
        assert_eq!(Instruction::from_mnemonic("nop"), None);
    }

    #[test]
    fn write_parameter_is_always_last() {
        for instr in Instruction::ALL {
            let params = instr.params();
            assert!(params.len() <= MAX_PARAMS);
            if let Some(pos) = params.iter().position(|a| *a == Access::Write) {
                assert_eq!(pos, params.len() - 1, "{}", instr.mnemonic());
            }
        }
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        assert_eq!(Instruction::from_mnemonic("ADD"), Some(Instruction::Add));
        assert_eq!(Instruction::from_mnemonic("Jnz"), Some(Instruction::JumpIfTrue));
        assert_eq!(Instruction::Halt.width(), 1);
        assert_eq!(Instruction::Equals.width(), 4);
    }
}
