use crate::virtual_machine::{Address, Word};

/// Errors that can occur while loading, assembling or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VMError {
    /// Instruction word does not map to a known opcode.
    #[error("invalid opcode {opcode} at address {address}")]
    InvalidOpcode { opcode: Word, address: Address },
    /// Parameter mode digit is not 0, 1 or 2.
    #[error("invalid parameter mode {mode} at address {address}")]
    InvalidParameterMode { mode: Word, address: Address },
    /// Write target encoded with immediate mode.
    #[error("opcode {opcode} at address {address} writes through an immediate parameter")]
    ImmediateWrite { opcode: Word, address: Address },
    /// A word used as an address (operand, jump target) is negative.
    #[error("negative address {value} used by instruction at address {pc}")]
    NegativeAddress { value: Word, pc: Address },
    /// 64-bit arithmetic would overflow.
    #[error("arithmetic overflow in opcode {opcode} at address {address}")]
    ArithmeticOverflow { opcode: Word, address: Address },
    /// Caller-imposed instruction budget ran out before the program suspended.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
    /// Program blocked on input while being run to completion.
    #[error("program blocked on input at address {pc} with no input left")]
    InputExhausted { pc: Address },
    /// Program image contains a token that is not a signed integer.
    #[error("invalid program word {token:?} at position {position}")]
    ProgramParse { position: usize, token: String },
    /// Program image contains no words.
    #[error("program image is empty")]
    EmptyProgram,
    /// Assembly error with line number context.
    #[error("line {line}: {message}")]
    AssemblyError { line: usize, message: String },
    /// Label defined more than once.
    #[error("duplicate label: {label}")]
    DuplicateLabel { label: String },
    /// Reference to undefined label.
    #[error("undefined label: {label}")]
    UndefinedLabel { label: String },
    /// File I/O error while reading a program or source file.
    #[error("io error: {0}")]
    Io(String),
}

impl VMError {
    /// Returns true for errors caused by a corrupt or invalid program.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            VMError::InvalidOpcode { .. }
                | VMError::InvalidParameterMode { .. }
                | VMError::ImmediateWrite { .. }
                | VMError::NegativeAddress { .. }
                | VMError::ArithmeticOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_classification() {
        assert!(
            VMError::InvalidOpcode {
                opcode: 42,
                address: 0
            }
            .is_malformed()
        );
        assert!(
            VMError::ImmediateWrite {
                opcode: 1,
                address: 4
            }
            .is_malformed()
        );
        assert!(!VMError::StepLimitExceeded { limit: 10 }.is_malformed());
        assert!(!VMError::EmptyProgram.is_malformed());
    }

    #[test]
    fn display_names_offending_address() {
        let err = VMError::InvalidOpcode {
            opcode: 42,
            address: 7,
        };
        assert_eq!(err.to_string(), "invalid opcode 42 at address 7");
    }
}
