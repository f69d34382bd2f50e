//! Instruction word decoding and encoding.
//!
//! An instruction word packs the opcode into its two lowest decimal digits and one
//! [`ParameterMode`] per parameter into the digits above. See [`isa`](super::isa)
//! for the instruction table itself.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Access, Instruction, MAX_PARAMS};
use crate::virtual_machine::{Address, Word};

/// How a parameter word is interpreted.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ParameterMode {
    /// The parameter is an address: the operand is `memory[param]`.
    #[default]
    Position = 0,
    /// The parameter is the operand itself. Read-only.
    Immediate = 1,
    /// The parameter is an offset from the relative base: the operand is
    /// `memory[param + relative_base]`.
    Relative = 2,
}

impl ParameterMode {
    /// Decodes a single mode digit.
    pub const fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }

    /// Returns the mode digit.
    pub const fn digit(self) -> Word {
        self as Word
    }
}

/// A fully decoded instruction word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Decoded {
    pub instruction: Instruction,
    /// One mode per parameter slot; slots past the instruction's arity are `Position`.
    pub modes: [ParameterMode; MAX_PARAMS],
}

impl Decoded {
    /// Decodes the instruction word found at `address`.
    ///
    /// Fails on negative words, unknown opcodes and unknown mode digits. Digits above the
    /// instruction's last parameter apply to nothing and are ignored.
    pub fn decode(word: Word, address: Address) -> Result<Self, VMError> {
        if word < 0 {
            return Err(VMError::InvalidOpcode {
                opcode: word,
                address,
            });
        }

        let opcode = word % 100;
        let instruction =
            Instruction::from_opcode(opcode).ok_or(VMError::InvalidOpcode { opcode, address })?;

        let mut modes = [ParameterMode::Position; MAX_PARAMS];
        let mut digits = word / 100;
        for mode in modes.iter_mut().take(instruction.arity()) {
            let digit = digits % 10;
            *mode = ParameterMode::from_digit(digit)
                .ok_or(VMError::InvalidParameterMode { mode: digit, address })?;
            digits /= 10;
        }

        Ok(Self { instruction, modes })
    }

    /// Packs the instruction and its modes back into an instruction word.
    pub fn encode(&self) -> Word {
        let mut word = self.instruction.opcode();
        let mut scale = 100;
        for mode in self.modes.iter().take(self.instruction.arity()) {
            word += mode.digit() * scale;
            scale *= 10;
        }
        word
    }

    /// Mode of parameter `index`.
    pub fn mode(&self, index: usize) -> ParameterMode {
        self.modes[index]
    }

    /// True when the write parameter, if any, is encoded in immediate mode.
    pub fn writes_immediate(&self) -> bool {
        self.instruction
            .params()
            .iter()
            .zip(self.modes)
            .any(|(access, mode)| *access == Access::Write && mode == ParameterMode::Immediate)
    }
}
