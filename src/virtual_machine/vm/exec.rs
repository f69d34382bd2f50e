use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Instruction, MAX_PARAMS};
use crate::virtual_machine::{Address, Word};

/// Resolved operands of one instruction.
///
/// Read parameters are already dereferenced to values; the write parameter, if any,
/// is resolved to the target address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Operands {
    pub(super) instruction: Instruction,
    /// Address of the instruction word.
    pub(super) address: Address,
    pub(super) reads: [Word; MAX_PARAMS],
    pub(super) dest: Option<Address>,
}

impl Operands {
    fn read(&self, index: usize) -> Word {
        self.reads[index]
    }

    fn dest(&self) -> Address {
        // Decoding guarantees every instruction with a write parameter resolves it.
        self.dest.unwrap_or_default()
    }

    fn overflow(&self) -> VMError {
        VMError::ArithmeticOverflow {
            opcode: self.instruction.opcode(),
            address: self.address,
        }
    }
}

/// State change requested by an instruction handler.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum Effect {
    /// Write `value` at `address`, then advance.
    Store { address: Address, value: Word },
    /// Consume one input value into `address`, or suspend if none is queued.
    Input { address: Address },
    /// Append to the output queue, then advance.
    Output(Word),
    /// Set the program counter to `target` (not yet validated as an address).
    Jump(Word),
    /// Add `delta` to the relative base, then advance.
    AdjustBase(Word),
    /// Advance without any other change.
    Continue,
    Halt,
}

type Handler = fn(&Operands) -> Result<Effect, VMError>;

/// Returns the handler implementing `instruction`.
pub(super) fn handler(instruction: Instruction) -> Handler {
    match instruction {
        Instruction::Add => op_add,
        Instruction::Mul => op_mul,
        Instruction::In => op_in,
        Instruction::Out => op_out,
        Instruction::JumpIfTrue => op_jump_if_true,
        Instruction::JumpIfFalse => op_jump_if_false,
        Instruction::LessThan => op_less_than,
        Instruction::Equals => op_equals,
        Instruction::AdjustBase => op_adjust_base,
        Instruction::Halt => op_halt,
    }
}

fn op_add(ops: &Operands) -> Result<Effect, VMError> {
    let value = ops
        .read(0)
        .checked_add(ops.read(1))
        .ok_or_else(|| ops.overflow())?;
    Ok(Effect::Store {
        address: ops.dest(),
        value,
    })
}

fn op_mul(ops: &Operands) -> Result<Effect, VMError> {
    let value = ops
        .read(0)
        .checked_mul(ops.read(1))
        .ok_or_else(|| ops.overflow())?;
    Ok(Effect::Store {
        address: ops.dest(),
        value,
    })
}

fn op_in(ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::Input {
        address: ops.dest(),
    })
}

fn op_out(ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::Output(ops.read(0)))
}

fn op_jump_if_true(ops: &Operands) -> Result<Effect, VMError> {
    Ok(if ops.read(0) != 0 {
        Effect::Jump(ops.read(1))
    } else {
        Effect::Continue
    })
}

fn op_jump_if_false(ops: &Operands) -> Result<Effect, VMError> {
    Ok(if ops.read(0) == 0 {
        Effect::Jump(ops.read(1))
    } else {
        Effect::Continue
    })
}

fn op_less_than(ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::Store {
        address: ops.dest(),
        value: Word::from(ops.read(0) < ops.read(1)),
    })
}

fn op_equals(ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::Store {
        address: ops.dest(),
        value: Word::from(ops.read(0) == ops.read(1)),
    })
}

fn op_adjust_base(ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::AdjustBase(ops.read(0)))
}

fn op_halt(_ops: &Operands) -> Result<Effect, VMError> {
    Ok(Effect::Halt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(instruction: Instruction, a: Word, b: Word, dest: Option<Address>) -> Operands {
        Operands {
            instruction,
            address: 12,
            reads: [a, b, 0],
            dest,
        }
    }

    #[test]
    fn arithmetic_handlers_store_result() {
        assert_eq!(
            handler(Instruction::Add)(&ops(Instruction::Add, 2, 3, Some(7))),
            Ok(Effect::Store {
                address: 7,
                value: 5
            })
        );
        assert_eq!(
            handler(Instruction::Mul)(&ops(Instruction::Mul, -4, 3, Some(0))),
            Ok(Effect::Store {
                address: 0,
                value: -12
            })
        );
    }

    #[test]
    fn arithmetic_overflow_is_reported() {
        assert_eq!(
            handler(Instruction::Mul)(&ops(Instruction::Mul, Word::MAX, 2, Some(0))),
            Err(VMError::ArithmeticOverflow {
                opcode: 2,
                address: 12
            })
        );
        assert!(handler(Instruction::Add)(&ops(Instruction::Add, Word::MAX, 1, Some(0))).is_err());
    }

    #[test]
    fn jumps_depend_on_condition() {
        let jnz = handler(Instruction::JumpIfTrue);
        assert_eq!(jnz(&ops(Instruction::JumpIfTrue, 1, 40, None)), Ok(Effect::Jump(40)));
        assert_eq!(jnz(&ops(Instruction::JumpIfTrue, 0, 40, None)), Ok(Effect::Continue));

        let jz = handler(Instruction::JumpIfFalse);
        assert_eq!(jz(&ops(Instruction::JumpIfFalse, 0, 40, None)), Ok(Effect::Jump(40)));
        assert_eq!(jz(&ops(Instruction::JumpIfFalse, -3, 40, None)), Ok(Effect::Continue));
    }

    #[test]
    fn comparisons_store_flags() {
        let lt = handler(Instruction::LessThan);
        assert_eq!(
            lt(&ops(Instruction::LessThan, 1, 2, Some(3))),
            Ok(Effect::Store {
                address: 3,
                value: 1
            })
        );
        let eq = handler(Instruction::Equals);
        assert_eq!(
            eq(&ops(Instruction::Equals, 1, 2, Some(3))),
            Ok(Effect::Store {
                address: 3,
                value: 0
            })
        );
    }
}
