//! Core virtual machine implementation.
//!
//! A [`Vm`] owns its memory, program counter, relative base and I/O queues. It runs
//! until it halts or until it needs input that has not arrived yet; in the latter case
//! it suspends on the input instruction and resumes transparently on the next
//! [`Vm::run`] or [`Vm::step`] once input is pushed.

pub mod exec;
pub mod io;
pub mod memory;

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Access, MAX_PARAMS};
use crate::virtual_machine::operand::{Decoded, ParameterMode};
use crate::virtual_machine::program::Program;
use crate::virtual_machine::{Address, Word};
use exec::{Effect, Operands};
use io::IoChannel;
use memory::Memory;

/// Execution status of a VM instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    /// Ready to execute the instruction at `pc`.
    Runnable,
    /// Suspended on an input instruction with an empty input queue.
    BlockedOnInput,
    /// Executed `hlt`. Terminal.
    Halted,
}

/// Result of executing a single instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// An instruction executed without producing output.
    Advanced,
    /// An `out` instruction appended a value to the output queue.
    ProducedOutput,
    /// An `in` instruction found the input queue empty; nothing changed.
    BlockedOnInput,
    /// The machine is halted.
    Halted,
}

/// Intcode virtual machine instance.
#[derive(Clone, Debug)]
pub struct Vm {
    memory: Memory,
    /// Program counter.
    pc: Address,
    relative_base: Word,
    io: IoChannel,
    status: Status,
    /// Instructions executed so far (suspended input attempts are not counted).
    steps: u64,
    /// Optional identity, used by drivers that run many instances.
    identity: Option<usize>,
}

impl Vm {
    /// Creates an instance from a program image, optionally queuing one startup input
    /// (a network address, a mode flag, ...).
    pub fn new(program: &Program, startup_input: Option<Word>) -> Self {
        let mut io = IoChannel::new();
        io.extend(startup_input);
        Self {
            memory: Memory::from_image(program.words()),
            pc: 0,
            relative_base: 0,
            io,
            status: Status::Runnable,
            steps: 0,
            identity: None,
        }
    }

    /// Tags the instance with an identity.
    pub fn with_identity(mut self, identity: usize) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Runs `program` to completion with the given inputs and returns every output.
    ///
    /// Returns [`VMError::InputExhausted`] if the program asks for more input than
    /// provided.
    pub fn run_program(
        program: &Program,
        inputs: impl IntoIterator<Item = Word>,
    ) -> Result<Vec<Word>, VMError> {
        let mut vm = Vm::new(program, None);
        vm.extend_input(inputs);
        match vm.run()? {
            Status::Halted => Ok(vm.drain_output()),
            _ => Err(VMError::InputExhausted { pc: vm.pc }),
        }
    }

    pub fn push_input(&mut self, value: Word) {
        self.io.push_input(value);
    }

    pub fn extend_input(&mut self, values: impl IntoIterator<Item = Word>) {
        self.io.extend(values);
    }

    pub fn try_pop_output(&mut self) -> Option<Word> {
        self.io.pop_output()
    }

    pub fn drain_output(&mut self) -> Vec<Word> {
        self.io.drain_output()
    }

    pub fn pending_input(&self) -> usize {
        self.io.pending_input()
    }

    pub fn pending_output(&self) -> usize {
        self.io.pending_output()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn relative_base(&self) -> Word {
        self.relative_base
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn identity(&self) -> Option<usize> {
        self.identity
    }

    /// Executes instructions until the machine blocks on input or halts.
    ///
    /// Calling `run` again after pushing input resumes on the same input instruction.
    pub fn run(&mut self) -> Result<Status, VMError> {
        loop {
            match self.step()? {
                StepOutcome::Advanced | StepOutcome::ProducedOutput => {}
                StepOutcome::BlockedOnInput | StepOutcome::Halted => return Ok(self.status),
            }
        }
    }

    /// Like [`Vm::run`], but fails once `max_steps` instructions have executed during
    /// this call without the machine suspending or halting.
    pub fn run_bounded(&mut self, max_steps: u64) -> Result<Status, VMError> {
        let mut executed = 0u64;
        loop {
            if executed >= max_steps {
                return Err(VMError::StepLimitExceeded { limit: max_steps });
            }
            match self.step()? {
                StepOutcome::Advanced | StepOutcome::ProducedOutput => executed += 1,
                StepOutcome::BlockedOnInput | StepOutcome::Halted => return Ok(self.status),
            }
        }
    }

    /// Decodes and executes the instruction at `pc`.
    pub fn step(&mut self) -> Result<StepOutcome, VMError> {
        if self.status == Status::Halted {
            return Ok(StepOutcome::Halted);
        }

        let address = self.pc;
        let decoded = Decoded::decode(self.memory.get(address), address)?;
        let operands = self.resolve(&decoded, address)?;
        let effect = exec::handler(decoded.instruction)(&operands)?;
        let next = address + decoded.instruction.width() as Address;

        let outcome = match effect {
            Effect::Store { address, value } => {
                self.memory.set(address, value);
                self.pc = next;
                StepOutcome::Advanced
            }
            Effect::Input { address } => match self.io.read() {
                Some(value) => {
                    self.memory.set(address, value);
                    self.pc = next;
                    StepOutcome::Advanced
                }
                None => {
                    self.status = Status::BlockedOnInput;
                    return Ok(StepOutcome::BlockedOnInput);
                }
            },
            Effect::Output(value) => {
                self.io.write(value);
                self.pc = next;
                StepOutcome::ProducedOutput
            }
            Effect::Jump(target) => {
                self.pc = Self::to_address(target, address)?;
                StepOutcome::Advanced
            }
            Effect::AdjustBase(delta) => {
                self.relative_base =
                    self.relative_base
                        .checked_add(delta)
                        .ok_or(VMError::ArithmeticOverflow {
                            opcode: decoded.instruction.opcode(),
                            address,
                        })?;
                self.pc = next;
                StepOutcome::Advanced
            }
            Effect::Continue => {
                self.pc = next;
                StepOutcome::Advanced
            }
            Effect::Halt => {
                self.status = Status::Halted;
                self.steps += 1;
                return Ok(StepOutcome::Halted);
            }
        };

        self.status = Status::Runnable;
        self.steps += 1;
        Ok(outcome)
    }

    /// Resolves every parameter of `decoded` into values (reads) and the target
    /// address (write).
    fn resolve(&self, decoded: &Decoded, address: Address) -> Result<Operands, VMError> {
        let mut reads = [0; MAX_PARAMS];
        let mut dest = None;

        for (i, access) in decoded.instruction.params().iter().enumerate() {
            let param = self.memory.get(address + 1 + i as Address);
            let mode = decoded.mode(i);
            match access {
                Access::Read => {
                    reads[i] = match mode {
                        ParameterMode::Immediate => param,
                        _ => self.memory.get(self.param_address(mode, param, address)?),
                    };
                }
                Access::Write => {
                    if mode == ParameterMode::Immediate {
                        return Err(VMError::ImmediateWrite {
                            opcode: decoded.instruction.opcode(),
                            address,
                        });
                    }
                    dest = Some(self.param_address(mode, param, address)?);
                }
            }
        }

        Ok(Operands {
            instruction: decoded.instruction,
            address,
            reads,
            dest,
        })
    }

    /// Address named by a position or relative parameter.
    fn param_address(
        &self,
        mode: ParameterMode,
        param: Word,
        pc: Address,
    ) -> Result<Address, VMError> {
        let target = match mode {
            ParameterMode::Relative => param.checked_add(self.relative_base).ok_or(
                VMError::ArithmeticOverflow {
                    opcode: self.memory.get(pc) % 100,
                    address: pc,
                },
            )?,
            _ => param,
        };
        Self::to_address(target, pc)
    }

    fn to_address(value: Word, pc: Address) -> Result<Address, VMError> {
        Address::try_from(value).map_err(|_| VMError::NegativeAddress { value, pc })
    }
}
