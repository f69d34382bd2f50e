//! Intcode virtual machine.
//!
//! Intcode programs are flat arrays of signed integers. The VM fetches an instruction
//! word at the program counter, decodes its opcode and parameter modes, executes it
//! and moves on, until it halts or needs input that is not there yet.
//!
//! # Architecture
//!
//! - **Memory**: sparse, unbounded, word addressed; unwritten cells read as zero
//! - **Registers**: program counter and relative base
//! - **I/O**: FIFO input and output queues; reading empty input suspends the machine
//!   instead of failing
//! - **Instruction format**: opcode in the two low decimal digits, one parameter mode
//!   per higher digit (position, immediate, relative)
//! - **Arithmetic**: 64-bit signed; overflow is an error, never a silent wrap
//!
//! # Modules
//!
//! - [`assembler`]: Assembly parsing and image generation
//! - [`disasm`]: Linear disassembler producing assembler-compatible text
//! - [`errors`]: Load, assembly and execution error types
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`operand`]: Instruction word decoding and parameter modes
//! - [`program`]: Program image parsing and rendering
//! - [`vm`]: Virtual machine instance, memory, I/O queues and execution

pub mod assembler;
pub mod disasm;
pub mod errors;
pub mod isa;
pub mod operand;
pub mod program;
pub mod vm;

/// A memory cell, operand or I/O value.
pub type Word = i64;

/// A memory address. Addresses are never negative.
pub type Address = u64;
