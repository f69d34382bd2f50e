//! Intcode library.
//!
//! Provides the Intcode virtual machine with its assembler and disassembler, and a
//! simulated packet network that runs many instances under an idle/NAT monitor.

pub mod network;
pub mod utils;
pub mod virtual_machine;
