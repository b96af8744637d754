//! CPU emulation for the LS-8.
//!
//! This module implements the complete LS-8 architecture:
//! - 256 bytes of RAM
//! - 8 general-purpose registers (R7 reserved as the stack pointer)
//! - equal/greater/less comparison flags
//! - 8-instruction set with conditional jumps

pub mod memory;
pub mod registers;
pub mod alu;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Registers, Flags, RegisterError};
pub use alu::AluOp;
pub use decode::{Instruction, Op, DecodeError};
pub use execute::{Cpu, CpuError, CpuState};
