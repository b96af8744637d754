//! # LS-8 Emulator
//!
//! An emulator for the LS-8, an 8-bit educational stored-program computer:
//! 256 bytes of RAM, 8 general-purpose registers, a three-flag comparison
//! register, and a small instruction set with conditional jumps.

pub mod cpu;
pub mod asm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Flags, Instruction, Op};
pub use asm::{
    assemble, disassemble, AssemblerError, LoadError, load_program_file, parse_program,
    save_program_file,
};
