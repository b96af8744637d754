//! Assembler, disassembler, and program-image loader for LS-8 programs.
//!
//! This module provides:
//! - A loader for `.ls8` text program images (one binary byte per line)
//! - A simple two-pass assembler (text → program bytes)
//! - A disassembler (program bytes → readable text)

pub mod assembler;
pub mod disasm;
pub mod program;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_instruction};
pub use program::{load_program_file, parse_program, save_program_file, LoadError};
