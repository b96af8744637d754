//! LS-8 register file and flags.
//!
//! The LS-8 has 8 general-purpose 8-bit registers, R0 through R7. R7 is
//! reserved by convention as the stack pointer, though no stack
//! instructions exist in this instruction set.
//!
//! The FL register holds three comparison flags (equal, greater, less),
//! set by CMP and consumed by the conditional jumps.

use serde::{Serialize, Deserialize};
use std::cmp::Ordering;
use thiserror::Error;

/// The number of general-purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// Register index reserved as the stack pointer.
pub const SP: usize = 7;

/// The LS-8 register file: 8 one-byte registers.
///
/// Register values wrap modulo 256 under arithmetic; that is the defined
/// numeric behavior of the machine, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    regs: [u8; NUM_REGISTERS],
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGISTERS],
        }
    }

    /// Read a register by index (0-7).
    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, RegisterError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::InvalidRegister(index))
    }

    /// Write a register by index (0-7).
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), RegisterError> {
        match self.regs.get_mut(index as usize) {
            Some(reg) => {
                *reg = value;
                Ok(())
            }
            None => Err(RegisterError::InvalidRegister(index)),
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGISTERS];
    }

    /// All register values in order (for tracing and state dumps).
    pub fn as_slice(&self) -> &[u8] {
        &self.regs
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// The FL register: three comparison flags.
///
/// A CMP sets exactly one of the three and clears the other two; before
/// the first CMP all three are false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Set when the compared values were equal.
    pub equal: bool,
    /// Set when the first compared value was greater.
    pub greater: bool,
    /// Set when the first compared value was less.
    pub less: bool,
}

impl Flags {
    /// Create a flags register with all flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a comparison result, setting exactly one flag.
    pub fn set_compare(&mut self, ordering: Ordering) {
        self.equal = ordering == Ordering::Equal;
        self.greater = ordering == Ordering::Greater;
        self.less = ordering == Ordering::Less;
    }

    /// Clear all flags.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Errors that can occur during register file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("invalid register index: {0} (valid: 0-7)")]
    InvalidRegister(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_get_set() {
        let mut regs = Registers::new();

        regs.set(0, 42).unwrap();
        regs.set(7, 0xF4).unwrap();

        assert_eq!(regs.get(0).unwrap(), 42);
        assert_eq!(regs.get(7).unwrap(), 0xF4);
        assert_eq!(regs.get(3).unwrap(), 0);
    }

    #[test]
    fn test_register_bounds() {
        let mut regs = Registers::new();

        assert_eq!(regs.get(8), Err(RegisterError::InvalidRegister(8)));
        assert_eq!(regs.set(255, 1), Err(RegisterError::InvalidRegister(255)));
    }

    #[test]
    fn test_flags_start_cleared() {
        let flags = Flags::new();
        assert!(!flags.equal && !flags.greater && !flags.less);
    }

    #[test]
    fn test_flags_mutually_exclusive() {
        let mut flags = Flags::new();

        flags.set_compare(Ordering::Equal);
        assert!(flags.equal && !flags.greater && !flags.less);

        flags.set_compare(Ordering::Greater);
        assert!(!flags.equal && flags.greater && !flags.less);

        flags.set_compare(Ordering::Less);
        assert!(!flags.equal && !flags.greater && flags.less);
    }
}
