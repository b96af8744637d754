//! LS-8 arithmetic/logic unit.
//!
//! The ALU touches only the register file and flags it is handed; it
//! never sees memory or the program counter. Arithmetic wraps modulo 256
//! to match the byte width of the registers.

use crate::cpu::registers::{Flags, RegisterError, Registers};
use serde::{Serialize, Deserialize};

/// An ALU operation.
///
/// Exhaustively matched in [`execute`]; there is no "unsupported
/// operation" path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    /// `reg[a] = (reg[a] + reg[b]) mod 256`
    Add,
    /// `reg[a] = (reg[a] * reg[b]) mod 256`
    Mul,
    /// Compare `reg[a]` with `reg[b]` and set exactly one flag.
    Cmp,
}

/// Perform an ALU operation on registers `a` and `b`.
///
/// `a` and `b` are register indices; CMP compares the values held in
/// those registers, not the indices themselves.
pub fn execute(
    op: AluOp,
    regs: &mut Registers,
    flags: &mut Flags,
    a: u8,
    b: u8,
) -> Result<(), RegisterError> {
    match op {
        AluOp::Add => {
            let result = regs.get(a)?.wrapping_add(regs.get(b)?);
            regs.set(a, result)?;
        }
        AluOp::Mul => {
            let result = regs.get(a)?.wrapping_mul(regs.get(b)?);
            regs.set(a, result)?;
        }
        AluOp::Cmp => {
            let lhs = regs.get(a)?;
            let rhs = regs.get(b)?;
            flags.set_compare(lhs.cmp(&rhs));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn regs_with(a: u8, b: u8) -> Registers {
        let mut regs = Registers::new();
        regs.set(0, a).unwrap();
        regs.set(1, b).unwrap();
        regs
    }

    #[test]
    fn test_add_wraps() {
        let mut regs = regs_with(250, 10);
        let mut flags = Flags::new();

        execute(AluOp::Add, &mut regs, &mut flags, 0, 1).unwrap();

        assert_eq!(regs.get(0).unwrap(), 4); // (250 + 10) mod 256
    }

    #[test]
    fn test_mul_wraps() {
        let mut regs = regs_with(16, 32);
        let mut flags = Flags::new();

        execute(AluOp::Mul, &mut regs, &mut flags, 0, 1).unwrap();

        assert_eq!(regs.get(0).unwrap(), 0); // (16 * 32) mod 256
    }

    #[test]
    fn test_cmp_compares_contents_not_indices() {
        // Register 0 holds the larger value even though 0 < 1 as indices.
        let mut regs = regs_with(7, 3);
        let mut flags = Flags::new();

        execute(AluOp::Cmp, &mut regs, &mut flags, 0, 1).unwrap();

        assert!(flags.greater && !flags.equal && !flags.less);
    }

    #[test]
    fn test_cmp_all_orderings() {
        for (a, b, expect) in [(5u8, 5u8, "eq"), (7, 3, "gt"), (3, 7, "lt")] {
            let mut regs = regs_with(a, b);
            let mut flags = Flags::new();

            execute(AluOp::Cmp, &mut regs, &mut flags, 0, 1).unwrap();

            match expect {
                "eq" => assert!(flags.equal && !flags.greater && !flags.less),
                "gt" => assert!(!flags.equal && flags.greater && !flags.less),
                _ => assert!(!flags.equal && !flags.greater && flags.less),
            }
        }
    }

    #[test]
    fn test_invalid_register_rejected() {
        let mut regs = Registers::new();
        let mut flags = Flags::new();

        let err = execute(AluOp::Add, &mut regs, &mut flags, 8, 0).unwrap_err();
        assert_eq!(err, RegisterError::InvalidRegister(8));
    }

    proptest! {
        #[test]
        fn prop_add_matches_mod_256(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            let mut flags = Flags::new();

            execute(AluOp::Add, &mut regs, &mut flags, 0, 1).unwrap();

            prop_assert_eq!(
                regs.get(0).unwrap() as u16,
                (a as u16 + b as u16) % 256
            );
        }

        #[test]
        fn prop_mul_matches_mod_256(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            let mut flags = Flags::new();

            execute(AluOp::Mul, &mut regs, &mut flags, 0, 1).unwrap();

            prop_assert_eq!(
                regs.get(0).unwrap() as u16,
                ((a as u16 * b as u16) % 256)
            );
        }

        #[test]
        fn prop_cmp_sets_exactly_one_flag(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            let mut flags = Flags::new();

            execute(AluOp::Cmp, &mut regs, &mut flags, 0, 1).unwrap();

            let set = flags.equal as u8 + flags.greater as u8 + flags.less as u8;
            prop_assert_eq!(set, 1);
        }
    }
}
