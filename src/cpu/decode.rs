//! Instruction decoder for the LS-8.
//!
//! LS-8 instructions are one opcode byte followed by zero, one, or two
//! operand bytes. The top two bits of the opcode encode the operand
//! count, so the engine always knows how many bytes to fetch before it
//! knows what the instruction does.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// An LS-8 operation (the decoded opcode byte, without operands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Halt execution.
    Hlt,
    /// Load an immediate value into a register.
    Ldi,
    /// Print the numeric value of a register.
    Prn,
    /// Multiply two registers (result in the first).
    Mul,
    /// Compare two registers and set the flags.
    Cmp,
    /// Jump to the address held in a register.
    Jmp,
    /// Jump if the equal flag is set.
    Jeq,
    /// Jump if the equal flag is clear.
    Jne,
}

impl Op {
    // Opcode byte values. Bits 7-6 encode the operand count.
    pub const HLT: u8 = 0b0000_0001;
    pub const LDI: u8 = 0b1000_0010;
    pub const PRN: u8 = 0b0100_0111;
    pub const MUL: u8 = 0b1010_0010;
    pub const CMP: u8 = 0b1010_0111;
    pub const JMP: u8 = 0b0101_0100;
    pub const JEQ: u8 = 0b0101_0101;
    pub const JNE: u8 = 0b0101_0110;

    /// All operations, in opcode order.
    pub const ALL: [Op; 8] = [
        Op::Hlt,
        Op::Ldi,
        Op::Prn,
        Op::Mul,
        Op::Cmp,
        Op::Jmp,
        Op::Jeq,
        Op::Jne,
    ];

    /// Decode an opcode byte. Returns `None` for unknown opcodes; the
    /// engine treats those as a reportable one-byte skip, not an error.
    pub fn from_opcode(byte: u8) -> Option<Self> {
        match byte {
            Self::HLT => Some(Op::Hlt),
            Self::LDI => Some(Op::Ldi),
            Self::PRN => Some(Op::Prn),
            Self::MUL => Some(Op::Mul),
            Self::CMP => Some(Op::Cmp),
            Self::JMP => Some(Op::Jmp),
            Self::JEQ => Some(Op::Jeq),
            Self::JNE => Some(Op::Jne),
            _ => None,
        }
    }

    /// The opcode byte for this operation.
    pub fn opcode(self) -> u8 {
        match self {
            Op::Hlt => Self::HLT,
            Op::Ldi => Self::LDI,
            Op::Prn => Self::PRN,
            Op::Mul => Self::MUL,
            Op::Cmp => Self::CMP,
            Op::Jmp => Self::JMP,
            Op::Jeq => Self::JEQ,
            Op::Jne => Self::JNE,
        }
    }

    /// Number of operand bytes following the opcode (bits 7-6).
    pub fn operand_count(self) -> usize {
        (self.opcode() >> 6) as usize
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Hlt => "HLT",
            Op::Ldi => "LDI",
            Op::Prn => "PRN",
            Op::Mul => "MUL",
            Op::Cmp => "CMP",
            Op::Jmp => "JMP",
            Op::Jeq => "JEQ",
            Op::Jne => "JNE",
        }
    }
}

/// A fully decoded LS-8 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt execution.
    Hlt,
    /// `reg[reg] = value`
    Ldi { reg: u8, value: u8 },
    /// Print `reg[reg]` in decimal.
    Prn { reg: u8 },
    /// `reg[a] = (reg[a] * reg[b]) mod 256`
    Mul { a: u8, b: u8 },
    /// Compare `reg[a]` with `reg[b]`; set exactly one flag.
    Cmp { a: u8, b: u8 },
    /// `PC = reg[reg]`
    Jmp { reg: u8 },
    /// If the equal flag is set, `PC = reg[reg]`; otherwise fall through.
    Jeq { reg: u8 },
    /// If the equal flag is clear, `PC = reg[reg]`; otherwise fall through.
    Jne { reg: u8 },
}

impl Instruction {
    /// The operation this instruction belongs to.
    pub fn op(&self) -> Op {
        match self {
            Instruction::Hlt => Op::Hlt,
            Instruction::Ldi { .. } => Op::Ldi,
            Instruction::Prn { .. } => Op::Prn,
            Instruction::Mul { .. } => Op::Mul,
            Instruction::Cmp { .. } => Op::Cmp,
            Instruction::Jmp { .. } => Op::Jmp,
            Instruction::Jeq { .. } => Op::Jeq,
            Instruction::Jne { .. } => Op::Jne,
        }
    }

    /// Total size in bytes: opcode plus operands.
    pub fn size(&self) -> usize {
        self.op().operand_count() + 1
    }

    /// Encode back to bytes (used by the assembler).
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Instruction::Hlt => vec![Op::HLT],
            Instruction::Ldi { reg, value } => vec![Op::LDI, reg, value],
            Instruction::Prn { reg } => vec![Op::PRN, reg],
            Instruction::Mul { a, b } => vec![Op::MUL, a, b],
            Instruction::Cmp { a, b } => vec![Op::CMP, a, b],
            Instruction::Jmp { reg } => vec![Op::JMP, reg],
            Instruction::Jeq { reg } => vec![Op::JEQ, reg],
            Instruction::Jne { reg } => vec![Op::JNE, reg],
        }
    }
}

/// Build an instruction from a decoded operation and its operand bytes.
///
/// Operands beyond the operation's operand count are ignored.
pub fn decode(op: Op, a: u8, b: u8) -> Instruction {
    match op {
        Op::Hlt => Instruction::Hlt,
        Op::Ldi => Instruction::Ldi { reg: a, value: b },
        Op::Prn => Instruction::Prn { reg: a },
        Op::Mul => Instruction::Mul { a, b },
        Op::Cmp => Instruction::Cmp { a, b },
        Op::Jmp => Instruction::Jmp { reg: a },
        Op::Jeq => Instruction::Jeq { reg: a },
        Op::Jne => Instruction::Jne { reg: a },
    }
}

/// Decode raw bytes into an instruction.
pub fn decode_bytes(opcode: u8, a: u8, b: u8) -> Result<Instruction, DecodeError> {
    let op = Op::from_opcode(opcode).ok_or(DecodeError::UnknownOpcode(opcode))?;
    Ok(decode(op, a, b))
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode: {0:#010b}")]
    UnknownOpcode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_counts_match_encoding() {
        // Bits 7-6 of every opcode must agree with the dispatch table.
        for op in Op::ALL {
            let expected = match op {
                Op::Hlt => 0,
                Op::Prn | Op::Jmp | Op::Jeq | Op::Jne => 1,
                Op::Ldi | Op::Mul | Op::Cmp => 2,
            };
            assert_eq!(op.operand_count(), expected, "{}", op.mnemonic());
        }
    }

    #[test]
    fn test_opcode_roundtrip() {
        for op in Op::ALL {
            assert_eq!(Op::from_opcode(op.opcode()), Some(op));
        }
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(Op::from_opcode(0xFF), None);
        assert_eq!(decode_bytes(0xFF, 0, 0), Err(DecodeError::UnknownOpcode(0xFF)));
    }

    #[test]
    fn test_decode_ldi() {
        let instr = decode_bytes(Op::LDI, 3, 42).unwrap();
        assert_eq!(instr, Instruction::Ldi { reg: 3, value: 42 });
        assert_eq!(instr.size(), 3);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let cases = [
            Instruction::Hlt,
            Instruction::Ldi { reg: 0, value: 200 },
            Instruction::Prn { reg: 5 },
            Instruction::Mul { a: 1, b: 2 },
            Instruction::Cmp { a: 3, b: 4 },
            Instruction::Jmp { reg: 6 },
            Instruction::Jeq { reg: 0 },
            Instruction::Jne { reg: 7 },
        ];

        for instr in cases {
            let bytes = instr.encode();
            assert_eq!(bytes.len(), instr.size());

            let a = bytes.get(1).copied().unwrap_or(0);
            let b = bytes.get(2).copied().unwrap_or(0);
            assert_eq!(decode_bytes(bytes[0], a, b).unwrap(), instr);
        }
    }
}
