//! Disassembler for LS-8 programs.
//!
//! Converts program bytes back to readable assembly.

use crate::cpu::decode::{decode, Instruction, Op};

/// Disassemble a program image to text.
///
/// Unknown opcode bytes and trailing operand-less data render as `DAT`.
pub fn disassemble(program: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; ----------------\n\n");

    let mut addr = 0;
    while addr < program.len() {
        let byte = program[addr];

        match Op::from_opcode(byte) {
            // A decodable opcode with all its operands present.
            Some(op) if addr + op.operand_count() < program.len() => {
                let a = program.get(addr + 1).copied().unwrap_or(0);
                let b = program.get(addr + 2).copied().unwrap_or(0);
                let instr = decode(op, a, b);
                output.push_str(&format!("{:03}: {}\n", addr, disassemble_instruction(&instr)));
                addr += instr.size();
            }
            _ => {
                output.push_str(&format!("{:03}: DAT 0b{:08b}\n", addr, byte));
                addr += 1;
            }
        }
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn disassemble_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::Hlt => "HLT".to_string(),
        Instruction::Ldi { reg, value } => format!("LDI R{}, {}", reg, value),
        Instruction::Prn { reg } => format!("PRN R{}", reg),
        Instruction::Mul { a, b } => format!("MUL R{}, R{}", a, b),
        Instruction::Cmp { a, b } => format!("CMP R{}, R{}", a, b),
        Instruction::Jmp { reg } => format!("JMP R{}", reg),
        Instruction::Jeq { reg } => format!("JEQ R{}", reg),
        Instruction::Jne { reg } => format!("JNE R{}", reg),
    }
}
