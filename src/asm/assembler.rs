//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LOOP:            ; Define a label
//!     LDI R0, 42   ; Load an immediate into a register
//!     LDI R1, LOOP ; Labels resolve to addresses (jumps go through registers)
//!     CMP R0, R2
//!     JEQ R1
//!     HLT
//!
//!     DAT 42       ; Define a raw data byte
//! ```

use crate::cpu::decode::Op;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to program bytes.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// A parsed value operand: either a literal byte or a label reference
/// resolved in pass 2.
enum Operand {
    Value(u8),
    Label(String),
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> address).
    symbols: HashMap<String, usize>,
    /// Pending label references (output byte index, label, source line).
    pending: Vec<(usize, String, usize)>,
    /// Output bytes.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        // Pass 1: collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: resolve forward references
        self.resolve_references()?;

        Ok(self.output.clone())
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(';') {
            return Ok(());
        }

        // Remove inline comments
        let line = if let Some(idx) = line.find(';') {
            line[..idx].trim()
        } else {
            line
        };

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if !label.is_empty() {
                self.symbols.insert(label, self.output.len());
            }

            // Process rest of line if any
            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m.to_uppercase(), rest.trim()),
            None => (line.to_uppercase(), ""),
        };

        let operands: Vec<&str> = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        match mnemonic.as_str() {
            "HLT" | "HALT" => {
                self.expect_operands(&operands, 0, &mnemonic, line_num)?;
                self.output.push(Op::HLT);
            }

            "LDI" => {
                self.expect_operands(&operands, 2, &mnemonic, line_num)?;
                let reg = parse_register(operands[0], line_num)?;
                let value = self.parse_value(operands[1], line_num)?;
                self.output.push(Op::LDI);
                self.output.push(reg);
                self.push_operand(value, line_num);
            }

            "PRN" => {
                self.expect_operands(&operands, 1, &mnemonic, line_num)?;
                let reg = parse_register(operands[0], line_num)?;
                self.output.extend_from_slice(&[Op::PRN, reg]);
            }

            "MUL" | "CMP" => {
                self.expect_operands(&operands, 2, &mnemonic, line_num)?;
                let a = parse_register(operands[0], line_num)?;
                let b = parse_register(operands[1], line_num)?;
                let opcode = if mnemonic == "MUL" { Op::MUL } else { Op::CMP };
                self.output.extend_from_slice(&[opcode, a, b]);
            }

            "JMP" | "JEQ" | "JNE" => {
                self.expect_operands(&operands, 1, &mnemonic, line_num)?;
                let reg = parse_register(operands[0], line_num)?;
                let opcode = match mnemonic.as_str() {
                    "JMP" => Op::JMP,
                    "JEQ" => Op::JEQ,
                    _ => Op::JNE,
                };
                self.output.extend_from_slice(&[opcode, reg]);
            }

            "DAT" | "DATA" => {
                self.expect_operands(&operands, 1, &mnemonic, line_num)?;
                let value = self.parse_value(operands[0], line_num)?;
                self.push_operand(value, line_num);
            }

            _ => {
                return Err(AssemblerError::UnknownMnemonic {
                    line: line_num,
                    mnemonic,
                })
            }
        }

        Ok(())
    }

    fn expect_operands(
        &self,
        operands: &[&str],
        count: usize,
        mnemonic: &str,
        line_num: usize,
    ) -> Result<(), AssemblerError> {
        if operands.len() != count {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!(
                    "{} takes {} operand(s), found {}",
                    mnemonic,
                    count,
                    operands.len()
                ),
            });
        }
        Ok(())
    }

    /// Emit a value operand, recording a pending reference for labels.
    fn push_operand(&mut self, value: Operand, line_num: usize) {
        match value {
            Operand::Value(v) => self.output.push(v),
            Operand::Label(label) => {
                self.pending.push((self.output.len(), label, line_num));
                self.output.push(0); // placeholder, resolved in pass 2
            }
        }
    }

    fn parse_value(&self, operand: &str, line_num: usize) -> Result<Operand, AssemblerError> {
        let operand = operand.trim();

        let parsed = if let Some(hex) = operand.strip_prefix("0x").or_else(|| operand.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()
        } else if let Some(bin) = operand.strip_prefix("0b").or_else(|| operand.strip_prefix("0B")) {
            i64::from_str_radix(bin, 2).ok()
        } else {
            operand.parse::<i64>().ok()
        };

        if let Some(num) = parsed {
            if !(0..=255).contains(&num) {
                return Err(AssemblerError::ValueOutOfRange {
                    line: line_num,
                    value: num,
                });
            }
            return Ok(Operand::Value(num as u8));
        }

        // Must be a label reference - resolved in pass 2
        Ok(Operand::Label(operand.to_uppercase()))
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = *self
                .symbols
                .get(label)
                .ok_or_else(|| AssemblerError::UndefinedLabel {
                    line: *line_num,
                    label: label.clone(),
                })?;

            if addr > 255 {
                return Err(AssemblerError::ValueOutOfRange {
                    line: *line_num,
                    value: addr as i64,
                });
            }

            self.output[*out_idx] = addr as u8;
        }
        Ok(())
    }
}

/// Parse a register operand: `R0` through `R7`.
fn parse_register(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let operand = operand.trim();

    let digit = operand
        .strip_prefix('R')
        .or_else(|| operand.strip_prefix('r'))
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| n < 8);

    digit.ok_or_else(|| AssemblerError::SyntaxError {
        line: line_num,
        message: format!("expected register R0-R7, found '{}'", operand),
    })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            ; Print 8 * 9
            LDI R0, 8
            LDI R1, 9
            MUL R0, R1
            PRN R0
            HLT
        "#;

        let result = assemble(source).unwrap();
        assert_eq!(
            result,
            vec![
                Op::LDI, 0, 8,
                Op::LDI, 1, 9,
                Op::MUL, 0, 1,
                Op::PRN, 0,
                Op::HLT,
            ]
        );
    }

    #[test]
    fn test_assemble_forward_label() {
        let source = r#"
            LDI R2, END   ; forward reference
            JMP R2
            PRN R0        ; skipped
        END:
            HLT
        "#;

        let result = assemble(source).unwrap();
        // END is at byte 7 (3 + 2 + 2)
        assert_eq!(result[2], 7);
        assert_eq!(result[7], Op::HLT);
    }

    #[test]
    fn test_assemble_data() {
        let source = r#"
            DAT 42
            DAT 0xFF
            DAT 0b1010
        "#;

        let result = assemble(source).unwrap();
        assert_eq!(result, vec![42, 255, 10]);
    }

    #[test]
    fn test_assemble_unknown_mnemonic() {
        let err = assemble("FOO R0").unwrap_err();
        assert!(matches!(err, AssemblerError::UnknownMnemonic { .. }));
    }

    #[test]
    fn test_assemble_bad_register() {
        let err = assemble("PRN R8").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { .. }));
    }

    #[test]
    fn test_assemble_undefined_label() {
        let err = assemble("LDI R0, NOWHERE").unwrap_err();
        assert!(matches!(err, AssemblerError::UndefinedLabel { .. }));
    }

    #[test]
    fn test_assemble_value_out_of_range() {
        let err = assemble("LDI R0, 300").unwrap_err();
        assert!(matches!(err, AssemblerError::ValueOutOfRange { value: 300, .. }));
    }
}
