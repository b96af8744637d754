//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::alu::{self, AluOp};
use crate::cpu::decode::{self, Instruction, Op};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::RegisterError;
use crate::cpu::{Flags, Memory, Registers};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
}

/// The LS-8 CPU.
///
/// One aggregate owns everything the machine mutates: memory, registers,
/// flags, and the program counter. There is no ambient state.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// General-purpose registers.
    pub regs: Registers,
    /// Comparison flags.
    pub flags: Flags,
    /// Main memory.
    pub mem: Memory,
    /// Program counter: address of the next instruction to fetch.
    pub pc: usize,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling and cycle limits).
    pub cycles: u64,
    /// Values printed by PRN, in program order.
    output: Vec<u8>,
    /// Diagnostics recorded for unknown opcodes.
    diagnostics: Vec<String>,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            flags: Flags::new(),
            mem: Memory::new(),
            pc: 0,
            state: CpuState::Running,
            cycles: 0,
            output: Vec::new(),
            diagnostics: Vec::new(),
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.flags.clear();
        self.mem.clear();
        self.pc = 0;
        self.state = CpuState::Running;
        self.cycles = 0;
        self.output.clear();
        self.diagnostics.clear();
        self.last_instr = None;
    }

    /// Load a program into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or `None` if the byte
    /// at PC was not a recognized opcode (the machine records a
    /// diagnostic and skips one byte; this is deliberate leniency, not
    /// an error).
    pub fn step(&mut self) -> Result<Option<Instruction>, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        // Fetch. The opcode and its operands are read fresh from the
        // current PC every cycle; a jump in the previous cycle moves them.
        let opcode = self.mem.read(self.pc)?;

        let Some(op) = Op::from_opcode(opcode) else {
            self.diagnostics.push(format!(
                "unknown instruction {:#010b} at address {}",
                opcode, self.pc
            ));
            self.pc += 1;
            self.cycles += 1;
            self.last_instr = None;
            return Ok(None);
        };

        // Only the operands the opcode declares are fetched; a 0-operand
        // instruction in the last memory cell must not fault.
        let count = op.operand_count();
        let operand_a = if count >= 1 { self.mem.read(self.pc + 1)? } else { 0 };
        let operand_b = if count >= 2 { self.mem.read(self.pc + 2)? } else { 0 };

        let instr = decode::decode(op, operand_a, operand_b);
        self.execute(instr)?;

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(Some(instr))
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    ///
    /// A guard against runaway programs: the unknown-opcode leniency
    /// means a malformed image can walk memory forever.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction and advance the PC.
    fn execute(&mut self, instr: Instruction) -> Result<(), CpuError> {
        match instr {
            Instruction::Hlt => {
                self.state = CpuState::Halted;
                self.pc += 1;
            }

            Instruction::Ldi { reg, value } => {
                self.regs.set(reg, value)?;
                self.pc += 3;
            }

            Instruction::Prn { reg } => {
                let value = self.regs.get(reg)?;
                self.output.push(value);
                self.pc += 2;
            }

            Instruction::Mul { a, b } => {
                alu::execute(AluOp::Mul, &mut self.regs, &mut self.flags, a, b)?;
                self.pc += 3;
            }

            Instruction::Cmp { a, b } => {
                alu::execute(AluOp::Cmp, &mut self.regs, &mut self.flags, a, b)?;
                self.pc += 3;
            }

            Instruction::Jmp { reg } => {
                self.pc = self.regs.get(reg)? as usize;
            }

            Instruction::Jeq { reg } => {
                if self.flags.equal {
                    self.pc = self.regs.get(reg)? as usize;
                } else {
                    self.pc += 2;
                }
            }

            Instruction::Jne { reg } => {
                if !self.flags.equal {
                    self.pc = self.regs.get(reg)? as usize;
                } else {
                    self.pc += 2;
                }
            }
        }

        Ok(())
    }

    /// Values printed by PRN so far, in program order.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take the pending PRN output, leaving the buffer empty.
    pub fn drain_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Diagnostics recorded for unknown opcodes.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// One-line hex dump of the PC, the three bytes at the PC, and the
    /// register file. Used by `run --trace`.
    pub fn trace_line(&self) -> String {
        let b0 = self.mem.read(self.pc).unwrap_or(0);
        let b1 = self.mem.read(self.pc + 1).unwrap_or(0);
        let b2 = self.mem.read(self.pc + 2).unwrap_or(0);

        let mut line = format!("TRACE: {:02X} | {:02X} {:02X} {:02X} |", self.pc, b0, b1, b2);
        for value in self.regs.as_slice() {
            line.push_str(&format!(" {:02X}", value));
        }
        line
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("register error: {0}")]
    Register(#[from] RegisterError),
}
