//! Nemo CPU state and instruction execution.
//!
//! The execute path runs on [`Nemo`] so each opcode can reach the memory
//! subsystem, call stack, register file and arithmetic unit directly.
//!
//! Counter discipline: every cycle ends with `pc += SLOT_WIDTH`. JUMP stores
//! its own address on the stack and backs the counter up one slot before
//! that advance, so a taken jump lands exactly on its target. RETURN restores
//! the stored address and the advance moves past the calling JUMP.

use crate::opcodes::{Instruction, Opcode};
use crate::registers::Register;
use crate::{disasm, Nemo, SLOT_WIDTH};

/// Program counter, decode latch and run state.
#[derive(Debug, Clone, Default)]
pub struct Cpu {
    /// Offset of the current slot in the active bank
    pub pc: u8,
    /// Currently decoded instruction; NOP outside of execution
    pub latch: Instruction,
    /// When set, cycles are strict no-ops
    pub paused: bool,
    /// Completed cycles since power-on
    pub cycles: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(SLOT_WIDTH);
    }
}

impl Nemo {
    /// Fetch, execute and advance. Ignores the pause flag.
    pub(crate) fn cycle(&mut self) {
        self.cpu.latch = Instruction::decode(self.mem.fetch(self.cpu.pc));
        self.execute_latched();
        self.cpu.advance();
        self.cpu.cycles += 1;
    }

    /// Dispatch the latched instruction, then clear the latch.
    ///
    /// Returns true when a JUMP or RETURN redirected the counter; the
    /// redirect is only complete once the slot advance has been applied.
    pub(crate) fn execute_latched(&mut self) -> bool {
        let inst = self.cpu.latch;
        if self.debug {
            eprintln!("[EXEC] bank{} 0x{:02X}: {}", self.mem.bank_index(), self.cpu.pc, disasm::disassemble(inst));
        }

        let mut redirected = false;
        match inst.op() {
            Some(Opcode::Jump) => redirected = self.exec_jump(inst.operand),
            Some(Opcode::Return) => redirected = self.exec_return(),
            Some(Opcode::Add) => self.exec_add(),
            Some(Opcode::SetRamPointer) => self.mem.set_data_pointer(inst.operand),
            Some(Opcode::RamSet) => {
                let ptr = self.mem.ram_pointer;
                self.mem.write_data(ptr, inst.operand);
            }
            Some(Opcode::Ld) => self.exec_ld(inst.parameter),
            Some(Opcode::NextRomBank) => self.mem.switch_to_next_bank(),
            Some(Opcode::Nop) | Some(Opcode::End) | None => {}
        }

        self.cpu.latch = Instruction::NOP;
        redirected
    }

    fn exec_jump(&mut self, target: u8) -> bool {
        let pc = self.cpu.pc;
        match self.stack.push(&mut self.mem.ram, pc) {
            Ok(()) => {
                if self.debug {
                    eprintln!("[JMP] 0x{:02X} -> 0x{:02X} depth={}", pc, target, self.stack.depth());
                }
                self.cpu.pc = target.wrapping_sub(SLOT_WIDTH);
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    fn exec_return(&mut self) -> bool {
        match self.stack.pop(&mut self.mem.ram) {
            Ok(addr) => {
                if self.debug {
                    eprintln!("[RTN] 0x{:02X} -> 0x{:02X} depth={}", self.cpu.pc, addr, self.stack.depth());
                }
                self.cpu.pc = addr;
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    fn exec_add(&mut self) {
        self.alu.set_operands(self.regs.get(Register::A), self.regs.get(Register::B));
        self.alu.compute_sum();
        self.regs.set(Register::C, self.alu.result());
    }

    fn exec_ld(&mut self, id: u8) {
        let v = self.mem.read_data(self.mem.ram_pointer);
        if let Err(e) = self.regs.set_id(id, v) {
            self.report(e);
        }
    }
}
