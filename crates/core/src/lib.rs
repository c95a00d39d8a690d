//! # nemo-core
//!
//! Fetch/execute core for the Nemo 8-bit byte-code virtual machine.
//!
//! Nemo runs 4-byte instruction slots out of four switchable 255-byte
//! program banks, with 255 bytes of data memory whose top 15 bytes hold the
//! return-address stack, a second 255-byte output plane, and four 8-bit
//! registers. The engine only advances when the host calls [`Nemo::step`];
//! it never renders, reads input, or terminates the process.
//!
//! ## Architecture
//!
//! - [`Nemo`]: Top-level engine wiring memory, stack, registers and ALU together
//! - [`Cpu`]: Program counter, decode latch, pause flag, cycle counter
//! - [`Memory`]: ROM banks, RAM, VRAM, bank selection and data pointer
//! - [`CallStack`]: Return-address stack over RAM 0xF0–0xFE
//! - [`RegisterFile`]: Registers A–D
//! - [`Alu`]: Wrapping 8-bit adder
//! - [`opcodes`]: Instruction slot encoding
//! - [`disasm`]: Mnemonics for instruction views
//! - [`debugger`]: Hex dumps for memory panels
//! - [`snapshot`]: Read-only state capture for register/stack panels
//! - [`error`] / [`diag`]: Error kinds, diagnostic channel, host error budget
//!
//! ## Example
//!
//! ```
//! use nemo_core::{Nemo, Opcode, Register};
//!
//! let mut nemo = Nemo::new();
//! nemo.set_register(Register::A, 0xFF);
//! nemo.set_register(Register::B, 0x02);
//! nemo.poke_instruction(0, 0x00, Opcode::Add.into(), 0, 0);
//! nemo.step();
//! assert_eq!(nemo.register(Register::C), 0x01);
//! assert_eq!(nemo.program_counter(), 0x04);
//! ```

pub mod alu;
pub mod cpu;
pub mod debugger;
pub mod diag;
pub mod disasm;
pub mod error;
pub mod memory;
pub mod opcodes;
pub mod registers;
pub mod snapshot;
pub mod stack;

pub use alu::Alu;
pub use cpu::Cpu;
pub use debugger::PanelMarks;
pub use diag::{BudgetState, ErrorBudget};
pub use error::{Diagnostic, Severity, VmError};
pub use memory::Memory;
pub use opcodes::{Instruction, Opcode};
pub use registers::{Register, RegisterFile};
pub use snapshot::Snapshot;
pub use stack::CallStack;

/// Number of program banks
pub const ROM_BANK_COUNT: usize = 4;
/// Bytes per program bank
pub const BANK_SIZE: usize = 0xFF;
/// Data memory size
pub const RAM_SIZE: usize = 0xFF;
/// Output plane size
pub const VRAM_SIZE: usize = 0xFF;
/// Bytes per instruction slot; the counter advances by this much per cycle
pub const SLOT_WIDTH: u8 = 4;
/// First RAM offset backing the call stack
pub const STACK_BASE: u8 = 0xF0;
/// Stack slots in RAM (0xF0..=0xFE)
pub const STACK_SLOTS: usize = 15;
/// Pushes are refused at this depth, keeping one slot spare
pub const STACK_LIMIT: usize = 14;
/// General-purpose registers
pub const REGISTER_COUNT: usize = 4;

/// Engine options.
#[derive(Debug, Clone, Default)]
pub struct NemoConfig {
    /// Echo executed instructions and diagnostics to stderr
    pub debug: bool,
    /// Come up in the paused state
    pub start_paused: bool,
}

/// Display switches owned by the engine for the renderer. Execution ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    /// Show the active bank as mnemonics instead of hex
    pub instruction_view: bool,
    /// Show VRAM in the data panel instead of RAM
    pub show_vram: bool,
    /// Key help overlay; only the renderer reads it
    pub show_help: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        ViewFlags { instruction_view: true, show_vram: false, show_help: false }
    }
}

/// The Nemo virtual machine.
#[derive(Debug)]
pub struct Nemo {
    pub cpu: Cpu,
    pub mem: Memory,
    pub stack: CallStack,
    pub regs: RegisterFile,
    pub alu: Alu,
    pub view: ViewFlags,
    /// Echo execution to stderr
    pub debug: bool,
    /// Undrained diagnostic events
    diagnostics: Vec<Diagnostic>,
}

impl Nemo {
    /// Create an engine in power-on state: all memory zero, running.
    pub fn new() -> Self {
        Self::with_config(NemoConfig::default())
    }

    pub fn with_config(config: NemoConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.paused = config.start_paused;
        Nemo {
            cpu,
            mem: Memory::new(),
            stack: CallStack::new(),
            regs: RegisterFile::new(),
            alu: Alu::new(),
            view: ViewFlags::default(),
            debug: config.debug,
            diagnostics: Vec::new(),
        }
    }

    /// Return to power-on state: registers, counter, pointer, stack, every
    /// memory space and the bank selection are cleared.
    ///
    /// The pause flag, view flags and pending diagnostics are kept.
    pub fn reset(&mut self) {
        let paused = self.cpu.paused;
        self.cpu = Cpu::new();
        self.cpu.paused = paused;
        self.mem.clear();
        self.mem.set_bank_index(0);
        self.mem.set_data_pointer(0);
        self.stack.reset();
        self.regs.clear();
        self.alu = Alu::new();
    }

    // --- Control surface ---

    /// Execute one cycle. Does nothing at all while paused.
    pub fn step(&mut self) {
        if self.cpu.paused {
            return;
        }
        self.cycle();
    }

    /// Execute one cycle even when paused (single-step from a debugger).
    pub fn force_step(&mut self) {
        self.cycle();
    }

    /// Latch `inst` and execute it without a fetch.
    ///
    /// The counter only moves when the instruction moves it: a taken JUMP
    /// lands on its target and a taken RETURN on the slot after its JUMP,
    /// exactly as in a cycle. Everything else leaves the counter alone.
    pub fn execute_instruction(&mut self, inst: Instruction) {
        self.cpu.latch = inst;
        if self.execute_latched() {
            self.cpu.advance();
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.cpu.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.cpu.paused
    }

    pub fn toggle_pause(&mut self) {
        self.cpu.paused = !self.cpu.paused;
    }

    pub fn program_counter(&self) -> u8 {
        self.cpu.pc
    }

    /// Move the counter, e.g. for a cursor in the bank view.
    pub fn set_program_counter(&mut self, pc: u8) {
        self.cpu.pc = pc;
    }

    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Current decode latch. Always NOP between cycles.
    pub fn latch(&self) -> Instruction {
        self.cpu.latch
    }

    // --- Program memory ---

    /// Write a full slot `(opcode, parameter, operand, 0)` at `offset`.
    ///
    /// Bank numbers wrap modulo [`ROM_BANK_COUNT`]. Bytes past the end of the
    /// bank are dropped.
    pub fn poke_instruction(&mut self, bank: usize, offset: u8, opcode: u8, parameter: u8, operand: u8) {
        self.paste_slot(bank, offset, Instruction { opcode, parameter, operand }.encode());
    }

    pub fn poke_program_byte(&mut self, bank: usize, offset: u8, value: u8) {
        self.mem.write(bank, offset, value);
    }

    pub fn read_program_byte(&self, bank: usize, offset: u8) -> u8 {
        self.mem.read(bank, offset)
    }

    /// Copy the 4-byte slot at `offset` and zero it.
    pub fn cut_slot(&mut self, bank: usize, offset: u8) -> [u8; 4] {
        let mut slot = [0u8; 4];
        for (i, b) in slot.iter_mut().enumerate() {
            if let Some(at) = offset.checked_add(i as u8) {
                *b = self.mem.read(bank, at);
                self.mem.write(bank, at, 0);
            }
        }
        slot
    }

    pub fn paste_slot(&mut self, bank: usize, offset: u8, slot: [u8; 4]) {
        for (i, &b) in slot.iter().enumerate() {
            if let Some(at) = offset.checked_add(i as u8) {
                self.mem.write(bank, at, b);
            }
        }
    }

    /// Replace one bank with `image`; bytes past the image are zeroed.
    pub fn load_program_bank(&mut self, bank: usize, image: &[u8]) -> error::Result<()> {
        if image.len() > BANK_SIZE {
            return Err(VmError::ImageTooLarge { bank, len: image.len() });
        }
        let dst = self.mem.bank_mut(bank);
        dst.fill(0);
        dst[..image.len()].copy_from_slice(image);
        if self.debug {
            eprintln!("[LOAD] bank{}: {} bytes", bank % ROM_BANK_COUNT, image.len());
        }
        Ok(())
    }

    /// Replace all banks. Banks without an image are cleared to zero.
    ///
    /// Every image is checked before anything is written, so a rejected
    /// load leaves program memory as it was.
    pub fn load_all_banks(&mut self, images: &[&[u8]]) -> error::Result<()> {
        if images.len() > ROM_BANK_COUNT {
            return Err(VmError::TooManyBanks(images.len()));
        }
        if let Some((bank, img)) = images.iter().enumerate().find(|(_, img)| img.len() > BANK_SIZE) {
            return Err(VmError::ImageTooLarge { bank, len: img.len() });
        }
        for bank in 0..ROM_BANK_COUNT {
            let image = images.get(bank).copied().unwrap_or(&[][..]);
            self.load_program_bank(bank, image)?;
        }
        Ok(())
    }

    pub fn active_bank_index(&self) -> usize {
        self.mem.bank_index()
    }

    pub fn bank(&self, bank: usize) -> &[u8] {
        self.mem.bank(bank)
    }

    // --- Data memory and registers ---

    pub fn poke_data(&mut self, offset: u8, value: u8) {
        self.mem.write_data(offset, value);
    }

    pub fn read_data(&self, offset: u8) -> u8 {
        self.mem.read_data(offset)
    }

    pub fn set_data_pointer(&mut self, value: u8) {
        self.mem.set_data_pointer(value);
    }

    pub fn data_pointer(&self) -> u8 {
        self.mem.data_pointer()
    }

    pub fn ram(&self) -> &[u8] {
        &self.mem.ram
    }

    pub fn read_vram(&self, offset: u8) -> u8 {
        self.mem.read_vram(offset)
    }

    pub fn write_vram(&mut self, offset: u8, value: u8) {
        self.mem.write_vram(offset, value);
    }

    pub fn vram(&self) -> &[u8] {
        &self.mem.vram
    }

    pub fn register(&self, r: Register) -> u8 {
        self.regs.get(r)
    }

    pub fn set_register(&mut self, r: Register, value: u8) {
        self.regs.set(r, value);
    }

    // --- Introspection ---

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            active_bank_index: self.mem.bank_index(),
            program_counter: self.cpu.pc,
            data_pointer: self.mem.ram_pointer,
            registers: self.regs.values(),
            stack_depth: self.stack.depth(),
            stack_contents: self.stack.contents(&self.mem.ram),
        }
    }

    /// Take and clear pending diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn pending_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn report(&mut self, err: VmError) {
        let diag = Diagnostic::new(&err, self.cpu.pc);
        if self.debug {
            eprintln!("[DIAG] {}", diag);
        }
        self.diagnostics.push(diag);
    }

    /// Disassemble the slot at the counter without executing it.
    pub fn disasm_at_pc(&self) -> String {
        let inst = Instruction::decode(self.mem.fetch(self.cpu.pc));
        format!("bank{} 0x{:02X}: {}", self.mem.bank_index(), self.cpu.pc, disasm::disassemble(inst))
    }

    /// Format registers, counter, pointer, bank and stack depth.
    pub fn dump_regs(&self) -> String {
        let mut s = String::new();
        for r in Register::ALL {
            s.push_str(&format!("{}={:02X} ", r.name(), self.regs.get(r)));
        }
        s.push_str(&format!("\nPC={:02X} RP={:02X} BANK={} DEPTH={}",
            self.cpu.pc, self.mem.ram_pointer, self.mem.bank_index(), self.stack.depth()));
        s
    }

    /// Format all stack slots, marking the next free one with `>`.
    pub fn dump_stack(&self) -> String {
        let contents = self.stack.contents(&self.mem.ram);
        let mut s = String::new();
        for (i, v) in contents.iter().enumerate() {
            let mark = if i == self.stack.depth() { '>' } else { ' ' };
            s.push_str(&format!("{:2} {} [ {:02X} ]\n", i, mark, v));
        }
        s
    }

    /// Data panel: RAM with the stack region marked, or VRAM when
    /// `view.show_vram` is set. The data pointer carries the cursor.
    pub fn dump_data(&self) -> String {
        let marks = PanelMarks::cursor(self.mem.ram_pointer);
        if self.view.show_vram {
            debugger::dump_panel(&self.mem.vram, &marks)
        } else {
            let stack = STACK_BASE as usize..STACK_BASE as usize + STACK_SLOTS;
            debugger::dump_panel(&self.mem.ram, &marks.with_region(stack))
        }
    }

    /// Bank panel: disassembly under `view.instruction_view`, otherwise hex
    /// cells with the counter as cursor when `bank` is the active one.
    pub fn dump_bank(&self, bank: usize) -> String {
        if self.view.instruction_view {
            return disasm::disassemble_bank(self.mem.bank(bank)).join("\n");
        }
        let marks = if bank % ROM_BANK_COUNT == self.mem.bank_index() {
            PanelMarks::cursor(self.cpu.pc)
        } else {
            PanelMarks::default()
        };
        debugger::dump_panel(self.mem.bank(bank), &marks)
    }
}

impl Default for Nemo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nemo_creation() {
        let nemo = Nemo::new();
        let snap = nemo.snapshot();
        assert_eq!(snap.program_counter, 0);
        assert_eq!(snap.active_bank_index, 0);
        assert_eq!(snap.stack_depth, 0);
        assert!(!nemo.is_paused());
        assert!(nemo.ram().iter().all(|&b| b == 0));
        assert_eq!(nemo.latch(), Instruction::NOP);
    }

    #[test]
    fn test_config() {
        let nemo = Nemo::with_config(NemoConfig { debug: false, start_paused: true });
        assert!(nemo.is_paused());
    }

    #[test]
    fn test_cut_paste_slot() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(0, 0x08, Opcode::RamSet.into(), 0, 0x7F);
        let slot = nemo.cut_slot(0, 0x08);
        assert_eq!(slot, [5, 0, 0x7F, 0]);
        assert_eq!(nemo.read_program_byte(0, 0x08), 0);
        nemo.paste_slot(0, 0x20, slot);
        assert_eq!(&nemo.bank(0)[0x20..0x24], &[5, 0, 0x7F, 0]);
    }

    #[test]
    fn test_poke_last_slot_drops_boundary_byte() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(0, 0xFC, Opcode::Add.into(), 1, 2);
        assert_eq!(&nemo.bank(0)[0xFC..], &[3, 1, 2]);
        nemo.poke_instruction(0, 0xFE, Opcode::Jump.into(), 0x11, 0x22);
        assert_eq!(nemo.read_program_byte(0, 0xFE), 1);
        assert_eq!(nemo.read_program_byte(0, 0x00), 0);
    }

    #[test]
    fn test_load_program_bank() {
        let mut nemo = Nemo::new();
        nemo.poke_program_byte(1, 0x40, 0xEE);
        nemo.load_program_bank(1, &[4, 0, 0x33, 0]).unwrap();
        assert_eq!(nemo.read_program_byte(1, 0x02), 0x33);
        assert_eq!(nemo.read_program_byte(1, 0x40), 0);
    }

    #[test]
    fn test_load_rejects_oversized_image() {
        let mut nemo = Nemo::new();
        nemo.poke_program_byte(0, 0, 0x07);
        let big = vec![1u8; BANK_SIZE + 1];
        let err = nemo.load_all_banks(&[&[], &big]).unwrap_err();
        assert_eq!(err, VmError::ImageTooLarge { bank: 1, len: BANK_SIZE + 1 });
        assert_eq!(err.severity(), Severity::Fatal);
        assert_eq!(nemo.read_program_byte(0, 0), 0x07);
    }

    #[test]
    fn test_load_all_banks_clears_missing() {
        let mut nemo = Nemo::new();
        nemo.poke_program_byte(3, 0x10, 0xAA);
        nemo.load_all_banks(&[&[7]]).unwrap();
        assert_eq!(nemo.read_program_byte(0, 0), 7);
        assert_eq!(nemo.read_program_byte(3, 0x10), 0);
        let five: [&[u8]; 5] = [&[], &[], &[], &[], &[]];
        assert_eq!(nemo.load_all_banks(&five), Err(VmError::TooManyBanks(5)));
    }

    #[test]
    fn test_reset() {
        let mut nemo = Nemo::new();
        nemo.set_paused(true);
        nemo.set_register(Register::B, 9);
        nemo.poke_data(0x10, 1);
        nemo.write_vram(0x10, 1);
        nemo.set_program_counter(0x40);
        nemo.mem.switch_to_next_bank();
        nemo.execute_instruction(Instruction::new(Opcode::Jump, 0, 0x80));
        nemo.reset();
        let snap = nemo.snapshot();
        assert_eq!(snap.registers, [0; REGISTER_COUNT]);
        assert_eq!(snap.program_counter, 0);
        assert_eq!(snap.active_bank_index, 0);
        assert_eq!(snap.stack_depth, 0);
        assert_eq!(nemo.read_data(0x10), 0);
        assert_eq!(nemo.read_vram(0x10), 0);
        assert!(nemo.is_paused());
    }

    #[test]
    fn test_toggle_pause() {
        let mut nemo = Nemo::new();
        nemo.toggle_pause();
        assert!(nemo.is_paused());
        nemo.step();
        assert_eq!(nemo.cycles(), 0);
        nemo.toggle_pause();
        assert!(!nemo.is_paused());
        nemo.step();
        assert_eq!(nemo.cycles(), 1);
    }

    #[test]
    fn test_pending_diagnostics_peek_without_draining() {
        let mut nemo = Nemo::new();
        assert!(nemo.pending_diagnostics().is_empty());
        nemo.execute_instruction(Instruction::new(Opcode::Return, 0, 0));
        nemo.execute_instruction(Instruction::new(Opcode::Ld, 9, 0));
        let pending = nemo.pending_diagnostics().to_vec();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].message, "invalid register id 0x09");

        assert_eq!(nemo.take_diagnostics(), pending);
        assert!(nemo.pending_diagnostics().is_empty());
    }

    #[test]
    fn test_force_step_while_paused() {
        let mut nemo = Nemo::new();
        nemo.set_paused(true);
        nemo.step();
        assert_eq!(nemo.program_counter(), 0);
        nemo.force_step();
        assert_eq!(nemo.program_counter(), 4);
        assert_eq!(nemo.cycles(), 1);
    }

    #[test]
    fn test_execute_instruction_does_not_advance() {
        let mut nemo = Nemo::new();
        nemo.set_program_counter(0x10);
        nemo.execute_instruction(Instruction::new(Opcode::SetRamPointer, 0, 0x42));
        assert_eq!(nemo.data_pointer(), 0x42);
        assert_eq!(nemo.program_counter(), 0x10);
        assert_eq!(nemo.latch(), Instruction::NOP);
    }

    #[test]
    fn test_injected_jump_lands_on_target() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(0, 0x2C, Opcode::SetRamPointer.into(), 0, 0x77);
        nemo.poke_instruction(0, 0x30, Opcode::SetRamPointer.into(), 0, 0x30);
        nemo.set_program_counter(0x10);
        nemo.execute_instruction(Instruction::new(Opcode::Jump, 0, 0x30));
        assert_eq!(nemo.program_counter(), 0x30);
        assert_eq!(nemo.snapshot().stack_contents[0], 0x10);
        nemo.step();
        assert_eq!(nemo.data_pointer(), 0x30);
        assert_eq!(nemo.program_counter(), 0x34);
    }

    #[test]
    fn test_injected_return_resumes_after_jump() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(0, 0x10, Opcode::Jump.into(), 0, 0x30);
        nemo.set_program_counter(0x10);
        nemo.step();
        assert_eq!(nemo.program_counter(), 0x30);

        nemo.execute_instruction(Instruction::new(Opcode::Return, 0, 0));
        assert_eq!(nemo.program_counter(), 0x14);
        nemo.step();
        assert_eq!(nemo.program_counter(), 0x18);
        assert_eq!(nemo.snapshot().stack_depth, 0);
        assert!(nemo.take_diagnostics().is_empty());
    }

    #[test]
    fn test_injected_return_on_empty_stack_keeps_counter() {
        let mut nemo = Nemo::new();
        nemo.set_program_counter(0x20);
        nemo.execute_instruction(Instruction::new(Opcode::Return, 0, 0));
        assert_eq!(nemo.program_counter(), 0x20);
        assert_eq!(nemo.pending_diagnostics().len(), 1);
    }

    #[test]
    fn test_dump_regs() {
        let mut nemo = Nemo::new();
        nemo.set_register(Register::D, 0xAB);
        let s = nemo.dump_regs();
        assert!(s.contains("D=AB"));
        assert!(s.contains("PC=00 RP=00 BANK=0 DEPTH=0"));
    }

    #[test]
    fn test_dump_stack_marks_depth() {
        let mut nemo = Nemo::new();
        nemo.set_program_counter(0x24);
        nemo.execute_instruction(Instruction::new(Opcode::Jump, 0, 0x80));
        let dump = nemo.dump_stack();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), STACK_SLOTS);
        assert_eq!(lines[0], " 0   [ 24 ]");
        assert_eq!(lines[1], " 1 > [ 00 ]");
    }

    #[test]
    fn test_disasm_at_pc() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(0, 0, Opcode::Jump.into(), 0, 0x30);
        assert_eq!(nemo.disasm_at_pc(), "bank0 0x00: JMP 0x30");
    }

    #[test]
    fn test_dump_bank_follows_view() {
        let mut nemo = Nemo::new();
        nemo.poke_instruction(2, 0, Opcode::NextRomBank.into(), 0, 0);
        assert!(nemo.dump_bank(2).starts_with("0x00: 07 00 00  NRB"));
        nemo.view.instruction_view = false;
        assert!(nemo.dump_bank(2).contains("\n0x00[07][00][00][00]"));
        // Counter cursor only on the active bank
        nemo.set_program_counter(0x04);
        assert!(nemo.dump_bank(0).contains("\n0x00[00][00][00][00]<00>"));
        assert!(!nemo.dump_bank(2).contains('<'));
    }

    #[test]
    fn test_dump_data_follows_view() {
        let mut nemo = Nemo::new();
        nemo.poke_data(0x10, 0xAB);
        nemo.write_vram(0x10, 0xCD);
        nemo.set_data_pointer(0x10);
        nemo.execute_instruction(Instruction::new(Opcode::Jump, 0, 0x80));

        let ram = nemo.dump_data();
        assert!(ram.contains("0x10<AB>"));
        assert!(ram.contains("0xF0{00}"));

        nemo.view.show_vram = true;
        let vram = nemo.dump_data();
        assert!(vram.contains("0x10<CD>"));
        assert!(vram.contains("0xF0[00]"));
    }
}
