//! Nemo memory subsystem.
//!
//! | Space | Size      | Content                                   |
//! |-------|-----------|-------------------------------------------|
//! | ROM   | 4 × 255 B | Program banks, one active at a time       |
//! | RAM   | 255 B     | 0x00–0xEF user data, 0xF0–0xFE call stack |
//! | VRAM  | 255 B     | Output plane for a renderer, inert to code |
//!
//! Addresses are single bytes, so offset 0xFF lies one past the end of
//! every space: reads there return 0 and writes are dropped.

use crate::{BANK_SIZE, RAM_SIZE, ROM_BANK_COUNT, VRAM_SIZE};

#[derive(Debug)]
pub struct Memory {
    /// Program banks
    pub rom: Vec<Vec<u8>>,
    /// Data memory; the top 15 bytes back the call stack
    pub ram: Vec<u8>,
    /// Auxiliary byte plane
    pub vram: Vec<u8>,
    /// Index of the bank the fetch path reads from
    bank_index: usize,
    /// RAM address used by RAM_SET and LD
    pub ram_pointer: u8,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            rom: vec![vec![0u8; BANK_SIZE]; ROM_BANK_COUNT],
            ram: vec![0u8; RAM_SIZE],
            vram: vec![0u8; VRAM_SIZE],
            bank_index: 0,
            ram_pointer: 0,
        }
    }

    /// Zero every bank, RAM and VRAM. The active bank selection is kept.
    pub fn clear(&mut self) {
        for bank in self.rom.iter_mut() {
            bank.fill(0);
        }
        self.ram.fill(0);
        self.vram.fill(0);
    }

    // --- Banks ---

    pub fn active_bank(&self) -> &[u8] {
        &self.rom[self.bank_index]
    }

    pub fn bank_index(&self) -> usize {
        self.bank_index
    }

    pub fn set_bank_index(&mut self, bank: usize) {
        self.bank_index = bank % ROM_BANK_COUNT;
    }

    /// Select the next bank, wrapping after the last one. Contents are untouched.
    pub fn switch_to_next_bank(&mut self) {
        self.bank_index = (self.bank_index + 1) % ROM_BANK_COUNT;
    }

    /// Bank numbers wrap modulo the bank count.
    pub fn bank(&self, bank: usize) -> &[u8] {
        &self.rom[bank % ROM_BANK_COUNT]
    }

    pub fn bank_mut(&mut self, bank: usize) -> &mut [u8] {
        &mut self.rom[bank % ROM_BANK_COUNT]
    }

    // --- Program memory ---

    #[inline(always)]
    pub fn read(&self, bank: usize, offset: u8) -> u8 {
        read_raw(self.bank(bank), offset)
    }

    #[inline(always)]
    pub fn write(&mut self, bank: usize, offset: u8, v: u8) {
        write_raw(self.bank_mut(bank), offset, v);
    }

    /// Read the three meaningful bytes of the slot at `pc` in the active bank.
    #[inline(always)]
    pub fn fetch(&self, pc: u8) -> [u8; 3] {
        let bank = self.active_bank();
        [
            read_raw(bank, pc),
            read_raw(bank, pc.wrapping_add(1)),
            read_raw(bank, pc.wrapping_add(2)),
        ]
    }

    // --- Data space ---

    #[inline(always)]
    pub fn read_data(&self, offset: u8) -> u8 {
        read_raw(&self.ram, offset)
    }

    #[inline(always)]
    pub fn write_data(&mut self, offset: u8, v: u8) {
        write_raw(&mut self.ram, offset, v);
    }

    pub fn set_data_pointer(&mut self, v: u8) {
        self.ram_pointer = v;
    }

    pub fn data_pointer(&self) -> u8 {
        self.ram_pointer
    }

    #[inline(always)]
    pub fn read_vram(&self, offset: u8) -> u8 {
        read_raw(&self.vram, offset)
    }

    #[inline(always)]
    pub fn write_vram(&mut self, offset: u8, v: u8) {
        write_raw(&mut self.vram, offset, v);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn read_raw(space: &[u8], offset: u8) -> u8 {
    space.get(offset as usize).copied().unwrap_or(0)
}

#[inline(always)]
fn write_raw(space: &mut [u8], offset: u8, v: u8) {
    if let Some(slot) = space.get_mut(offset as usize) {
        *slot = v;
    }
}
