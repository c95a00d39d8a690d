//! General-purpose register file (A, B, C, D).

use serde::Serialize;

use crate::error::{Result, VmError};
use crate::REGISTER_COUNT;

/// Register id as encoded in an instruction's parameter byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] = [Register::A, Register::B, Register::C, Register::D];

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::D => "D",
        }
    }
}

impl TryFrom<u8> for Register {
    type Error = VmError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Register::A),
            1 => Ok(Register::B),
            2 => Ok(Register::C),
            3 => Ok(Register::D),
            _ => Err(VmError::InvalidRegister(id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn get(&self, r: Register) -> u8 {
        self.regs[r as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, r: Register, v: u8) {
        self.regs[r as usize] = v;
    }

    /// Read by raw id. Ids outside 0..=3 are rejected.
    pub fn get_id(&self, id: u8) -> Result<u8> {
        Register::try_from(id).map(|r| self.get(r))
    }

    /// Write by raw id. Nothing is written when the id is rejected.
    pub fn set_id(&mut self, id: u8, v: u8) -> Result<()> {
        let r = Register::try_from(id)?;
        self.set(r, v);
        Ok(())
    }

    pub fn values(&self) -> [u8; REGISTER_COUNT] {
        self.regs
    }

    pub fn clear(&mut self) {
        self.regs = [0; REGISTER_COUNT];
    }
}
