//! Nemo instruction encoding.
//!
//! Every instruction occupies a 4-byte slot `(opcode, parameter, operand,
//! pad)`. Only the first three bytes are decoded; the pad keeps slots
//! aligned whatever an opcode actually consumes.

/// Opcode byte values. Order is part of the program encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    /// Push the current counter and continue at `operand`
    Jump = 1,
    /// Pop the counter pushed by the matching JUMP
    Return = 2,
    /// C = A + B
    Add = 3,
    SetRamPointer = 4,
    /// RAM[ram_pointer] = operand
    RamSet = 5,
    /// register[parameter] = RAM[ram_pointer]
    Ld = 6,
    NextRomBank = 7,
    /// Upper-bound marker; never executes anything
    End = 8,
}

impl Opcode {
    pub fn from_byte(b: u8) -> Option<Opcode> {
        Some(match b {
            0 => Opcode::Nop,
            1 => Opcode::Jump,
            2 => Opcode::Return,
            3 => Opcode::Add,
            4 => Opcode::SetRamPointer,
            5 => Opcode::RamSet,
            6 => Opcode::Ld,
            7 => Opcode::NextRomBank,
            8 => Opcode::End,
            _ => return None,
        })
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

/// The decode latch: raw bytes of one fetched instruction.
///
/// Bytes are kept raw so that unknown opcodes and bad register ids survive
/// decoding and are judged at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: u8,
    pub parameter: u8,
    pub operand: u8,
}

impl Instruction {
    pub const NOP: Instruction = Instruction { opcode: 0, parameter: 0, operand: 0 };

    pub fn new(opcode: impl Into<u8>, parameter: u8, operand: u8) -> Self {
        Instruction { opcode: opcode.into(), parameter, operand }
    }

    pub fn decode(bytes: [u8; 3]) -> Self {
        Instruction { opcode: bytes[0], parameter: bytes[1], operand: bytes[2] }
    }

    /// Full 4-byte slot with a zero pad byte.
    pub fn encode(self) -> [u8; 4] {
        [self.opcode, self.parameter, self.operand, 0]
    }

    pub fn op(self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode)
    }
}
