//! 8-bit arithmetic unit.
//!
//! Holds two operand latches and a result latch. Callers load the operands
//! before every computation; nothing carries over between operations and
//! there is no carry or overflow flag.

#[derive(Debug, Clone, Default)]
pub struct Alu {
    a: u8,
    b: u8,
    result: u8,
}

impl Alu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_operands(&mut self, a: u8, b: u8) {
        self.a = a;
        self.b = b;
    }

    /// Sum of the operand latches, modulo 256.
    pub fn compute_sum(&mut self) {
        self.result = self.a.wrapping_add(self.b);
    }

    pub fn result(&self) -> u8 {
        self.result
    }
}
