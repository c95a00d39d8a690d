//! Return-address stack living in the top of data memory.
//!
//! The stack owns no storage. It is a depth counter plus the index range
//! RAM[0xF0..=0xFE]; every push and pop goes through the same RAM buffer,
//! so stack contents are visible to ordinary data reads at those offsets.

use crate::error::{Result, VmError};
use crate::{STACK_BASE, STACK_LIMIT, STACK_SLOTS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }

    #[inline(always)]
    fn slot(index: usize) -> usize {
        STACK_BASE as usize + index
    }

    /// Record `addr` at the current depth.
    ///
    /// Refused once `STACK_LIMIT` entries are in use, leaving one slot spare;
    /// RAM is not touched on refusal.
    pub fn push(&mut self, ram: &mut [u8], addr: u8) -> Result<()> {
        if self.depth >= STACK_LIMIT {
            return Err(VmError::StackOverflow { depth: self.depth });
        }
        ram[Self::slot(self.depth)] = addr;
        self.depth += 1;
        Ok(())
    }

    /// Take the most recent entry and zero its slot.
    pub fn pop(&mut self, ram: &mut [u8]) -> Result<u8> {
        if self.depth == 0 {
            return Err(VmError::StackEmpty);
        }
        self.depth -= 1;
        let slot = Self::slot(self.depth);
        let addr = ram[slot];
        ram[slot] = 0;
        Ok(addr)
    }

    /// Most recent entry without popping it.
    pub fn peek(&self, ram: &[u8]) -> Option<u8> {
        self.depth.checked_sub(1).map(|top| ram[Self::slot(top)])
    }

    /// All 15 backing slots, used or not.
    pub fn contents(&self, ram: &[u8]) -> [u8; STACK_SLOTS] {
        let mut out = [0u8; STACK_SLOTS];
        out.copy_from_slice(&ram[Self::slot(0)..Self::slot(STACK_SLOTS)]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RAM_SIZE;

    #[test]
    fn test_push_pop_through_ram() {
        let mut ram = vec![0u8; RAM_SIZE];
        let mut st = CallStack::new();
        st.push(&mut ram, 0x10).unwrap();
        st.push(&mut ram, 0x24).unwrap();
        assert_eq!(ram[0xF0], 0x10);
        assert_eq!(ram[0xF1], 0x24);
        assert_eq!(st.peek(&ram), Some(0x24));

        assert_eq!(st.pop(&mut ram), Ok(0x24));
        assert_eq!(ram[0xF1], 0);
        assert_eq!(st.depth(), 1);
    }

    #[test]
    fn test_overflow_leaves_headroom() {
        let mut ram = vec![0u8; RAM_SIZE];
        let mut st = CallStack::new();
        for i in 0..STACK_LIMIT {
            st.push(&mut ram, i as u8 + 1).unwrap();
        }
        let before = ram.clone();
        assert_eq!(st.push(&mut ram, 0xEE), Err(VmError::StackOverflow { depth: STACK_LIMIT }));
        assert_eq!(st.depth(), STACK_LIMIT);
        assert_eq!(ram, before);
        assert_eq!(ram[0xFE], 0);
    }

    #[test]
    fn test_pop_empty() {
        let mut ram = vec![0u8; RAM_SIZE];
        let mut st = CallStack::new();
        assert_eq!(st.pop(&mut ram), Err(VmError::StackEmpty));
        assert!(st.is_empty());
        assert_eq!(st.peek(&ram), None);
    }

    #[test]
    fn test_contents_window() {
        let mut ram = vec![0u8; RAM_SIZE];
        ram[0xEF] = 0x99;
        ram[0xFE] = 0x77;
        let st = CallStack::new();
        let c = st.contents(&ram);
        assert_eq!(c[0], 0);
        assert_eq!(c[STACK_SLOTS - 1], 0x77);
    }
}
