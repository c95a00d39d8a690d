//! Read-only view of engine state for register and stack panels.
//!
//! A [`Snapshot`] is a plain copy: taking one never changes the engine and
//! two snapshots compare equal exactly when the visible machine state does.

use serde::Serialize;

use crate::{REGISTER_COUNT, STACK_SLOTS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub active_bank_index: usize,
    pub program_counter: u8,
    pub data_pointer: u8,
    /// A, B, C, D
    pub registers: [u8; REGISTER_COUNT],
    pub stack_depth: usize,
    /// RAM 0xF0..=0xFE, used and unused slots alike
    pub stack_contents: [u8; STACK_SLOTS],
}

impl Snapshot {
    /// Entries currently on the stack, oldest first.
    pub fn live_stack(&self) -> &[u8] {
        &self.stack_contents[..self.stack_depth]
    }
}
