//! Built-in demo programs, poked into program memory slot by slot.

use clap::ValueEnum;
use nemo_core::{Nemo, Opcode, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Store 1 and 2 in RAM, load them into A and B, add into C
    Add,
    /// Two nested subroutine calls that unwind back to the caller. Left to
    /// run, fall-through reaches both RETURNs with nothing to return to,
    /// raising two empty-stack diagnostics per lap of the bank.
    Call,
    /// Hop across all four banks leaving a mark in RAM from each
    Banks,
    /// Self-recursive jump that runs the call stack into its limit
    Overflow,
}

type Slot = (u8, Opcode, u8, u8);

const ADD: &[Slot] = &[
    (0x00, Opcode::RamSet, 0, 0x01),
    (0x04, Opcode::Ld, Register::A as u8, 0),
    (0x08, Opcode::SetRamPointer, 0, 0x02),
    (0x0C, Opcode::RamSet, 0, 0x02),
    (0x10, Opcode::Ld, Register::B as u8, 0),
    (0x14, Opcode::Add, 0, 0),
];

const CALL: &[Slot] = &[
    (0x10, Opcode::Jump, 0, 0x40),
    (0x40, Opcode::Jump, 0, 0x80),
    (0x44, Opcode::Return, 0, 0),
    (0x80, Opcode::Return, 0, 0),
];

const OVERFLOW: &[Slot] = &[
    (0x00, Opcode::Jump, 0, 0x80),
    (0x80, Opcode::Jump, 0, 0x80),
];

impl Demo {
    /// Poke the demo into program memory. Other banks are left as they are.
    pub fn load(self, nemo: &mut Nemo) {
        match self {
            Demo::Add => poke_all(nemo, 0, ADD),
            Demo::Call => poke_all(nemo, 0, CALL),
            Demo::Overflow => poke_all(nemo, 0, OVERFLOW),
            Demo::Banks => {
                // Each bank: point at its own RAM cell, mark it, move on.
                // Slot offsets advance so execution continues where the
                // previous bank left off.
                for bank in 0..nemo_core::ROM_BANK_COUNT {
                    let base = (bank * 12) as u8;
                    poke_all(nemo, bank, &[
                        (base, Opcode::SetRamPointer, 0, 0x40 + bank as u8),
                        (base + 4, Opcode::RamSet, 0, 0xB0 + bank as u8),
                        (base + 8, Opcode::NextRomBank, 0, 0),
                    ]);
                }
            }
        }
    }
}

fn poke_all(nemo: &mut Nemo, bank: usize, slots: &[Slot]) {
    for &(offset, op, parameter, operand) in slots {
        nemo.poke_instruction(bank, offset, op.into(), parameter, operand);
    }
}
