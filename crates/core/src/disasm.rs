//! Nemo instruction disassembler.
//!
//! Turns latched [`Instruction`] bytes into short assembly text for the
//! instruction view and the step log. Mnemonics are the three-letter labels
//! shown by the memory panel.

use crate::opcodes::{Instruction, Opcode};
use crate::registers::Register;

/// Short label for an opcode byte, or `None` for bytes outside the set.
pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    Opcode::from_byte(opcode).map(|op| match op {
        Opcode::Nop => "NOP",
        Opcode::Jump => "JMP",
        Opcode::Return => "RTN",
        Opcode::Add => "ADD",
        Opcode::SetRamPointer => "SRP",
        Opcode::RamSet => "RST",
        Opcode::Ld => "LD",
        Opcode::NextRomBank => "NRB",
        Opcode::End => "END",
    })
}

/// Format a latched instruction as assembly text.
///
/// Only the operands an opcode consumes are printed. Unknown opcodes are
/// shown as raw bytes.
pub fn disassemble(inst: Instruction) -> String {
    let Some(op) = inst.op() else {
        return format!(".db 0x{:02X} 0x{:02X} 0x{:02X}", inst.opcode, inst.parameter, inst.operand);
    };
    let name = mnemonic(inst.opcode).unwrap_or("???");
    match op {
        Opcode::Jump | Opcode::SetRamPointer | Opcode::RamSet => {
            format!("{} 0x{:02X}", name, inst.operand)
        }
        Opcode::Ld => match Register::try_from(inst.parameter) {
            Ok(r) => format!("LD {}", r.name()),
            Err(_) => format!("LD ?0x{:02X}", inst.parameter),
        },
        _ => name.into(),
    }
}

/// Disassemble every slot of a bank.
///
/// Returns lines of `"0xAA: OP PP DD  MNEMONIC"`.
pub fn disassemble_bank(bank: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut addr = 0usize;
    while addr < bank.len() {
        let byte = |i: usize| bank.get(addr + i).copied().unwrap_or(0);
        let inst = Instruction::decode([byte(0), byte(1), byte(2)]);
        lines.push(format!("0x{:02X}: {:02X} {:02X} {:02X}  {}",
            addr, inst.opcode, inst.parameter, inst.operand, disassemble(inst)));
        addr += crate::SLOT_WIDTH as usize;
    }
    lines
}
