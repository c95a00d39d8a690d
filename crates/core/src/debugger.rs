//! Memory panels for the display collaborator.
//!
//! A panel lays a byte space out 16 cells to a row under a column header,
//! each row labelled with its first offset. One cell can carry the cursor
//! (the counter in a program bank, the data pointer in RAM or VRAM) and a
//! span of cells can be marked, which the RAM panel uses for the stack.
//!
//! Nothing here mutates engine state.

use std::ops::Range;

const CELLS_PER_ROW: usize = 16;

/// Decorations applied on top of the plain `[XX]` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelMarks {
    /// Cell drawn as `<XX>`
    pub cursor: Option<u8>,
    /// Cells drawn as `{XX}` unless under the cursor
    pub region: Option<Range<usize>>,
}

impl PanelMarks {
    pub fn cursor(at: u8) -> Self {
        PanelMarks { cursor: Some(at), region: None }
    }

    pub fn with_region(mut self, region: Range<usize>) -> Self {
        self.region = Some(region);
        self
    }

    fn cell(&self, index: usize, value: u8) -> String {
        if self.cursor.map(usize::from) == Some(index) {
            format!("<{:02X}>", value)
        } else if self.region.as_ref().is_some_and(|r| r.contains(&index)) {
            format!("{{{:02X}}}", value)
        } else {
            format!("[{:02X}]", value)
        }
    }
}

/// Format a whole byte space as a panel.
pub fn dump_panel(data: &[u8], marks: &PanelMarks) -> String {
    let mut s = String::from("    ");
    for col in 0..CELLS_PER_ROW {
        s.push_str(&format!(" +{:X} ", col));
    }
    s.push('\n');

    for (row, chunk) in data.chunks(CELLS_PER_ROW).enumerate() {
        let base = row * CELLS_PER_ROW;
        s.push_str(&format!("0x{:02X}", base));
        for (i, &v) in chunk.iter().enumerate() {
            s.push_str(&marks.cell(base + i, v));
        }
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RAM_SIZE, STACK_BASE, STACK_SLOTS};

    #[test]
    fn test_plain_panel() {
        let mut data = vec![0u8; RAM_SIZE];
        data[0x11] = 0x42;
        let dump = dump_panel(&data, &PanelMarks::default());
        let lines: Vec<&str> = dump.lines().collect();
        // Header plus 16 rows; the last row is one cell short
        assert_eq!(lines.len(), 17);
        assert!(lines[0].starts_with("     +0  +1 "));
        assert!(lines[2].starts_with("0x10[00][42][00]"));
        assert!(lines[16].starts_with("0xF0"));
        assert_eq!(lines[16].matches('[').count(), 15);
    }

    #[test]
    fn test_cursor_and_region() {
        let mut data = vec![0u8; RAM_SIZE];
        data[0xF0] = 0x24;
        data[0x20] = 0x9C;
        let stack = STACK_BASE as usize..STACK_BASE as usize + STACK_SLOTS;
        let dump = dump_panel(&data, &PanelMarks::cursor(0x20).with_region(stack));
        assert!(dump.contains("0x20<9C>[00]"));
        assert!(dump.contains("0xF0{24}{00}"));
        assert!(!dump.contains("[24]"));
    }

    #[test]
    fn test_cursor_wins_over_region() {
        let data = vec![0u8; 32];
        let dump = dump_panel(&data, &PanelMarks::cursor(0x11).with_region(0x10..0x20));
        assert!(dump.contains("0x10{00}<00>{00}"));
    }
}
