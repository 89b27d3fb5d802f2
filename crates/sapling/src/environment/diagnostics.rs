//! Histogram and listing views of an environment for debugging

use std::fmt::Write;

use super::{Environment, SymbolTable};

/// Width of a full histogram bar.
const BAR_WIDTH: usize = 74;

const RULE: &str =
    "<----------------------------------------------------------------------------->";

impl Environment {
    /// Binding counts per table as `>` bars scaled to the fullest table.
    ///
    /// Frames are listed innermost first under `Global Table:`, the base
    /// table under `System Table:`.
    pub fn histogram(&self) -> String {
        let largest = self
            .stack
            .iter()
            .map(SymbolTable::len)
            .chain(std::iter::once(self.base.len()))
            .max()
            .unwrap_or(0);

        let mut out = String::from("Global Table:\n\n");
        for frame in self.stack.iter().rev() {
            out.push_str("----\n");
            histogram_line(&mut out, frame.len(), largest);
        }
        out.push_str("\n\n\nSystem Table:\n\n");
        histogram_line(&mut out, self.base.len(), largest);
        out
    }

    /// Every bound key, frames innermost first, then the base table.
    pub fn print(&self) -> String {
        let mut out = String::from("Global Table:\n\n");
        out.push_str(RULE);
        out.push_str("\n\n");
        for frame in self.stack.iter().rev() {
            list_keys(&mut out, frame, 4);
            out.push('\n');
            out.push_str(RULE);
            out.push_str("\n\n");
        }
        out.push_str("\n\n\nSystem Table:\n\n");
        list_keys(&mut out, &self.base, 4);
        out
    }
}

fn histogram_line(out: &mut String, count: usize, largest: usize) {
    let mut len = if largest == 0 {
        0
    } else {
        (BAR_WIDTH * count + largest / 2) / largest
    };
    if count > 0 && len == 0 {
        len = 1;
    }
    let _ = writeln!(out, "{count:<4}|{}", ">".repeat(len));
}

fn list_keys(out: &mut String, table: &SymbolTable, indent: usize) {
    for key in table.keys() {
        let _ = writeln!(out, "{:indent$}{key}", "");
    }
}
