//! Position marks.
//!
//! `[` and `]` bracket the most recent change, `^` records where the last
//! insert session ended. Letters are user marks.

use core_text::{Position, Range};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default, Clone)]
pub struct Marks {
    marks: HashMap<char, Position>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: char) -> Option<Position> {
        self.marks.get(&name).copied()
    }

    pub fn set(&mut self, name: char, pos: Position) {
        trace!(target: "state.marks", mark = %name, line = pos.line, col = pos.col, "mark_set");
        self.marks.insert(name, pos);
    }

    /// Record `[` and `]` around a changed range.
    pub fn set_change_range(&mut self, range: Range) {
        self.set('[', range.start);
        self.set(']', range.end);
    }

    pub fn change_range(&self) -> Option<Range> {
        Some(Range::new(self.get('[')?, self.get(']')?))
    }
}
