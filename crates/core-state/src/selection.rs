//! Selection model.
//!
//! A selection is a half-open buffer range plus a direction flag. Normal mode
//! cursors are empty selections; characterwise and linewise visual mode use a
//! single (or one per cursor) non-empty range; blockwise visual mode keeps one
//! selection per row.

use core_text::{Position, Range};

/// Orientation of a selection, target, or register payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    #[default]
    Characterwise,
    Linewise,
    Blockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub range: Range,
    /// Head sits at `range.start` when reversed.
    pub reversed: bool,
}

impl Selection {
    pub fn new(range: Range, reversed: bool) -> Self {
        Self { range, reversed }
    }

    /// Empty selection (a bare cursor).
    pub fn cursor(pos: Position) -> Self {
        Self {
            range: Range::point(pos),
            reversed: false,
        }
    }

    /// Build from anchor (tail) and head positions.
    pub fn from_anchor(tail: Position, head: Position) -> Self {
        Self {
            range: Range::new(tail, head),
            reversed: head < tail,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn head(&self) -> Position {
        if self.reversed {
            self.range.start
        } else {
            self.range.end
        }
    }

    pub fn tail(&self) -> Position {
        if self.reversed {
            self.range.end
        } else {
            self.range.start
        }
    }

    /// Collapse onto `pos`.
    pub fn collapse_to(&mut self, pos: Position) {
        self.range = Range::point(pos);
        self.reversed = false;
    }
}

/// Where blockwise normalization collapses each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnchor {
    Start,
    End,
}

/// Selection ranges saved when visual mode ends, for later reselection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedSelection {
    pub ranges: Vec<Range>,
    pub kind: SelectionKind,
}
