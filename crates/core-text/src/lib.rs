//! Rope-based text buffer abstraction.
//!
//! Positions are expressed as (line, column) where the column counts `char`s
//! from the start of the line, excluding the line terminator. All edits go
//! through `set_text_in_range`, which reports the range the new text occupies
//! so callers (operators, the change journal in `core-state`) can track the
//! mutated region without re-scanning the buffer.

use anyhow::Result;
use ropey::Rope;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

/// A position inside a buffer: line index plus char column within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub const fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
    /// Shift by a line/column delta, saturating at zero.
    pub fn translate(self, lines: isize, cols: isize) -> Self {
        Self {
            line: self.line.saturating_add_signed(lines),
            col: self.col.saturating_add_signed(cols),
        }
    }
    /// Position reached after walking over `text` starting here.
    pub fn traverse(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            if ch == '\n' {
                pos.line += 1;
                pos.col = 0;
            } else {
                pos.col += 1;
            }
        }
        pos
    }
}

/// Half-open range `[start, end)` between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Construct a range normalizing ordering so that `start <= end`.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }
    pub fn point(p: Position) -> Self {
        Self { start: p, end: p }
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
    pub fn contains(&self, p: Position) -> bool {
        self.start <= p && p < self.end
    }
    /// Smallest range covering both.
    pub fn union(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
    /// First and last row touched. A range ending at column 0 of a later row
    /// does not touch that row.
    pub fn row_span(&self) -> (usize, usize) {
        let last = if self.end.col == 0 && self.end.line > self.start.line {
            self.end.line - 1
        } else {
            self.end.line
        };
        (self.start.line, last)
    }
}

pub mod motion;

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines in the buffer (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Last line a Vim cursor may rest on: the empty line after a trailing
    /// newline does not count.
    pub fn vim_last_line(&self) -> usize {
        let count = self.line_count();
        if count > 1 && self.line_len(count - 1) == 0 {
            count - 2
        } else {
            count - 1
        }
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line contents without the terminator. Empty for out-of-range lines.
    pub fn line_text(&self, idx: usize) -> String {
        let mut s = self.line(idx).unwrap_or_default();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Char length of a line excluding any newline.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    pub fn line_has_newline(&self, idx: usize) -> bool {
        idx < self.rope.len_lines() && self.line_len(idx) < self.rope.line(idx).len_chars()
    }

    pub fn is_blank_line(&self, idx: usize) -> bool {
        self.line_text(idx).trim().is_empty()
    }

    /// Column of the first non-whitespace char (line length for blank lines).
    pub fn first_non_blank_col(&self, idx: usize) -> usize {
        let text = self.line_text(idx);
        text.chars()
            .position(|c| !c.is_whitespace())
            .unwrap_or_else(|| text.chars().count())
    }

    /// Leading whitespace of a line.
    pub fn indentation(&self, idx: usize) -> String {
        self.line_text(idx)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len(last))
    }

    /// Clamp a position onto an existing line and column.
    pub fn clip_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// Range of a line's content (no terminator).
    pub fn line_range(&self, idx: usize) -> Range {
        Range {
            start: Position::new(idx, 0),
            end: Position::new(idx, self.line_len(idx)),
        }
    }

    /// Range covering whole lines `first..=last` including the final terminator
    /// when present.
    pub fn rows_range(&self, first: usize, last: usize) -> Range {
        let last = last.min(self.line_count() - 1);
        let end = if last + 1 < self.line_count() {
            Position::new(last + 1, 0)
        } else {
            Position::new(last, self.line_len(last))
        };
        Range {
            start: Position::new(first, 0),
            end,
        }
    }

    /// Absolute char index of a (clipped) position.
    pub fn char_index(&self, pos: Position) -> usize {
        let pos = self.clip_position(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// Position of an absolute char index (clamped to buffer end).
    pub fn position_of(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    pub fn char_at(&self, pos: Position) -> Option<char> {
        let pos = self.clip_position(pos);
        let idx = self.rope.line_to_char(pos.line) + pos.col;
        if idx < self.rope.len_chars() {
            Some(self.rope.char(idx))
        } else {
            None
        }
    }

    pub fn text_in_range(&self, range: Range) -> String {
        let a = self.char_index(range.start);
        let b = self.char_index(range.end);
        if a >= b {
            return String::new();
        }
        self.rope.slice(a..b).to_string()
    }

    /// Replace the text in `range` with `text`. Returns the range now occupied
    /// by the inserted text.
    pub fn set_text_in_range(&mut self, range: Range, text: &str) -> Range {
        let start = self.clip_position(range.start);
        let a = self.char_index(start);
        let b = self.char_index(range.end).max(a);
        if b > a {
            self.rope.remove(a..b);
        }
        if !text.is_empty() {
            self.rope.insert(a, text);
        }
        Range {
            start,
            end: start.traverse(text),
        }
    }

    /// Insert `text` at `pos`, returning the inserted range.
    pub fn insert(&mut self, pos: Position, text: &str) -> Range {
        self.set_text_in_range(Range::point(pos), text)
    }

    /// Delete `range`, returning the removed text.
    pub fn delete(&mut self, range: Range) -> String {
        let removed = self.text_in_range(range);
        self.set_text_in_range(range, "");
        removed
    }

    /// Replace the entire contents.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("lines", &self.line_count())
            .finish()
    }
}

/// Char classification used by word motions and text objects.
pub mod class {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CharClass {
        Whitespace,
        Word,
        Punctuation,
    }

    pub fn of(c: char) -> CharClass {
        if c.is_whitespace() {
            CharClass::Whitespace
        } else if is_word(c) {
            CharClass::Word
        } else {
            CharClass::Punctuation
        }
    }

    /// Naive word classification: alphanumeric or underscore.
    pub fn is_word(c: char) -> bool {
        c == '_' || c.is_alphanumeric()
    }
}
