//! Cursor motion helpers.
//!
//! These operate purely on a `Buffer` + `Position` pair and are free of global editor state.
//! Operator targets in `core-operators` compose them into selections; nothing here knows about
//! selections, counts beyond simple repetition, or modes.

use crate::class::{self, CharClass};
use crate::{Buffer, Position};

/// Move left `count` columns, stopping at column 0.
pub fn left(_buf: &Buffer, pos: &mut Position, count: usize) {
    pos.col = pos.col.saturating_sub(count);
}

/// Move right `count` columns. With `allow_eol` the cursor may land one past the last
/// char (operator-pending semantics); otherwise it stops on the last char.
pub fn right(buf: &Buffer, pos: &mut Position, count: usize, allow_eol: bool) {
    let len = buf.line_len(pos.line);
    let max = if allow_eol { len } else { len.saturating_sub(1) };
    pos.col = (pos.col + count).min(max);
}

/// Move to start of line.
pub fn line_start(_buf: &Buffer, pos: &mut Position) {
    pos.col = 0;
}

/// Move to first non-blank char of the line.
pub fn first_non_blank(buf: &Buffer, pos: &mut Position) {
    pos.col = buf.first_non_blank_col(pos.line);
}

/// Move to end of line (after last char).
pub fn line_end(buf: &Buffer, pos: &mut Position) {
    pos.col = buf.line_len(pos.line);
}

/// Move onto the last char of the line (column 0 on empty lines).
pub fn last_char(buf: &Buffer, pos: &mut Position) {
    pos.col = buf.line_len(pos.line).saturating_sub(1);
}

/// Move up `count` lines keeping the column where possible.
pub fn up(buf: &Buffer, pos: &mut Position, count: usize) {
    pos.line = pos.line.saturating_sub(count);
    pos.col = pos.col.min(buf.line_len(pos.line));
}

/// Move down `count` lines (bounded by the last Vim line) keeping the column where possible.
pub fn down(buf: &Buffer, pos: &mut Position, count: usize) {
    pos.line = (pos.line + count).min(buf.vim_last_line());
    pos.col = pos.col.min(buf.line_len(pos.line));
}

fn class_at(buf: &Buffer, pos: Position) -> Option<CharClass> {
    if pos.col >= buf.line_len(pos.line) {
        return None; // end of line acts as a separator
    }
    buf.char_at(pos).map(class::of)
}

fn step_forward(buf: &Buffer, pos: &mut Position) -> bool {
    if pos.col < buf.line_len(pos.line) {
        pos.col += 1;
        true
    } else if pos.line + 1 < buf.line_count() {
        pos.line += 1;
        pos.col = 0;
        true
    } else {
        false
    }
}

fn step_backward(buf: &Buffer, pos: &mut Position) -> bool {
    if pos.col > 0 {
        pos.col -= 1;
        true
    } else if pos.line > 0 {
        pos.line -= 1;
        pos.col = buf.line_len(pos.line);
        true
    } else {
        false
    }
}

/// Move forward to the start of the next word. Semantics (naive):
/// - If currently on a word/punctuation run, skip the rest of that run.
/// - Then skip whitespace and line breaks; an empty line counts as a word.
/// - At buffer end the cursor rests at the end position.
pub fn word_forward(buf: &Buffer, pos: &mut Position) {
    let start_line = pos.line;
    if let Some(cls) = class_at(buf, *pos).filter(|c| *c != CharClass::Whitespace) {
        while class_at(buf, *pos) == Some(cls) {
            pos.col += 1;
        }
    }
    loop {
        match class_at(buf, *pos) {
            Some(CharClass::Whitespace) => pos.col += 1,
            Some(_) => return,
            None => {
                if pos.line != start_line && buf.line_len(pos.line) == 0 {
                    return;
                }
                if !step_forward(buf, pos) {
                    return;
                }
                if pos.col == 0 && buf.line_len(pos.line) == 0 {
                    return;
                }
            }
        }
    }
}

/// Move to the last char of the current or next word.
pub fn word_end(buf: &Buffer, pos: &mut Position) {
    // always advance at least one char so repeated `e` makes progress
    if !step_forward(buf, pos) {
        return;
    }
    while class_at(buf, *pos).is_none_or(|c| c == CharClass::Whitespace) {
        if !step_forward(buf, pos) {
            return;
        }
    }
    let Some(cls) = class_at(buf, *pos) else {
        return;
    };
    while class_at(buf, Position::new(pos.line, pos.col + 1)) == Some(cls) {
        pos.col += 1;
    }
}

/// Move backward to the start of the previous word.
pub fn word_backward(buf: &Buffer, pos: &mut Position) {
    if !step_backward(buf, pos) {
        return;
    }
    while class_at(buf, *pos).is_none_or(|c| c == CharClass::Whitespace) {
        if pos.col == 0 && buf.line_len(pos.line) == 0 {
            return;
        }
        if !step_backward(buf, pos) {
            return;
        }
    }
    let Some(cls) = class_at(buf, *pos) else {
        return;
    };
    while pos.col > 0 && class_at(buf, Position::new(pos.line, pos.col - 1)) == Some(cls) {
        pos.col -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(s: &str) -> Buffer {
        Buffer::from_str("t", s).unwrap()
    }

    #[test]
    fn right_respects_eol_policy() {
        let b = buf("abc\n");
        let mut p = Position::new(0, 1);
        right(&b, &mut p, 5, false);
        assert_eq!(p.col, 2);
        let mut p = Position::new(0, 1);
        right(&b, &mut p, 5, true);
        assert_eq!(p.col, 3);
    }

    #[test]
    fn word_forward_skips_run_and_spaces() {
        let b = buf("one two.three\n");
        let mut p = Position::origin();
        word_forward(&b, &mut p);
        assert_eq!(p, Position::new(0, 4));
        word_forward(&b, &mut p);
        assert_eq!(p, Position::new(0, 7));
        word_forward(&b, &mut p);
        assert_eq!(p, Position::new(0, 8));
    }

    #[test]
    fn word_forward_crosses_line() {
        let b = buf("ab\n  cd\n");
        let mut p = Position::origin();
        word_forward(&b, &mut p);
        assert_eq!(p, Position::new(1, 2));
    }

    #[test]
    fn word_end_lands_on_last_char() {
        let b = buf("one two\n");
        let mut p = Position::origin();
        word_end(&b, &mut p);
        assert_eq!(p, Position::new(0, 2));
        word_end(&b, &mut p);
        assert_eq!(p, Position::new(0, 6));
    }

    #[test]
    fn word_backward_finds_previous_start() {
        let b = buf("one two\n");
        let mut p = Position::new(0, 5);
        word_backward(&b, &mut p);
        assert_eq!(p, Position::new(0, 4));
        word_backward(&b, &mut p);
        assert_eq!(p, Position::new(0, 0));
    }

    #[test]
    fn down_stops_at_vim_last_line() {
        let b = buf("a\nbb\n");
        let mut p = Position::new(0, 0);
        down(&b, &mut p, 5);
        assert_eq!(p.line, 1);
    }
}
