//! Motion targets: the range from each cursor to where the motion lands.

use super::{Target, TargetKind, select_each};
use core_state::{EditorState, SelectionKind};
use core_text::{Buffer, Position, Range, class, motion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveToBeginningOfLine,
    MoveToFirstCharacterOfLine,
    MoveToLastCharacterOfLine,
    MoveToNextWord,
    MoveToEndOfWord,
    MoveToRelativeLine,
    /// Relative line spanning at least two rows (join-style operators).
    MoveToRelativeLineMinimumTwo,
}

impl MotionKind {
    pub const ALL: [MotionKind; 11] = [
        MotionKind::MoveLeft,
        MotionKind::MoveRight,
        MotionKind::MoveUp,
        MotionKind::MoveDown,
        MotionKind::MoveToBeginningOfLine,
        MotionKind::MoveToFirstCharacterOfLine,
        MotionKind::MoveToLastCharacterOfLine,
        MotionKind::MoveToNextWord,
        MotionKind::MoveToEndOfWord,
        MotionKind::MoveToRelativeLine,
        MotionKind::MoveToRelativeLineMinimumTwo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MotionKind::MoveLeft => "MoveLeft",
            MotionKind::MoveRight => "MoveRight",
            MotionKind::MoveUp => "MoveUp",
            MotionKind::MoveDown => "MoveDown",
            MotionKind::MoveToBeginningOfLine => "MoveToBeginningOfLine",
            MotionKind::MoveToFirstCharacterOfLine => "MoveToFirstCharacterOfLine",
            MotionKind::MoveToLastCharacterOfLine => "MoveToLastCharacterOfLine",
            MotionKind::MoveToNextWord => "MoveToNextWord",
            MotionKind::MoveToEndOfWord => "MoveToEndOfWord",
            MotionKind::MoveToRelativeLine => "MoveToRelativeLine",
            MotionKind::MoveToRelativeLineMinimumTwo => "MoveToRelativeLineMinimumTwo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn wise(self) -> SelectionKind {
        match self {
            MotionKind::MoveUp
            | MotionKind::MoveDown
            | MotionKind::MoveToRelativeLine
            | MotionKind::MoveToRelativeLineMinimumTwo => SelectionKind::Linewise,
            _ => SelectionKind::Characterwise,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Motion {
    kind: MotionKind,
    operator: Option<&'static str>,
}

impl Motion {
    pub fn new(kind: MotionKind) -> Self {
        Self {
            kind,
            operator: None,
        }
    }

    pub fn motion_kind(&self) -> MotionKind {
        self.kind
    }

    /// Range covered when moving from `head`. `None` when the motion cannot
    /// move at all.
    fn range_from(&self, buf: &Buffer, head: Position, count: usize) -> Option<Range> {
        let count = count.max(1);
        let last_row = buf.vim_last_line();
        let range = match self.kind {
            MotionKind::MoveLeft => {
                let mut p = head;
                motion::left(buf, &mut p, count);
                Range::new(p, head)
            }
            MotionKind::MoveRight => {
                let mut p = head;
                motion::right(buf, &mut p, count, true);
                Range::new(head, p)
            }
            MotionKind::MoveUp => {
                if head.line == 0 {
                    return None;
                }
                buf.rows_range(head.line.saturating_sub(count), head.line)
            }
            MotionKind::MoveDown => {
                if head.line >= last_row {
                    return None;
                }
                buf.rows_range(head.line, (head.line + count).min(last_row))
            }
            MotionKind::MoveToBeginningOfLine => Range::new(Position::new(head.line, 0), head),
            MotionKind::MoveToFirstCharacterOfLine => {
                let mut p = head;
                motion::first_non_blank(buf, &mut p);
                Range::new(p, head)
            }
            MotionKind::MoveToLastCharacterOfLine => {
                let row = (head.line + count - 1).min(last_row);
                Range::new(head, Position::new(row, buf.line_len(row)))
            }
            MotionKind::MoveToNextWord => {
                if self.operator == Some("Change") && !on_whitespace(buf, head) {
                    let end = end_of_word(buf, head, count, true);
                    return Some(Range::new(head, next_col(buf, end)));
                }
                let mut p = head;
                for step in 0..count {
                    let before = p;
                    motion::word_forward(buf, &mut p);
                    // the final word of a line stops at its line end
                    if step + 1 == count && p.line > before.line {
                        p = Position::new(before.line, buf.line_len(before.line));
                    }
                }
                Range::new(head, p)
            }
            MotionKind::MoveToEndOfWord => {
                let end = end_of_word(buf, head, count, false);
                Range::new(head, next_col(buf, end))
            }
            MotionKind::MoveToRelativeLine => {
                buf.rows_range(head.line, (head.line + count - 1).min(last_row))
            }
            MotionKind::MoveToRelativeLineMinimumTwo => {
                let rows = (count - 1).max(1);
                buf.rows_range(head.line, (head.line + rows).min(last_row))
            }
        };
        Some(range)
    }
}

fn on_whitespace(buf: &Buffer, pos: Position) -> bool {
    pos.col >= buf.line_len(pos.line) || buf.char_at(pos).is_none_or(char::is_whitespace)
}

/// Last char of the word `count` words ahead. With `include_current` the
/// word under the cursor counts as the first one.
fn end_of_word(buf: &Buffer, head: Position, count: usize, include_current: bool) -> Position {
    let mut p = head;
    let mut remaining = count;
    if include_current {
        let here = buf.char_at(p).map(class::of);
        let next = buf
            .char_at(Position::new(p.line, p.col + 1))
            .filter(|_| p.col + 1 < buf.line_len(p.line))
            .map(class::of);
        if here.is_some() && here == next {
            motion::word_end(buf, &mut p);
        }
        remaining -= 1;
    }
    for _ in 0..remaining {
        motion::word_end(buf, &mut p);
    }
    p
}

/// Position just after the char at `pos` (inclusive motions).
fn next_col(buf: &Buffer, pos: Position) -> Position {
    Position::new(pos.line, (pos.col + 1).min(buf.line_len(pos.line)))
}

impl Target for Motion {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Motion
    }

    fn wise(&self, _state: &EditorState) -> SelectionKind {
        self.kind.wise()
    }

    fn select(&mut self, state: &mut EditorState, count: usize) -> bool {
        select_each(state, |st, sel| self.range_from(st.buffer(), sel.head(), count))
    }

    fn bind_operator(&mut self, operator: &'static str) {
        self.operator = Some(operator);
    }

    fn box_clone(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn selected(text: &str, at: Position, kind: MotionKind, count: usize) -> String {
        let mut state = EditorState::from_text(text).unwrap();
        state.set_cursor(at);
        Motion::new(kind).select(&mut state, count);
        state.selected_text(0)
    }

    #[test]
    fn horizontal_motions() {
        assert_eq!(selected("abcdef", Position::new(0, 2), MotionKind::MoveRight, 2), "cd");
        assert_eq!(selected("abcdef", Position::new(0, 2), MotionKind::MoveLeft, 5), "ab");
        assert_eq!(
            selected("  abc", Position::new(0, 4), MotionKind::MoveToFirstCharacterOfLine, 1),
            "ab"
        );
        assert_eq!(
            selected("abc\ndef\n", Position::new(0, 1), MotionKind::MoveToLastCharacterOfLine, 2),
            "bc\ndef"
        );
    }

    #[test]
    fn word_motions() {
        assert_eq!(
            selected("one two three", Position::new(0, 0), MotionKind::MoveToNextWord, 1),
            "one "
        );
        assert_eq!(
            selected("one\ntwo", Position::new(0, 1), MotionKind::MoveToNextWord, 1),
            "ne"
        );
        assert_eq!(
            selected("one two", Position::new(0, 0), MotionKind::MoveToEndOfWord, 1),
            "one"
        );
    }

    #[test]
    fn change_binds_next_word_to_word_end() {
        let mut state = EditorState::from_text("one two").unwrap();
        let mut m = Motion::new(MotionKind::MoveToNextWord);
        m.bind_operator("Change");
        m.select(&mut state, 1);
        assert_eq!(state.selected_text(0), "one");
    }

    #[test]
    fn linewise_motions() {
        assert_eq!(
            selected("a\nb\nc\n", Position::new(1, 0), MotionKind::MoveToRelativeLine, 1),
            "b\n"
        );
        assert_eq!(
            selected("a\nb\nc\n", Position::new(0, 0), MotionKind::MoveToRelativeLineMinimumTwo, 1),
            "a\nb\n"
        );
        assert_eq!(
            selected("a\nb\nc\n", Position::new(0, 0), MotionKind::MoveToRelativeLineMinimumTwo, 3),
            "a\nb\nc\n"
        );
        assert_eq!(selected("a\nb\n", Position::new(0, 0), MotionKind::MoveUp, 1), "");
        assert_eq!(selected("a\nb\n", Position::new(0, 0), MotionKind::MoveDown, 1), "a\nb\n");
    }
}
