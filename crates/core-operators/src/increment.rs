//! Cursor-local number increment (`ctrl-a` / `ctrl-x`).
//!
//! In normal mode the first number on the cursor row ending after the cursor
//! is bumped; in visual mode every number inside the selection is. Each
//! match is bumped from its own value (see `IncrementNumber` in the
//! transform module for the chained variant).

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use core_events::OperatorEvent;
use core_state::{EditorState, Selection};
use core_text::{Position, Range};
use regex::Regex;
use tracing::{debug, warn};

/// One number to replace.
struct Hit {
    selection: usize,
    range: Range,
    value: i64,
}

/// Matches on `row` between char columns `from..to`.
fn matches_in_row(
    re: &Regex,
    editor: &EditorState,
    row: usize,
    from: usize,
    to: usize,
) -> Vec<(Range, i64)> {
    let line = editor.line_text(row);
    let byte_of = |col: usize| line.char_indices().nth(col).map_or(line.len(), |(b, _)| b);
    let (start, end) = (byte_of(from), byte_of(to));
    let slice = &line[start..end];
    re.find_iter(slice)
        .filter_map(|m| {
            let value = m.as_str().parse::<i64>().ok()?;
            let col = from + slice[..m.start()].chars().count();
            let len = m.as_str().chars().count();
            let range = Range::new(Position::new(row, col), Position::new(row, col + len));
            Some((range, value))
        })
        .collect()
}

impl Session {
    pub(crate) fn increase(&mut self, op: &mut Operator, step: i64) -> Outcome {
        let re = match Regex::new(&self.config.file.number.pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(target: "operator.increase", pattern = %self.config.file.number.pattern, error = %e, "invalid_number_pattern");
                return Outcome::NoOp;
            }
        };
        let visual = self.editor.is_visual();
        let mut hits = Vec::new();
        for (i, sel) in self.editor.selections().iter().enumerate() {
            if visual {
                let (first, last) = sel.range.row_span();
                for row in first..=last {
                    let from = if row == sel.range.start.line {
                        sel.range.start.col
                    } else {
                        0
                    };
                    let to = if row == sel.range.end.line {
                        sel.range.end.col
                    } else {
                        self.editor.buffer().line_len(row)
                    };
                    hits.extend(
                        matches_in_row(&re, &self.editor, row, from, to)
                            .into_iter()
                            .map(|(range, value)| Hit {
                                selection: i,
                                range,
                                value,
                            }),
                    );
                }
            } else {
                let head = sel.head();
                let len = self.editor.buffer().line_len(head.line);
                let hit = matches_in_row(&re, &self.editor, head.line, 0, len)
                    .into_iter()
                    .find(|(range, _)| range.end.col > head.col);
                if let Some((range, value)) = hit {
                    hits.push(Hit {
                        selection: i,
                        range,
                        value,
                    });
                }
            }
        }
        let delta = i64::try_from(op.count)
            .ok()
            .and_then(|count| step.checked_mul(count));
        // a number that would leave the i64 range stays as it is
        let mut bumps: Vec<(Hit, i64)> = hits
            .into_iter()
            .filter_map(|hit| {
                let next = delta.and_then(|d| hit.value.checked_add(d));
                if next.is_none() {
                    debug!(target: "operator.increase", value = hit.value, "overflow_skipped");
                }
                next.map(|next| (hit, next))
            })
            .collect();
        if bumps.is_empty() {
            debug!(target: "operator.increase", operator = op.name(), "no_number");
            self.events.emit(OperatorEvent::Beep {
                operator: op.name().to_string(),
            });
            self.finish_no_op(op);
            return Outcome::NoOp;
        }
        bumps.sort_by_key(|(h, _)| h.range.start);
        self.editor.begin_transaction();
        let mut markers = Vec::new();
        for (hit, next) in bumps.iter().rev() {
            let new = self.editor.set_text_in_range(hit.range, &next.to_string());
            markers.push(self.editor.track_range(new));
            if !visual {
                let end = Position::new(new.end.line, new.end.col.saturating_sub(1));
                self.editor.set_selection(hit.selection, Selection::cursor(end));
            }
        }
        self.editor.end_transaction();
        if visual {
            let starts: Vec<Position> = self
                .editor
                .selections()
                .iter()
                .map(|s| s.range.start)
                .collect();
            self.editor.set_cursors(&starts);
        }
        let ranges: Vec<Range> = markers
            .into_iter()
            .filter_map(|m| {
                let range = self.editor.tracked_range(m);
                self.editor.untrack(m);
                range
            })
            .collect();
        let name = op.name().to_string();
        self.flash(&name, ranges);
        self.finish(op);
        Outcome::Finished
    }
}

#[cfg(test)]
mod tests {
    use crate::{OperatorRequest, Outcome, Session};
    use core_config::Config;
    use core_events::RecordingHooks;
    use core_state::{EditorState, SelectionKind};
    use core_text::{Position, Range};
    use pretty_assertions::assert_eq;

    fn session(text: &str, at: Position) -> Session {
        let mut editor = EditorState::from_text(text).unwrap();
        editor.set_cursor(at);
        Session::new(editor, Config::default())
    }

    #[test]
    fn bumps_number_under_or_after_cursor() {
        let mut s = session("x = 9; y = 20", Position::new(0, 0));
        s.run(OperatorRequest::new("Increase")).unwrap();
        assert_eq!(s.editor.text(), "x = 10; y = 20");
        assert_eq!(s.editor.cursor(), Position::new(0, 5));
        s.editor.set_cursor(Position::new(0, 12));
        s.run(OperatorRequest::new("Decrease").count(25)).unwrap();
        assert_eq!(s.editor.text(), "x = 10; y = -5");
        assert_eq!(s.editor.cursor(), Position::new(0, 13));
    }

    #[test]
    fn visual_bumps_every_number_independently() {
        let mut s = session("1 1\n5\n", Position::new(0, 0));
        s.editor.select_range(
            Range::new(Position::new(0, 0), Position::new(1, 1)),
            SelectionKind::Characterwise,
        );
        s.run(OperatorRequest::new("Increase")).unwrap();
        assert_eq!(s.editor.text(), "2 2\n6\n");
        assert_eq!(s.editor.cursor(), Position::new(0, 0));
    }

    #[test]
    fn overflowing_number_is_left_alone() {
        let hooks = RecordingHooks::new();
        let mut s = session("9223372036854775807", Position::new(0, 0));
        s.register_hooks(hooks.clone());
        assert_eq!(s.run(OperatorRequest::new("Increase")).unwrap(), Outcome::NoOp);
        assert_eq!(s.editor.text(), "9223372036854775807");
        assert!(hooks.kinds().contains(&"beep"));
        assert_eq!(s.editor.undo_depth(), 0);

        let mut s = session("-9223372036854775808", Position::new(0, 0));
        assert_eq!(s.run(OperatorRequest::new("Decrease")).unwrap(), Outcome::NoOp);
        assert_eq!(s.editor.text(), "-9223372036854775808");
    }

    #[test]
    fn visual_skips_only_the_overflowing_number() {
        let mut s = session("9223372036854775807 1\n", Position::new(0, 0));
        s.editor.select_range(
            Range::new(Position::new(0, 0), Position::new(0, 21)),
            SelectionKind::Characterwise,
        );
        s.run(OperatorRequest::new("Increase")).unwrap();
        assert_eq!(s.editor.text(), "9223372036854775807 2\n");
    }

    #[test]
    fn huge_count_is_a_noop() {
        let mut s = session("5", Position::new(0, 0));
        let out = s.run(OperatorRequest::new("Increase").count(usize::MAX)).unwrap();
        assert_eq!(out, Outcome::NoOp);
        assert_eq!(s.editor.text(), "5");
    }

    #[test]
    fn no_number_beeps() {
        let hooks = RecordingHooks::new();
        let mut s = session("abc", Position::new(0, 0));
        s.register_hooks(hooks.clone());
        assert_eq!(s.run(OperatorRequest::new("Increase")).unwrap(), Outcome::NoOp);
        assert!(hooks.kinds().contains(&"beep"));
        assert_eq!(s.editor.undo_depth(), 0);
    }
}
