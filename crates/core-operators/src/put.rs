//! Put (paste) from a register.

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use crate::target::resolve_target;
use core_state::{Mode, Selection, SelectionKind};
use core_text::{Position, Range};
use tracing::debug;

impl Session {
    pub(crate) fn put(&mut self, op: &mut Operator, before: bool, select: bool) -> Outcome {
        let entry = self.registers.get(op.register);
        if entry.is_empty() {
            debug!(target: "operator.put", operator = op.name(), register = ?op.register, "register_empty");
            self.finish_no_op(op);
            return Outcome::NoOp;
        }
        let visual = self.editor.visual_kind();
        let linewise =
            entry.kind == SelectionKind::Linewise || visual == Some(SelectionKind::Linewise);
        let text = entry.text.repeat(op.count);
        if visual.is_some() {
            op.target = resolve_target("CurrentSelection");
            if !self.select_target(op) {
                self.finish_no_op(op);
                return Outcome::NoOp;
            }
            // the pasted range replaces the tracked selection as change marks
            if let Some(marker) = op.marker.take() {
                self.editor.untrack(marker);
            }
        }
        self.editor.begin_transaction();
        let mut markers = Vec::new();
        for i in 0..self.editor.selections().len() {
            let pasted = self.paste_at(i, &text, linewise, before, visual);
            markers.push(self.editor.track_range(pasted));
        }
        self.editor.end_transaction();
        let pasted: Vec<Range> = markers
            .into_iter()
            .filter_map(|m| {
                let range = self.editor.tracked_range(m);
                self.editor.untrack(m);
                range
            })
            .collect();

        if select {
            let sels = pasted.iter().map(|r| Selection::new(*r, false)).collect();
            self.editor.set_selections(sels);
            op.final_mode = Mode::Visual(if linewise {
                SelectionKind::Linewise
            } else {
                SelectionKind::Characterwise
            });
        } else {
            let buf = self.editor.buffer();
            let cursors: Vec<Position> = pasted
                .iter()
                .map(|r| {
                    if linewise {
                        Position::new(r.start.line, buf.first_non_blank_col(r.start.line))
                    } else if r.is_single_line() {
                        Position::new(r.end.line, r.end.col.saturating_sub(1))
                    } else {
                        r.start
                    }
                })
                .collect();
            self.editor.set_cursors(&cursors);
        }
        if let Some(union) = pasted.iter().copied().reduce(|a, b| a.union(&b)) {
            self.marks.set_change_range(union);
        }
        let name = op.name().to_string();
        self.flash(&name, pasted);
        self.finish(op);
        Outcome::Finished
    }

    /// Paste into one selection and return the range the text now occupies.
    fn paste_at(
        &mut self,
        idx: usize,
        text: &str,
        linewise: bool,
        before: bool,
        visual: Option<SelectionKind>,
    ) -> Range {
        let sel = self.editor.selection(idx);
        let buf = self.editor.buffer();
        if !sel.is_empty() {
            let replacement = if !linewise {
                text.to_string()
            } else if visual != Some(SelectionKind::Linewise) {
                format!("\n{text}")
            } else if sel.range.end.col != 0 {
                // selection runs to the end of a buffer without final newline
                text.strip_suffix('\n').unwrap_or(text).to_string()
            } else {
                with_newline(text)
            };
            return self.editor.set_text_in_range(sel.range, &replacement);
        }
        let head = sel.head();
        if linewise {
            let text = with_newline(text);
            if before {
                return self
                    .editor
                    .set_text_in_range(Range::point(Position::new(head.line, 0)), &text);
            }
            if buf.line_has_newline(head.line) {
                return self
                    .editor
                    .set_text_in_range(Range::point(Position::new(head.line + 1, 0)), &text);
            }
            let at = Position::new(head.line, buf.line_len(head.line));
            let body = text.strip_suffix('\n').unwrap_or(&text);
            let inserted = self
                .editor
                .set_text_in_range(Range::point(at), &format!("\n{body}"));
            return Range::new(Position::new(head.line + 1, 0), inserted.end);
        }
        let mut at = head;
        if !before && buf.line_len(at.line) > 0 {
            at.col = (at.col + 1).min(buf.line_len(at.line));
        }
        self.editor.set_text_in_range(Range::point(at), text)
    }
}

fn with_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}
