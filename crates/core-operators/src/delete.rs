//! Delete and yank.

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use core_state::Selection;
use core_text::{Position, Range};
use tracing::trace;

impl Session {
    pub(crate) fn delete(&mut self, op: &mut Operator) -> Outcome {
        let outcome = self.mutate_selections(op, Self::delete_selection);
        if outcome == Outcome::Finished {
            self.flush_register(op);
            if let Some(top) = op.block_top.take() {
                self.editor.set_cursor(top);
                self.editor.activate_mode(op.final_mode);
            }
        }
        outcome
    }

    fn delete_selection(&mut self, op: &mut Operator, idx: usize) {
        let sel = self.editor.selection(idx);
        if sel.is_empty() {
            return;
        }
        let mut range = sel.range;
        let buf = self.editor.buffer();
        // a final row without a newline takes the previous row's newline
        if op.is_linewise()
            && range.end == buf.end_position()
            && range.end.col != 0
            && range.start.col == 0
            && range.start.line > 0
        {
            let prev = range.start.line - 1;
            range = Range::new(Position::new(prev, buf.line_len(prev)), range.end);
        }
        op.yanked.push(buf.text_in_range(sel.range));
        let removed = self.editor.set_text_in_range(range, "");
        let buf = self.editor.buffer();
        let cursor = match self.stay_point(op, idx).filter(|_| self.need_stay(op)) {
            Some(stay) => stay,
            None if removed.start.line > buf.vim_last_line() => {
                Position::new(buf.vim_last_line(), 0)
            }
            None if op.is_linewise() => {
                let row = removed.start.line.min(buf.vim_last_line());
                Position::new(row, buf.first_non_blank_col(row))
            }
            None => removed.start,
        };
        trace!(target: "operator.delete", line = cursor.line, col = cursor.col, "cursor_after_delete");
        self.editor.set_selection(idx, Selection::cursor(cursor));
    }

    pub(crate) fn yank(&mut self, op: &mut Operator) -> Outcome {
        let outcome = self.mutate_selections(op, |s, op, idx| {
            let sel = s.editor.selection(idx);
            op.yanked.push(s.editor.buffer().text_in_range(sel.range));
            let cursor = s
                .stay_point(op, idx)
                .filter(|_| s.need_stay(op))
                .unwrap_or(sel.range.start);
            s.editor.set_selection(idx, Selection::cursor(cursor));
        });
        if outcome == Outcome::Finished {
            self.flush_register(op);
        }
        outcome
    }
}
