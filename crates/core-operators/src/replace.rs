//! Replace every selected char with the typed one (`r`).

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use crate::spec::OperatorFlags;
use core_state::{Selection, SelectionKind};
use tracing::trace;

impl Session {
    pub(crate) fn replace(&mut self, op: &mut Operator) -> Outcome {
        let keep_top = op.has(OperatorFlags::KEEP_TOP_BLOCK)
            && self.editor.visual_kind() == Some(SelectionKind::Blockwise);
        let outcome = self.mutate_with_input(op, Self::replace_selection);
        if keep_top && outcome == Outcome::Finished {
            self.editor.keep_top_selection();
        }
        outcome
    }

    fn replace_selection(&mut self, op: &mut Operator, idx: usize) {
        let sel = self.editor.selection(idx);
        if sel.is_empty() {
            return;
        }
        let input = op
            .inputs
            .last()
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| "\n".to_string());
        let old = self.editor.selected_text(idx);
        // `r` with a count past the line end does nothing
        if op.target_name() == Some("MoveRight") && old.chars().count() != op.count {
            trace!(target: "operator.replace", wanted = op.count, available = old.chars().count(), "replace_past_line_end");
            let back = self.stay_point(op, idx).unwrap_or(sel.range.start);
            self.editor.set_selection(idx, Selection::cursor(back));
            return;
        }
        let new: String = old
            .chars()
            .map(|c| {
                if c == '\n' {
                    "\n".to_string()
                } else {
                    input.clone()
                }
            })
            .collect();
        let range = self.editor.set_text_in_range(sel.range, &new);
        let cursor = if input == "\n" { range.end } else { range.start };
        self.editor.set_selection(idx, Selection::cursor(cursor));
    }
}
