//! Join, repeat and mark.

use crate::error::{OperatorError, Outcome};
use crate::operator::Operator;
use crate::session::Session;
use crate::spec::Behavior;
use core_text::Position;
use tracing::{debug, trace};

impl Session {
    /// Host-native line join, `count` times per cursor (or once per row
    /// pair of each visual selection).
    pub(crate) fn join(&mut self, op: &mut Operator) -> Outcome {
        let visual = self.editor.is_visual();
        let mut plans: Vec<(usize, usize, usize)> = self
            .editor
            .selections()
            .iter()
            .enumerate()
            .map(|(i, sel)| {
                if visual {
                    let (first, last) = sel.range.row_span();
                    (i, first, (last - first).max(1))
                } else {
                    (i, sel.head().line, op.count)
                }
            })
            .collect();
        let last_row = self.editor.buffer().vim_last_line();
        if plans.iter().all(|(_, row, _)| *row >= last_row) {
            trace!(target: "operator.join", "nothing_to_join");
            self.finish_no_op(op);
            return Outcome::NoOp;
        }
        // bottom-up keeps the rows above stable
        plans.sort_by_key(|(_, row, _)| std::cmp::Reverse(*row));
        let mut cursors: Vec<(usize, Position)> = Vec::new();
        self.editor.begin_transaction();
        for (idx, row, times) in plans {
            let mut at = None;
            for _ in 0..times {
                match self.editor.join_lines(row) {
                    Some(p) => at = Some(p),
                    None => break,
                }
            }
            if let Some(p) = at {
                cursors.push((idx, p));
            }
        }
        self.editor.end_transaction();
        cursors.sort_by_key(|(idx, _)| *idx);
        let positions: Vec<Position> = cursors.into_iter().map(|(_, p)| p).collect();
        self.editor.set_cursors(&positions);
        self.finish(op);
        Outcome::Finished
    }

    /// Run the recorded operator again `count` times as one undo step.
    pub(crate) fn repeat(&mut self, op: &mut Operator) -> Result<Outcome, OperatorError> {
        let Some(recorded) = self.recorded.clone() else {
            debug!(target: "operator.repeat", "nothing_recorded");
            return Ok(Outcome::NoOp);
        };
        debug!(target: "operator.repeat", operator = recorded.name(), count = op.count, "repeat");
        self.editor.begin_transaction();
        let mut outcome = Ok(Outcome::NoOp);
        for _ in 0..op.count {
            let mut again = recorded.for_repeat();
            outcome = self.execute(&mut again);
            if !matches!(outcome, Ok(Outcome::Finished)) {
                break;
            }
        }
        self.editor.end_transaction();
        outcome
    }

    pub(crate) async fn repeat_async(
        &mut self,
        op: &mut Operator,
    ) -> Result<Outcome, OperatorError> {
        let Some(recorded) = self
            .recorded
            .clone()
            .filter(|r| r.spec.behavior == Behavior::ExternalCommand)
        else {
            return self.repeat(op);
        };
        self.editor.begin_transaction();
        let mut outcome = Outcome::NoOp;
        for _ in 0..op.count {
            let mut again = recorded.for_repeat();
            outcome = self.execute_async(&mut again).await;
            if outcome != Outcome::Finished {
                break;
            }
        }
        self.editor.end_transaction();
        Ok(outcome)
    }

    /// Store the cursor under the typed mark name.
    pub(crate) fn mark(&mut self, op: &mut Operator) -> Outcome {
        let Some(name) = self.read_input(op).and_then(|s| s.chars().next()) else {
            self.cancel(op);
            return Outcome::Cancelled;
        };
        self.marks.set(name, self.editor.cursor());
        self.finish(op);
        Outcome::Finished
    }
}
