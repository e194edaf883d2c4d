//! Insert-mode activation.
//!
//! Each operator positions the cursors (possibly editing, like `o` or `c`),
//! then hands control to the host in insert mode and returns
//! `Outcome::InsertPending`. `Session::leave_insert_mode` closes the session:
//! it captures what was typed, adds the count copies, steps the cursors left
//! and groups everything since the first checkpoint into one undo step.
//!
//! A repeated operator replays the captured text instead of entering insert
//! mode. `Change` re-selects its target on repeat like every other variant.

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use crate::spec::{InsertKind, OperatorFlags};
use core_events::OperatorEvent;
use core_state::{
    InsertOptions, InsertSubmode, Mode, RegisterEntry, Selection, SelectionKind,
};
use core_text::{Position, motion};
use tracing::{debug, trace};

impl Session {
    pub(crate) fn activate_insert(&mut self, op: &mut Operator, kind: InsertKind) -> Outcome {
        let undo_checkpoint = self.editor.create_checkpoint();
        op.insert.undo_checkpoint = Some(undo_checkpoint);
        if !self.position_for_insert(op, kind) {
            return Outcome::NoOp;
        }
        op.insert.insertion_count = if op.has(OperatorFlags::SUPPORTS_INSERTION_COUNT) {
            op.count - 1
        } else {
            0
        };
        op.insert.text_by_operator = if op.insert.insertion_count > 0 {
            self.editor
                .inserted_text_since(undo_checkpoint)
                .map(|(_, text)| text)
                .unwrap_or_default()
        } else {
            String::new()
        };
        if op.repeated {
            return self.replay_insert(op, kind);
        }
        op.insert.insert_checkpoint = Some(self.editor.create_checkpoint());
        let submode = if kind == InsertKind::Replace {
            InsertSubmode::Replace
        } else {
            InsertSubmode::Default
        };
        self.editor.activate_mode(Mode::Insert(submode));
        debug!(target: "operator.insert", operator = op.name(), ?submode, insertion_count = op.insert.insertion_count, "insert_started");
        self.events.emit(OperatorEvent::InsertStarted {
            operator: op.name().to_string(),
        });
        Outcome::InsertPending
    }

    /// Move (or edit) to where typing starts. False when a target selected
    /// nothing.
    fn position_for_insert(&mut self, op: &mut Operator, kind: InsertKind) -> bool {
        let buf = self.editor.buffer();
        let heads = self.editor.cursors();
        let moved: Option<Vec<Position>> = match kind {
            InsertKind::Insert | InsertKind::Replace => None,
            InsertKind::After => Some(
                heads
                    .into_iter()
                    .map(|mut p| {
                        motion::right(buf, &mut p, 1, true);
                        p
                    })
                    .collect(),
            ),
            InsertKind::AtBeginningOfLine => Some(
                heads
                    .into_iter()
                    .map(|p| Position::new(p.line, buf.first_non_blank_col(p.line)))
                    .collect(),
            ),
            InsertKind::AfterEndOfLine => Some(
                heads
                    .into_iter()
                    .map(|p| Position::new(p.line, buf.line_len(p.line)))
                    .collect(),
            ),
            InsertKind::AtLastInsert => {
                let last = self.marks.get('^');
                self.editor.request_center();
                last.map(|p| vec![p])
            }
            InsertKind::AboveWithNewline => {
                self.editor.insert_newline_above();
                None
            }
            InsertKind::BelowWithNewline => {
                self.editor.insert_newline_below();
                None
            }
            InsertKind::AtStartOfTarget | InsertKind::AtEndOfTarget => {
                if !self.select_target(op) {
                    self.finish_no_op(op);
                    return false;
                }
                let at_end = kind == InsertKind::AtEndOfTarget;
                Some(
                    self.editor
                        .selections()
                        .iter()
                        .map(|s| if at_end { s.range.end } else { s.range.start })
                        .collect(),
                )
            }
            InsertKind::AtStartOfSelection | InsertKind::AtEndOfSelection => {
                match (self.editor.visual_kind(), op.spec.block_anchor) {
                    (Some(SelectionKind::Blockwise), Some(anchor)) => {
                        self.editor.normalize_blockwise(anchor);
                        None
                    }
                    (Some(_), _) => {
                        let at_end = kind == InsertKind::AtEndOfSelection;
                        Some(
                            self.editor
                                .selections()
                                .iter()
                                .map(|s| if at_end { s.range.end } else { s.range.start })
                                .collect(),
                        )
                    }
                    (None, _) => None,
                }
            }
            InsertKind::Change => return self.change_target(op),
        };
        if let Some(positions) = moved {
            self.editor.set_cursors(&positions);
        }
        true
    }

    /// Select, yank and clear the target. Linewise targets keep one
    /// (indented) empty row to type on.
    fn change_target(&mut self, op: &mut Operator) -> bool {
        if !self.select_target(op) {
            self.finish_no_op(op);
            return false;
        }
        let linewise =
            op.is_linewise() || self.editor.visual_kind() == Some(SelectionKind::Linewise);
        for i in 0..self.editor.selections().len() {
            op.yanked.push(self.editor.selected_text(i));
        }
        self.flush_register(op);
        let replacement = if linewise { "\n" } else { "" };
        self.editor.begin_transaction();
        for i in 0..self.editor.selections().len() {
            if self.editor.selection(i).is_empty() {
                continue;
            }
            let opts = InsertOptions {
                auto_indent: linewise,
            };
            let inserted = self.editor.insert_text_at_selection(i, replacement, opts);
            if !inserted.is_empty() {
                let left = self.editor.position_left(inserted.end, true);
                self.editor.set_selection(i, Selection::cursor(left));
            }
        }
        self.editor.end_transaction();
        trace!(target: "operator.insert", operator = op.name(), linewise, "target_changed");
        true
    }

    /// Insert the captured text at every cursor instead of entering insert
    /// mode.
    fn replay_insert(&mut self, op: &mut Operator, kind: InsertKind) -> Outcome {
        let mut typed = op.insert.last_inserted.clone().unwrap_or_default();
        if matches!(kind, InsertKind::AboveWithNewline | InsertKind::BelowWithNewline) {
            typed = typed.trim_start().to_string();
        }
        let copies = format!("{}{}", op.insert.text_by_operator, typed);
        let text = format!("{typed}{}", copies.repeat(op.insert.insertion_count));
        self.editor.begin_transaction();
        if kind == InsertKind::Replace {
            self.editor.overtype_text(&text);
        } else {
            self.editor.insert_text(&text, InsertOptions::default());
        }
        self.editor.end_transaction();
        self.step_cursors_left();
        debug!(target: "operator.insert", operator = op.name(), chars = text.chars().count(), "insert_replayed");
        self.finish(op);
        Outcome::Finished
    }

    fn step_cursors_left(&mut self) {
        let left: Vec<Position> = self
            .editor
            .cursors()
            .into_iter()
            .map(|p| self.editor.position_left(p, false))
            .collect();
        self.editor.set_cursors(&left);
    }

    /// End the pending insert session (the host's escape). Does nothing when
    /// no insert operator is active.
    pub fn leave_insert_mode(&mut self) -> Outcome {
        let Some(mut op) = self.pending_insert.take() else {
            return Outcome::NoOp;
        };
        self.marks.set('^', self.editor.cursor());
        let typed = op
            .insert
            .insert_checkpoint
            .and_then(|cp| self.editor.inserted_text_since(cp))
            .map(|(_, text)| text)
            .unwrap_or_default();
        self.registers.set(
            Some('.'),
            RegisterEntry::new(typed.clone(), Some(SelectionKind::Characterwise)),
        );
        if op.insert.insertion_count > 0 {
            let copies = format!("{}{}", op.insert.text_by_operator, typed)
                .repeat(op.insert.insertion_count);
            self.editor.transact(|editor| editor.type_text(&copies));
        }
        self.step_cursors_left();
        self.finish(&mut op);
        if self.config.file.insert.group_changes_when_leaving
            && let Some(cp) = op.insert.undo_checkpoint
        {
            self.editor.group_changes_since(cp);
        }
        debug!(target: "operator.insert", operator = op.name(), chars = typed.chars().count(), "insert_finished");
        self.events.emit(OperatorEvent::InsertFinished {
            operator: op.name().to_string(),
            text: typed.clone(),
        });
        op.insert.last_inserted = Some(typed);
        if op.has(OperatorFlags::RECORDABLE) {
            self.recorded = Some(op);
        }
        Outcome::Finished
    }
}
