//! Surround, delete-surround and change-surround.
//!
//! Pairs come from `[surround] pairs`; an unknown char wraps with itself on
//! both sides. The input-driven delete/change variants build their target
//! from the typed char; the any-pair variants let the target detect the pair
//! and prompt afterwards.

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use crate::spec::SurroundMode;
use crate::target::{Target, TextObject};
use core_config::SurroundConfig;
use core_events::OperatorEvent;
use regex::Regex;
use tracing::debug;

/// Wrap `text` in the pair for `input`. Returns the new text and whether the
/// inserted rows need re-indenting.
pub(crate) fn wrap(
    cfg: &SurroundConfig,
    input: &str,
    text: &str,
    keep_layout: bool,
) -> (String, bool) {
    let (open, close) = cfg.pair_for(input);
    if !keep_layout && text.ends_with('\n') {
        return (format!("{open}\n{text}{close}\n"), true);
    }
    let padded = text.starts_with(' ') && text.ends_with(' ');
    if cfg.pads_with_space(input) && !text.contains('\n') && !padded {
        (format!("{open} {text} {close}"), false)
    } else {
        (format!("{open}{text}{close}"), false)
    }
}

/// Drop the first and last char. Single-line text between different
/// delimiters is trimmed too.
pub(crate) fn unwrap(text: &str) -> String {
    let mut chars = text.chars();
    let open = chars.next();
    let close = chars.next_back();
    let inner = chars.as_str();
    if !text.contains('\n') && open != close {
        inner.trim().to_string()
    } else {
        inner.to_string()
    }
}

impl Session {
    pub(crate) fn surround(&mut self, op: &mut Operator, mode: SurroundMode) -> Outcome {
        match mode {
            SurroundMode::Surround | SurroundMode::MapSurround | SurroundMode::DeleteDetected => {
                self.mutate_with_input(op, Self::transform_selection)
            }
            SurroundMode::Delete => {
                if self.read_input(op).is_none() {
                    self.cancel(op);
                    return Outcome::Cancelled;
                }
                if !self.bind_pair_target(op) {
                    self.finish_no_op(op);
                    return Outcome::NoOp;
                }
                self.mutate_selections(op, Self::transform_selection)
            }
            SurroundMode::Change => {
                if self.read_input(op).is_none() {
                    self.cancel(op);
                    return Outcome::Cancelled;
                }
                if !self.bind_pair_target(op) || !self.select_target(op) {
                    self.finish_no_op(op);
                    return Outcome::NoOp;
                }
                self.finish_change_surround(op)
            }
            SurroundMode::ChangeDetected => {
                if !self.select_target(op) {
                    debug!(target: "operator.surround", operator = op.name(), "no_pair_detected");
                    self.finish_no_op(op);
                    return Outcome::Aborted;
                }
                self.finish_change_surround(op)
            }
        }
    }

    fn finish_change_surround(&mut self, op: &mut Operator) -> Outcome {
        if self.read_input(op).is_none() {
            self.cancel(op);
            return Outcome::Cancelled;
        }
        self.apply_to_selections(op, Self::transform_selection)
    }

    /// Bind the pair object for the first typed char unless a target is
    /// already bound (repeat keeps it).
    fn bind_pair_target(&mut self, op: &mut Operator) -> bool {
        if op.target.is_some() {
            return true;
        }
        let Some(mut target) = op
            .inputs
            .first()
            .and_then(|s| s.chars().next())
            .and_then(|c| TextObject::for_char(c, false))
        else {
            debug!(target: "operator.surround", operator = op.name(), input = ?op.inputs.first(), "unknown_pair");
            return false;
        };
        target.bind_operator(op.spec.name);
        self.events.emit(OperatorEvent::TargetSet {
            operator: op.name().to_string(),
            target: target.name().to_string(),
        });
        op.target = Some(Box::new(target));
        true
    }

    pub(crate) fn surround_text(
        &self,
        op: &mut Operator,
        mode: SurroundMode,
        old: &str,
    ) -> Option<String> {
        let input = op.inputs.last().cloned().unwrap_or_default();
        let cfg = &self.config.file.surround;
        let text = match mode {
            SurroundMode::Surround => {
                let (text, indent) = wrap(cfg, &input, old, false);
                op.auto_indent_after = indent;
                text
            }
            SurroundMode::MapSurround => {
                let word = Regex::new(r"\w+").ok()?;
                word.replace_all(old, |caps: &regex::Captures| {
                    wrap(cfg, &input, &caps[0], true).0
                })
                .into_owned()
            }
            SurroundMode::Delete | SurroundMode::DeleteDetected => unwrap(old),
            SurroundMode::Change | SurroundMode::ChangeDetected => {
                wrap(cfg, &input, &unwrap(old), true).0
            }
        };
        Some(text)
    }
}
