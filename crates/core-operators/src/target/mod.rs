//! Target contract and the registry of built-in targets.
//!
//! A target turns the current cursors (or visual selection) into the ranges
//! an operator acts on. Motions select from each cursor to where the motion
//! lands; text objects select a structure around the cursor. Targets are
//! cloned into the recorded operator so `Repeat` can select again at new
//! cursor positions.

use core_state::{EditorState, Selection, SelectionKind};
use core_text::Range;

pub mod motion;
pub mod text_object;

pub use motion::{Motion, MotionKind};
pub use text_object::{Pair, TextObject, TextObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Motion,
    TextObject,
}

pub trait Target: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> TargetKind;
    /// Orientation of what `select` produces.
    fn wise(&self, state: &EditorState) -> SelectionKind;
    /// Update the editor's selections. Returns true when at least one
    /// selection ended up non-empty.
    fn select(&mut self, state: &mut EditorState, count: usize) -> bool;
    /// Targets that cannot produce a selection are rejected when bound.
    fn can_select(&self) -> bool {
        true
    }
    /// Called when the target is bound; some motions adjust to the operator.
    fn bind_operator(&mut self, _operator: &'static str) {}
    fn box_clone(&self) -> Box<dyn Target>;

    fn is_motion(&self) -> bool {
        self.kind() == TargetKind::Motion
    }
    fn is_text_object(&self) -> bool {
        self.kind() == TargetKind::TextObject
    }
    fn is_linewise(&self, state: &EditorState) -> bool {
        self.wise(state) == SelectionKind::Linewise
    }
}

impl Clone for Box<dyn Target> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Resolve a target by its registered name.
pub fn resolve_target(name: &str) -> Option<Box<dyn Target>> {
    if let Some(kind) = MotionKind::from_name(name) {
        return Some(Box::new(Motion::new(kind)));
    }
    TextObject::from_name(name).map(|t| Box::new(t) as Box<dyn Target>)
}

/// Every registered target name.
pub fn target_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = MotionKind::ALL.iter().map(|k| k.name()).collect();
    names.extend(text_object::NAMES.iter().copied());
    names
}

/// Apply `f` to every selection's head and grow the selection to cover the
/// returned range.
pub(crate) fn select_each(
    state: &mut EditorState,
    mut f: impl FnMut(&EditorState, Selection) -> Option<Range>,
) -> bool {
    for i in 0..state.selections().len() {
        let sel = state.selection(i);
        if let Some(range) = f(state, sel) {
            let range = if sel.is_empty() {
                range
            } else {
                sel.range.union(&range)
            };
            state.set_selection(i, Selection::new(range, false));
        }
    }
    state.has_non_empty_selection()
}
