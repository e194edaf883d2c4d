//! Snapshot undo history.
//!
//! An entry holds the buffer and the whole selection set as they were before
//! an edit, so undoing a multi-cursor operator brings every cursor back.
//! Successive identical buffers collapse into one entry.

use crate::selection::Selection;
use core_text::Buffer;
use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::trace;

/// Maximum number of entries retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// One discrete edit or one outermost transaction.
    Edit,
    /// Opening snapshot of an Insert-mode typing run.
    InsertRun,
}

#[derive(Clone)]
struct Entry {
    kind: SnapshotKind,
    buffer: Buffer,
    selections: Vec<Selection>,
    fingerprint: u64,
}

impl Entry {
    fn capture(kind: SnapshotKind, buffer: &Buffer, selections: &[Selection]) -> Self {
        Self {
            kind,
            buffer: buffer.clone(),
            selections: selections.to_vec(),
            fingerprint: fingerprint(buffer),
        }
    }
}

/// Typing-run bookkeeping: every edit while active shares the run's entry.
#[derive(Debug, Clone)]
pub enum InsertRun {
    Inactive,
    Active { started_at: Instant, edits: u32 },
}

pub struct UndoEngine {
    past: VecDeque<Entry>,
    future: Vec<Entry>,
    insert_run: InsertRun,
    deduped: AtomicU64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            insert_run: InsertRun::Inactive,
            deduped: AtomicU64::new(0),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn insert_run(&self) -> &InsertRun {
        &self.insert_run
    }

    /// Pushes collapsed because the buffer matched the newest entry.
    pub fn snapshots_skipped(&self) -> u64 {
        self.deduped.load(Ordering::Relaxed)
    }

    /// Record the pre-edit state. Returns false when it matched the newest
    /// entry and nothing was pushed.
    pub fn push_snapshot(
        &mut self,
        kind: SnapshotKind,
        selections: &[Selection],
        buffer: &Buffer,
    ) -> bool {
        let entry = Entry::capture(kind, buffer, selections);
        if self.past.back().map(|e| e.fingerprint) == Some(entry.fingerprint) {
            self.deduped.fetch_add(1, Ordering::Relaxed);
            trace!(target: "state.undo", depth = self.past.len(), fingerprint = entry.fingerprint, "snapshot_deduped");
            return false;
        }
        trace!(target: "state.undo", ?kind, depth = self.past.len() + 1, cursors = selections.len(), "snapshot_pushed");
        self.past.push_back(entry);
        if self.past.len() > UNDO_HISTORY_MAX {
            self.past.pop_front();
            trace!(target: "state.undo", "oldest_snapshot_dropped");
        }
        self.future.clear();
        true
    }

    /// Forget the newest entry (its transaction changed nothing).
    pub fn discard_last(&mut self) {
        if self.past.pop_back().is_some() {
            trace!(target: "state.undo", depth = self.past.len(), "snapshot_discarded");
        }
    }

    /// Keep only the first entry pushed after `depth`, so one undo rewinds
    /// everything since.
    pub fn group_since(&mut self, depth: usize) {
        let keep = depth + 1;
        if self.past.len() > keep {
            let merged = self.past.len() - keep;
            self.past.truncate(keep);
            trace!(target: "state.undo", depth = keep, merged, "snapshots_grouped");
        }
    }

    /// Open a typing run; only its first edit records an entry.
    pub fn begin_insert_coalescing(&mut self, selections: &[Selection], buffer: &Buffer) {
        if let InsertRun::Inactive = self.insert_run {
            self.push_snapshot(SnapshotKind::InsertRun, selections, buffer);
            self.insert_run = InsertRun::Active {
                started_at: Instant::now(),
                edits: 0,
            };
        }
    }

    pub fn end_insert_coalescing(&mut self) {
        if let InsertRun::Active { started_at, edits } = self.insert_run {
            trace!(target: "state.undo", edits, elapsed_ms = started_at.elapsed().as_millis() as u64, "insert_run_closed");
        }
        self.insert_run = InsertRun::Inactive;
    }

    pub fn note_insert_edit(&mut self) {
        if let InsertRun::Active { edits, .. } = &mut self.insert_run {
            *edits += 1;
        }
    }

    pub fn undo(&mut self, buffer: &mut Buffer, selections: &mut Vec<Selection>) -> bool {
        let Some(entry) = self.past.pop_back() else {
            return false;
        };
        let current = Entry::capture(entry.kind, buffer, selections);
        self.future.push(current);
        restore(entry, buffer, selections);
        trace!(target: "state.undo", depth = self.past.len(), redo_depth = self.future.len(), "undone");
        true
    }

    pub fn redo(&mut self, buffer: &mut Buffer, selections: &mut Vec<Selection>) -> bool {
        let Some(entry) = self.future.pop() else {
            return false;
        };
        let current = Entry::capture(entry.kind, buffer, selections);
        self.past.push_back(current);
        restore(entry, buffer, selections);
        trace!(target: "state.undo", depth = self.past.len(), redo_depth = self.future.len(), "redone");
        true
    }
}

fn restore(entry: Entry, buffer: &mut Buffer, selections: &mut Vec<Selection>) {
    *buffer = entry.buffer;
    *selections = entry.selections;
}

fn fingerprint(buffer: &Buffer) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(buffer.text().as_bytes());
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Position;

    fn buf(text: &str) -> Buffer {
        Buffer::from_str("t", text).unwrap()
    }

    fn cursor(line: usize, col: usize) -> Vec<Selection> {
        vec![Selection::cursor(Position::new(line, col))]
    }

    #[test]
    fn identical_successive_snapshots_collapse() {
        let mut undo = UndoEngine::new();
        assert!(undo.push_snapshot(SnapshotKind::Edit, &cursor(0, 0), &buf("abc")));
        assert!(!undo.push_snapshot(SnapshotKind::Edit, &cursor(0, 2), &buf("abc")));
        assert_eq!(undo.undo_depth(), 1);
        assert_eq!(undo.snapshots_skipped(), 1);
    }

    #[test]
    fn undo_restores_every_cursor_and_redo_returns() {
        let mut undo = UndoEngine::new();
        let before = vec![
            Selection::cursor(Position::new(0, 0)),
            Selection::cursor(Position::new(1, 0)),
        ];
        undo.push_snapshot(SnapshotKind::Edit, &before, &buf("a\nb\n"));
        let mut buffer = buf("xa\nxb\n");
        let mut sels = cursor(1, 1);
        assert!(undo.undo(&mut buffer, &mut sels));
        assert_eq!(buffer.text(), "a\nb\n");
        assert_eq!(sels, before);
        assert!(undo.redo(&mut buffer, &mut sels));
        assert_eq!(buffer.text(), "xa\nxb\n");
        assert_eq!(sels, cursor(1, 1));
        assert!(!undo.redo(&mut buffer, &mut sels));
    }

    #[test]
    fn grouping_keeps_the_earliest_entry() {
        let mut undo = UndoEngine::new();
        for text in ["a", "ab", "abc"] {
            undo.push_snapshot(SnapshotKind::Edit, &cursor(0, 0), &buf(text));
        }
        undo.group_since(0);
        assert_eq!(undo.undo_depth(), 1);
        let mut buffer = buf("abcd");
        let mut sels = cursor(0, 0);
        assert!(undo.undo(&mut buffer, &mut sels));
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn typing_run_records_one_entry() {
        let mut undo = UndoEngine::new();
        undo.begin_insert_coalescing(&cursor(0, 0), &buf(""));
        undo.note_insert_edit();
        undo.begin_insert_coalescing(&cursor(0, 1), &buf("a"));
        undo.note_insert_edit();
        assert!(matches!(undo.insert_run(), InsertRun::Active { edits: 2, .. }));
        undo.end_insert_coalescing();
        assert_eq!(undo.undo_depth(), 1);
        assert!(matches!(undo.insert_run(), InsertRun::Inactive));
    }

    #[test]
    fn history_is_capped() {
        let mut undo = UndoEngine::new();
        for i in 0..(UNDO_HISTORY_MAX + 5) {
            undo.push_snapshot(SnapshotKind::Edit, &cursor(0, 0), &buf(&i.to_string()));
        }
        assert_eq!(undo.undo_depth(), UNDO_HISTORY_MAX);
    }
}
