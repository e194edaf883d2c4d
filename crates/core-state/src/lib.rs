//! Editor state: the in-memory host that operators run against.
//!
//! `EditorState` owns a single buffer, its selections, the current mode, undo
//! history, and the change journal. All text mutations go through
//! `set_text_in_range`, which is the one place that:
//! - pushes undo snapshots (one per outermost `transact`, one per discrete
//!   edit outside a transaction, one per Insert-mode typing run),
//! - appends to the change journal used by checkpoints,
//! - shifts the other selections and tracked ranges past the edit.
//!
//! Transactions nest: inner `transact` calls join the outermost one so a whole
//! operator invocation (including repeats) undoes as a unit. A transaction
//! that changes nothing leaves no undo entry behind.

use core_text::{Buffer, Position, Range};
use tracing::{debug, trace};

pub mod journal;
pub mod marks;
pub mod registers;
pub mod selection;
pub mod undo;

pub use journal::{Change, ChangeJournal, Checkpoint};
pub use marks::Marks;
pub use registers::{RegisterEntry, Registers};
pub use selection::{BlockAnchor, PreservedSelection, Selection, SelectionKind};
pub use undo::{InsertRun, SnapshotKind, UNDO_HISTORY_MAX};
use undo::UndoEngine;

/// Insert-mode flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSubmode {
    Default,
    /// Typed text overwrites existing chars.
    Replace,
}

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal command/navigation mode. Cursors are empty selections.
    Normal,
    Insert(InsertSubmode),
    /// Visual selection with its orientation.
    Visual(SelectionKind),
    OperatorPending,
}

/// Options for `insert_text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertOptions {
    /// Multi-line text inserted at column 0 takes the indentation of the row
    /// it lands on.
    pub auto_indent: bool,
}

/// Handle to a range that follows buffer edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerId(usize);

/// Top-level editor state container (single buffer).
pub struct EditorState {
    buffer: Buffer,
    selections: Vec<Selection>,
    mode: Mode,
    pub file_name: Option<std::path::PathBuf>,
    pub dirty: bool,
    undo: UndoEngine,
    journal: ChangeJournal,
    transaction_depth: usize,
    transaction_seq: usize,
    transaction_pushed: bool,
    markers: Vec<Option<Range>>,
    /// Selection saved when visual mode ended.
    pub previous_selection: Option<PreservedSelection>,
    /// Line comment leader used by `toggle_line_comments`.
    pub comment_prefix: String,
    /// One indentation level.
    pub indent_unit: String,
    center_requests: usize,
}

impl EditorState {
    /// Create a new state around `buffer` with a cursor at the origin.
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            selections: vec![Selection::cursor(Position::origin())],
            mode: Mode::Normal,
            file_name: None,
            dirty: false,
            undo: UndoEngine::new(),
            journal: ChangeJournal::default(),
            transaction_depth: 0,
            transaction_seq: 0,
            transaction_pushed: false,
            markers: Vec::new(),
            previous_selection: None,
            comment_prefix: "//".to_string(),
            indent_unit: "  ".to_string(),
            center_requests: 0,
        }
    }

    pub fn from_text(text: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Buffer::from_str("[scratch]", text)?))
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn line_text(&self, row: usize) -> String {
        self.buffer.line_text(row)
    }

    // ---------------------------------------------------------------- modes

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_normal(&self) -> bool {
        self.mode == Mode::Normal
    }

    pub fn is_insert(&self) -> bool {
        matches!(self.mode, Mode::Insert(_))
    }

    pub fn is_visual(&self) -> bool {
        matches!(self.mode, Mode::Visual(_))
    }

    /// Orientation of the active visual mode.
    pub fn visual_kind(&self) -> Option<SelectionKind> {
        match self.mode {
            Mode::Visual(kind) => Some(kind),
            _ => None,
        }
    }

    /// Switch modes.
    ///
    /// Leaving Insert closes the typing run. Leaving Visual saves the selection
    /// into `previous_selection`. Entering Normal collapses leftover
    /// selections onto their visible cursor and clamps every cursor onto a char.
    pub fn activate_mode(&mut self, mode: Mode) {
        let prev = self.mode;
        if matches!(prev, Mode::Insert(_)) && !matches!(mode, Mode::Insert(_)) {
            self.undo.end_insert_coalescing();
        }
        if matches!(prev, Mode::Visual(_)) && !matches!(mode, Mode::Visual(_)) {
            self.preserve_visual_selection();
        }
        self.mode = mode;
        if mode == Mode::Normal {
            for i in 0..self.selections.len() {
                let sel = self.selections[i];
                let pos = if sel.is_empty() || sel.reversed {
                    sel.head()
                } else {
                    self.position_left(sel.range.end, true).max(sel.range.start)
                };
                let pos = self.normal_position(pos);
                self.selections[i].collapse_to(pos);
            }
            self.dedupe_cursors();
        }
        debug!(target: "state.mode", from = ?prev, to = ?mode, "mode_change");
    }

    /// Clamp onto a char the Normal-mode cursor may rest on.
    pub fn normal_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.buffer.vim_last_line());
        let max = self.buffer.line_len(line).saturating_sub(1);
        Position::new(line, pos.col.min(max))
    }

    /// One char left of `pos`; with `wrap` column 0 moves to the end of the
    /// previous line.
    pub fn position_left(&self, pos: Position, wrap: bool) -> Position {
        if pos.col > 0 {
            Position::new(pos.line, pos.col - 1)
        } else if wrap && pos.line > 0 {
            Position::new(pos.line - 1, self.buffer.line_len(pos.line - 1))
        } else {
            pos
        }
    }

    /// Save the non-empty visual selections into `previous_selection`.
    pub fn preserve_visual_selection(&mut self) {
        let Some(kind) = self.visual_kind() else {
            return;
        };
        let ranges: Vec<Range> = self
            .selections
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.range)
            .collect();
        if !ranges.is_empty() {
            self.previous_selection = Some(PreservedSelection { ranges, kind });
        }
    }

    // ----------------------------------------------------------- selections

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn selection(&self, idx: usize) -> Selection {
        self.selections[idx]
    }

    pub fn set_selection(&mut self, idx: usize, sel: Selection) {
        let range = Range::new(
            self.buffer.clip_position(sel.range.start),
            self.buffer.clip_position(sel.range.end),
        );
        self.selections[idx] = Selection::new(range, sel.reversed);
    }

    /// Replace all selections. An empty list is ignored (there is always at
    /// least one cursor).
    pub fn set_selections(&mut self, sels: Vec<Selection>) {
        if sels.is_empty() {
            return;
        }
        self.selections = sels;
        for i in 0..self.selections.len() {
            let sel = self.selections[i];
            self.set_selection(i, sel);
        }
    }

    pub fn selection_ranges(&self) -> Vec<Range> {
        self.selections.iter().map(|s| s.range).collect()
    }

    pub fn has_non_empty_selection(&self) -> bool {
        self.selections.iter().any(|s| !s.is_empty())
    }

    pub fn selected_text(&self, idx: usize) -> String {
        self.buffer.text_in_range(self.selections[idx].range)
    }

    /// Cursor of the newest selection.
    pub fn cursor(&self) -> Position {
        self.selections
            .last()
            .map(|s| s.head())
            .unwrap_or_default()
    }

    pub fn cursors(&self) -> Vec<Position> {
        self.selections.iter().map(|s| s.head()).collect()
    }

    /// Collapse to a single cursor at `pos`.
    pub fn set_cursor(&mut self, pos: Position) {
        self.selections = vec![Selection::cursor(self.buffer.clip_position(pos))];
    }

    /// One cursor per position, in the given order.
    pub fn set_cursors(&mut self, positions: &[Position]) {
        let sels = positions
            .iter()
            .map(|p| Selection::cursor(self.buffer.clip_position(*p)))
            .collect();
        self.set_selections(sels);
    }

    pub fn add_cursor(&mut self, pos: Position) {
        let pos = self.buffer.clip_position(pos);
        self.selections.push(Selection::cursor(pos));
    }

    /// Select a single range and enter visual mode of `kind`. Linewise
    /// selections are widened to whole rows.
    pub fn select_range(&mut self, range: Range, kind: SelectionKind) {
        let range = if kind == SelectionKind::Linewise {
            let (first, last) = range.row_span();
            self.buffer.rows_range(first, last)
        } else {
            range
        };
        self.selections = vec![Selection::new(range, false)];
        self.mode = Mode::Visual(kind);
    }

    /// Blockwise selection between two inclusive corners, one selection per
    /// row. Rows too short for the block get an empty selection at line end.
    pub fn select_block(&mut self, a: Position, b: Position) {
        let (top, bottom) = (a.line.min(b.line), a.line.max(b.line));
        let (left, right) = (a.col.min(b.col), a.col.max(b.col) + 1);
        let mut sels = Vec::new();
        for row in top..=bottom.min(self.buffer.line_count() - 1) {
            let len = self.buffer.line_len(row);
            let start = Position::new(row, left.min(len));
            let end = Position::new(row, right.min(len));
            sels.push(Selection::new(Range::new(start, end), false));
        }
        self.set_selections(sels);
        self.mode = Mode::Visual(SelectionKind::Blockwise);
    }

    /// Sort selections top to bottom.
    pub fn sort_selections(&mut self) {
        self.selections.sort_by_key(|s| s.range.start);
    }

    /// Collapse blockwise selections: drop empty rows and collapse each row to
    /// its start or end column. Returns the top row's collapsed position.
    pub fn normalize_blockwise(&mut self, anchor: BlockAnchor) -> Option<Position> {
        let mut sels: Vec<Selection> = self
            .selections
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                let pos = match anchor {
                    BlockAnchor::Start => s.range.start,
                    BlockAnchor::End => s.range.end,
                };
                Selection::cursor(pos)
            })
            .collect();
        sels.sort_by_key(|s| s.range.start);
        let top = sels.first().map(|s| s.head());
        trace!(target: "state.selection", rows = sels.len(), ?anchor, "normalize_blockwise");
        self.set_selections(sels);
        top
    }

    /// Keep only the topmost selection.
    pub fn keep_top_selection(&mut self) {
        if let Some(top) = self.selections.iter().min_by_key(|s| s.range.start).copied() {
            self.selections = vec![top];
        }
    }

    fn dedupe_cursors(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.selections.retain(|s| !s.is_empty() || seen.insert(s.range.start));
    }

    // ------------------------------------------------------------- markers

    /// Start tracking `range`; it shifts with subsequent edits.
    pub fn track_range(&mut self, range: Range) -> MarkerId {
        self.markers.push(Some(range));
        MarkerId(self.markers.len() - 1)
    }

    pub fn tracked_range(&self, id: MarkerId) -> Option<Range> {
        self.markers.get(id.0).copied().flatten()
    }

    pub fn untrack(&mut self, id: MarkerId) {
        if let Some(slot) = self.markers.get_mut(id.0) {
            *slot = None;
        }
    }

    // --------------------------------------------------------------- edits

    /// Replace the text in `range`, returning the range the new text occupies.
    pub fn set_text_in_range(&mut self, range: Range, text: &str) -> Range {
        let old_range = Range::new(
            self.buffer.clip_position(range.start),
            self.buffer.clip_position(range.end),
        );
        if self.transaction_depth == 0 {
            if self.is_insert() {
                self.undo.begin_insert_coalescing(&self.selections, &self.buffer);
                self.undo.note_insert_edit();
            } else {
                self.undo
                    .push_snapshot(SnapshotKind::Edit, &self.selections, &self.buffer);
            }
        }
        let old_text = self.buffer.text_in_range(old_range);
        let new_range = self.buffer.set_text_in_range(old_range, text);
        trace!(target: "state.edit", start_line = old_range.start.line, start_col = old_range.start.col, removed = old_text.chars().count(), inserted = text.chars().count(), "set_text_in_range");
        for sel in &mut self.selections {
            let start = shift_position(sel.range.start, old_range, new_range);
            let end = shift_position(sel.range.end, old_range, new_range);
            sel.range = Range::new(start, end);
        }
        for range in self.markers.iter_mut().flatten() {
            let start = shift_position(range.start, old_range, new_range);
            let end = shift_position(range.end, old_range, new_range);
            *range = Range::new(start, end);
        }
        self.journal.record(Change {
            old_range,
            new_range,
            old_text,
            new_text: text.to_string(),
        });
        self.dirty = true;
        new_range
    }

    /// Insert `text` at every selection (replacing selected text). Each
    /// selection ends as a cursor after its insertion.
    pub fn insert_text(&mut self, text: &str, opts: InsertOptions) -> Vec<Range> {
        (0..self.selections.len())
            .map(|i| self.insert_text_at_selection(i, text, opts))
            .collect()
    }

    pub fn insert_text_at_selection(
        &mut self,
        idx: usize,
        text: &str,
        opts: InsertOptions,
    ) -> Range {
        let range = self.selections[idx].range;
        let indented;
        let text = if opts.auto_indent
            && range.start.col == 0
            && text.contains('\n')
            && !text.starts_with([' ', '\t'])
        {
            indented = format!("{}{}", self.buffer.indentation(range.start.line), text);
            indented.as_str()
        } else {
            text
        };
        let new = self.set_text_in_range(range, text);
        self.selections[idx] = Selection::cursor(new.end);
        new
    }

    /// Host-side typing: inserts at every cursor, overwriting chars in
    /// replace submode.
    pub fn type_text(&mut self, text: &str) {
        if self.mode == Mode::Insert(InsertSubmode::Replace) {
            self.overtype_text(text);
        } else {
            self.insert_text(text, InsertOptions::default());
        }
    }

    /// Overwrite one char per typed char at every cursor, never past the
    /// line end; the remainder is inserted.
    pub fn overtype_text(&mut self, text: &str) -> Vec<Range> {
        let width = text.chars().take_while(|c| *c != '\n').count();
        for i in 0..self.selections.len() {
            let head = self.selections[i].head();
            let end_col = (head.col + width).min(self.buffer.line_len(head.line));
            let range = Range::new(head, Position::new(head.line, end_col.max(head.col)));
            self.selections[i] = Selection::new(range, false);
        }
        self.insert_text(text, InsertOptions::default())
    }

    /// Host-side backspace: removes the char before each cursor (joining
    /// with the previous line at column 0).
    pub fn backspace(&mut self) {
        for i in 0..self.selections.len() {
            let head = self.selections[i].head();
            let prev = self.position_left(head, true);
            if prev != head {
                let new = self.set_text_in_range(Range::new(prev, head), "");
                self.selections[i] = Selection::cursor(new.start);
            }
        }
    }

    // -------------------------------------------------------- transactions

    /// Run `f` as one undoable unit. Nested calls join the outermost.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_transaction();
        let out = f(self);
        self.end_transaction();
        out
    }

    /// Open a transaction scope. Every `begin_transaction` must be paired
    /// with one `end_transaction`; callers that need the scope to span more
    /// than the editor (registers, marks) use these instead of `transact`.
    pub fn begin_transaction(&mut self) {
        if self.transaction_depth == 0 {
            self.transaction_pushed =
                self.undo
                    .push_snapshot(SnapshotKind::Edit, &self.selections, &self.buffer);
            self.transaction_seq = self.journal.seq();
            trace!(target: "state.transaction", seq = self.transaction_seq, "transaction_begin");
        }
        self.transaction_depth += 1;
    }

    pub fn end_transaction(&mut self) {
        if self.transaction_depth == 0 {
            return;
        }
        self.transaction_depth -= 1;
        if self.transaction_depth == 0 {
            let changes = self.journal.seq() - self.transaction_seq;
            if changes == 0 && self.transaction_pushed {
                self.undo.discard_last();
            }
            trace!(target: "state.transaction", changes, "transaction_end");
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_depth > 0
    }

    // --------------------------------------------------------- checkpoints

    pub fn create_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            seq: self.journal.seq(),
            undo_depth: self.undo.undo_depth(),
        }
    }

    pub fn changes_since(&self, checkpoint: Checkpoint) -> &[Change] {
        self.journal.since(checkpoint.seq)
    }

    /// Net contiguous insertion made since `checkpoint`.
    pub fn inserted_text_since(&self, checkpoint: Checkpoint) -> Option<(Range, String)> {
        self.journal.inserted_text_since(checkpoint.seq)
    }

    /// Merge every undo entry created after `checkpoint` into one.
    pub fn group_changes_since(&mut self, checkpoint: Checkpoint) {
        self.undo.group_since(checkpoint.undo_depth);
    }

    // ---------------------------------------------------------- undo/redo

    /// Rewind the newest undo entry, restoring its text and selections.
    pub fn undo(&mut self) -> bool {
        let restored = self.undo.undo(&mut self.buffer, &mut self.selections);
        if restored {
            self.dirty = true;
            self.activate_mode(self.mode);
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        let restored = self.undo.redo(&mut self.buffer, &mut self.selections);
        if restored {
            self.dirty = true;
            self.activate_mode(self.mode);
        }
        restored
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    pub fn insert_run(&self) -> &InsertRun {
        self.undo.insert_run()
    }

    // ------------------------------------------------------ row operations

    /// Join `row` with the next one: the next row's leading whitespace is
    /// dropped and a single space separates them unless either side is
    /// empty or the row already ends in whitespace. Returns the join point.
    pub fn join_lines(&mut self, row: usize) -> Option<Position> {
        if row >= self.buffer.vim_last_line() {
            return None;
        }
        let cur = self.buffer.line_text(row);
        let next = self.buffer.line_text(row + 1);
        let cur_len = cur.chars().count();
        let lead = next.chars().take_while(|c| c.is_whitespace()).count();
        let rest_empty = lead == next.chars().count();
        let sep = if cur.is_empty() || rest_empty || cur.ends_with([' ', '\t']) {
            ""
        } else {
            " "
        };
        let range = Range::new(Position::new(row, cur_len), Position::new(row + 1, lead));
        self.set_text_in_range(range, sep);
        Some(Position::new(row, cur_len))
    }

    /// Replace a row's leading whitespace.
    pub fn set_indentation(&mut self, row: usize, indent: &str) {
        let current = self.buffer.indentation(row);
        if current == indent {
            return;
        }
        let range = Range::new(
            Position::new(row, 0),
            Position::new(row, current.chars().count()),
        );
        self.set_text_in_range(range, indent);
    }

    /// Add one indentation level to each non-blank row.
    pub fn indent_rows(&mut self, first: usize, last: usize) {
        for row in first..=last {
            if !self.buffer.is_blank_line(row) {
                let indent = format!("{}{}", self.indent_unit, self.buffer.indentation(row));
                self.set_indentation(row, &indent);
            }
        }
    }

    /// Remove up to one indentation level from each row.
    pub fn outdent_rows(&mut self, first: usize, last: usize) {
        for row in first..=last {
            let current = self.buffer.indentation(row);
            let next = if let Some(rest) = current.strip_prefix('\t') {
                rest.to_string()
            } else {
                let unit = self.indent_unit.chars().count();
                let spaces = current.chars().take_while(|c| *c == ' ').count().min(unit);
                current.chars().skip(spaces).collect()
            };
            self.set_indentation(row, &next);
        }
    }

    /// Re-indent rows from the nearest non-blank row above: same level, one
    /// deeper after an opening bracket, one shallower before a closing one.
    pub fn auto_indent_rows(&mut self, first: usize, last: usize) {
        for row in first..=last {
            if self.buffer.is_blank_line(row) {
                continue;
            }
            let base = (0..row).rev().find(|r| !self.buffer.is_blank_line(*r));
            let mut indent = base
                .map(|r| self.buffer.indentation(r))
                .unwrap_or_default();
            if let Some(r) = base
                && self.buffer.line_text(r).trim_end().ends_with(['{', '(', '['])
            {
                indent.push_str(&self.indent_unit);
            }
            if self.buffer.line_text(row).trim_start().starts_with(['}', ')', ']'])
                && indent.ends_with(self.indent_unit.as_str())
            {
                indent.truncate(indent.len() - self.indent_unit.len());
            }
            self.set_indentation(row, &indent);
        }
    }

    /// Comment the rows out, or uncomment them when every non-blank row
    /// already starts with the comment prefix.
    pub fn toggle_line_comments(&mut self, first: usize, last: usize) {
        let prefix = self.comment_prefix.clone();
        let rows: Vec<usize> = (first..=last)
            .filter(|r| !self.buffer.is_blank_line(*r))
            .collect();
        if rows.is_empty() {
            return;
        }
        let commented = rows
            .iter()
            .all(|r| self.buffer.line_text(*r).trim_start().starts_with(&prefix));
        let prefix_len = prefix.chars().count();
        if commented {
            for row in rows {
                let lead = self.buffer.first_non_blank_col(row);
                let text = self.buffer.line_text(row);
                let after: String = text.chars().skip(lead + prefix_len).collect();
                let extra = usize::from(after.starts_with(' '));
                let range = Range::new(
                    Position::new(row, lead),
                    Position::new(row, lead + prefix_len + extra),
                );
                self.set_text_in_range(range, "");
            }
        } else {
            let col = rows
                .iter()
                .map(|r| self.buffer.first_non_blank_col(*r))
                .min()
                .unwrap_or(0);
            let leader = format!("{prefix} ");
            for row in rows {
                self.set_text_in_range(Range::point(Position::new(row, col)), &leader);
            }
        }
    }

    /// Open an indented line below each cursor's row and move onto it.
    pub fn insert_newline_below(&mut self) {
        for i in 0..self.selections.len() {
            let row = self.selections[i].head().line;
            let indent = self.buffer.indentation(row);
            let at = Position::new(row, self.buffer.line_len(row));
            let new = self.set_text_in_range(Range::point(at), &format!("\n{indent}"));
            self.selections[i] = Selection::cursor(new.end);
        }
    }

    /// Open an indented line above each cursor's row and move onto it.
    pub fn insert_newline_above(&mut self) {
        for i in 0..self.selections.len() {
            let row = self.selections[i].head().line;
            let indent = self.buffer.indentation(row);
            let width = indent.chars().count();
            self.set_text_in_range(Range::point(Position::new(row, 0)), &format!("{indent}\n"));
            self.selections[i] = Selection::cursor(Position::new(row, width));
        }
    }

    // --------------------------------------------------------------- view

    /// Ask the view to center on the cursor.
    pub fn request_center(&mut self) {
        self.center_requests += 1;
    }

    pub fn center_requests(&self) -> usize {
        self.center_requests
    }
}

/// Where `p` ends up after `old` was replaced by text now occupying `new`.
fn shift_position(p: Position, old: Range, new: Range) -> Position {
    if p <= old.start {
        p
    } else if p < old.end {
        new.end
    } else if p.line == old.end.line {
        Position::new(new.end.line, new.end.col + (p.col - old.end.col))
    } else {
        Position::new(p.line + new.end.line - old.end.line, p.col)
    }
}
