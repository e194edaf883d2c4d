//! Operator instances and the generic engine.
//!
//! An `Operator` is one invocation of an `OperatorSpec`: the bound target,
//! count, answered prompts, the addressed register, and the bookkeeping the
//! engine collects while it runs (stay points, change marker, insert
//! checkpoints). The engine half lives on `Session`:
//!
//! - `select_target` runs the target and fires the did-select side effects
//!   (stay points, flash, change tracking),
//! - `mutate_selections` selects and then applies a per-selection hook inside
//!   one transaction, or does nothing at all when nothing got selected,
//! - `finish` publishes the change marks and settles the editor mode.

use crate::input::InputPrompt;
use crate::session::Session;
use crate::spec::{InputSpec, OperatorFlags, OperatorSpec};
use crate::target::Target;
use crate::{Outcome, target::resolve_target};
use core_config::ExternalCommandConfig;
use core_events::OperatorEvent;
use core_state::{Checkpoint, MarkerId, Mode, RegisterEntry, Selection, SelectionKind};
use core_text::{Position, Range};
use tracing::{debug, trace};

/// State of an insert-mode session.
#[derive(Debug, Clone, Default)]
pub(crate) struct InsertState {
    /// Taken before any positioning edit; everything after it becomes one
    /// undo step when insert mode ends.
    pub(crate) undo_checkpoint: Option<Checkpoint>,
    /// Taken right before typing starts.
    pub(crate) insert_checkpoint: Option<Checkpoint>,
    /// Text inserted by the positioning step (`o` inserts a newline).
    pub(crate) text_by_operator: String,
    /// What was typed, kept for repeat.
    pub(crate) last_inserted: Option<String>,
    pub(crate) insertion_count: usize,
}

/// One operator invocation.
#[derive(Debug, Clone)]
pub struct Operator {
    pub(crate) spec: &'static OperatorSpec,
    pub(crate) target: Option<Box<dyn Target>>,
    pub(crate) count: usize,
    /// Answers given so far; replayed on repeat.
    pub(crate) inputs: Vec<String>,
    pub(crate) input_cursor: usize,
    pub(crate) register: Option<char>,
    pub(crate) repeated: bool,
    /// Orientation of the last selected target.
    pub(crate) wise: SelectionKind,
    pub(crate) stay_points: Vec<Position>,
    pub(crate) marker: Option<MarkerId>,
    pub(crate) block_top: Option<Position>,
    /// Selected from a blockwise visual selection; the register keeps it.
    pub(crate) blockwise: bool,
    pub(crate) yanked: Vec<String>,
    pub(crate) final_mode: Mode,
    pub(crate) auto_indent_after: bool,
    pub(crate) insert: InsertState,
    pub(crate) external: Option<ExternalCommandConfig>,
    pub(crate) outputs: Vec<Option<String>>,
    pub(crate) number_base: Option<i64>,
}

impl Operator {
    pub fn new(spec: &'static OperatorSpec, count: usize) -> Self {
        Self {
            spec,
            target: None,
            count: count.max(1),
            inputs: Vec::new(),
            input_cursor: 0,
            register: None,
            repeated: false,
            wise: SelectionKind::Characterwise,
            stay_points: Vec::new(),
            marker: None,
            block_top: None,
            blockwise: false,
            yanked: Vec::new(),
            final_mode: Mode::Normal,
            auto_indent_after: false,
            insert: InsertState::default(),
            external: None,
            outputs: Vec::new(),
            number_base: None,
        }
    }

    /// Name used in events and the flash blacklist. Configured external
    /// commands report their own name.
    pub fn name(&self) -> &str {
        self.external
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(self.spec.name)
    }

    pub fn spec(&self) -> &'static OperatorSpec {
        self.spec
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn target_name(&self) -> Option<&'static str> {
        self.target.as_ref().map(|t| t.name())
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn inserted_text(&self) -> Option<&str> {
        self.insert.last_inserted.as_deref()
    }

    pub(crate) fn has(&self, flag: OperatorFlags) -> bool {
        self.spec.has(flag)
    }

    pub(crate) fn is_linewise(&self) -> bool {
        self.wise == SelectionKind::Linewise
    }

    /// Copy for `Repeat`: answers and the typed text carry over, per-run
    /// bookkeeping does not.
    pub(crate) fn for_repeat(&self) -> Operator {
        let mut op = self.clone();
        op.repeated = true;
        op.input_cursor = 0;
        op.stay_points.clear();
        op.marker = None;
        op.block_top = None;
        op.blockwise = false;
        op.yanked.clear();
        op.final_mode = Mode::Normal;
        op.auto_indent_after = false;
        op.outputs.clear();
        op.number_base = None;
        op
    }
}

/// Target to bind when building an operator.
#[derive(Debug, Clone)]
pub enum TargetRequest {
    Name(String),
    Instance(Box<dyn Target>),
}

/// What the caller asks `Session::run` to do.
#[derive(Debug, Clone)]
pub struct OperatorRequest {
    pub name: String,
    pub target: Option<TargetRequest>,
    pub count: usize,
}

impl OperatorRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            count: 1,
        }
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.target = Some(TargetRequest::Name(name.into()));
        self
    }

    pub fn target_instance(mut self, target: Box<dyn Target>) -> Self {
        self.target = Some(TargetRequest::Instance(target));
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }
}

impl Session {
    /// Resolve the target an operator runs on when the caller named none:
    /// the visual selection in visual mode, else the operator's default.
    pub(crate) fn default_target(&self, spec: &OperatorSpec) -> Option<Box<dyn Target>> {
        let wants_target =
            spec.has(OperatorFlags::REQUIRE_TARGET) || spec.default_target.is_some();
        if let Some(kind) = self.editor.visual_kind() {
            let keeps_default = kind == SelectionKind::Blockwise
                && spec.block_anchor.is_some()
                && spec.default_target.is_some();
            if wants_target && !keeps_default {
                return resolve_target("CurrentSelection");
            }
        }
        spec.default_target.and_then(resolve_target)
    }

    /// Ask for (or replay) the next answer. `None` cancels.
    pub(crate) fn read_input(&mut self, op: &mut Operator) -> Option<String> {
        if let Some(answer) = op.inputs.get(op.input_cursor) {
            op.input_cursor += 1;
            return Some(answer.clone());
        }
        let spec = op.spec.input.unwrap_or(InputSpec {
            chars_max: 1,
            default: None,
            after_select: false,
        });
        let prompt = InputPrompt {
            operator: op.spec.name,
            chars_max: spec.chars_max,
        };
        let Some(raw) = self.input.read(prompt) else {
            debug!(target: "operator.base", operator = op.name(), "input_cancelled");
            return None;
        };
        let mut answer: String = raw.chars().take(spec.chars_max).collect();
        if answer.is_empty()
            && let Some(default) = spec.default
        {
            answer = default.to_string();
        }
        op.inputs.push(answer.clone());
        op.input_cursor += 1;
        Some(answer)
    }

    /// Run the bound target and fire the did-select side effects. Returns
    /// true when any selection is non-empty.
    pub(crate) fn select_target(&mut self, op: &mut Operator) -> bool {
        let name = op.name().to_string();
        self.events.emit(OperatorEvent::WillSelectTarget {
            operator: name.clone(),
        });
        op.blockwise = self.editor.visual_kind() == Some(SelectionKind::Blockwise);
        if op.blockwise
            && let Some(anchor) = op.spec.block_anchor
        {
            op.block_top = self.editor.normalize_blockwise(anchor);
        }
        op.stay_points = if self.editor.is_visual() {
            self.editor
                .selections()
                .iter()
                .map(|s| s.range.start)
                .collect()
        } else {
            self.editor.cursors()
        };
        let Some(mut target) = op.target.take() else {
            self.events.emit(OperatorEvent::DidSelectTarget {
                operator: name,
                selected: false,
            });
            return false;
        };
        op.wise = target.wise(&self.editor);
        target.select(&mut self.editor, op.count);
        op.target = Some(target);
        if op.has(OperatorFlags::LINEWISE) {
            self.expand_to_rows();
            op.wise = SelectionKind::Linewise;
        }
        let selected = self.editor.has_non_empty_selection();
        trace!(target: "operator.base", operator = %name, target = op.target_name().unwrap_or(""), selected, "select_target");
        self.events.emit(OperatorEvent::DidSelectTarget {
            operator: name.clone(),
            selected,
        });
        if selected {
            let ranges: Vec<Range> = self
                .editor
                .selection_ranges()
                .into_iter()
                .filter(|r| !r.is_empty())
                .collect();
            if op.has(OperatorFlags::FLASH_TARGET) {
                self.flash(&name, ranges.clone());
            }
            if op.has(OperatorFlags::TRACK_CHANGE)
                && let Some(union) = ranges.iter().copied().reduce(|a, b| a.union(&b))
            {
                op.marker = Some(self.editor.track_range(union));
            }
        }
        selected
    }

    fn expand_to_rows(&mut self) {
        for i in 0..self.editor.selections().len() {
            let sel = self.editor.selection(i);
            if sel.is_empty() {
                continue;
            }
            let (first, last) = sel.range.row_span();
            let range = self.editor.buffer().rows_range(first, last);
            self.editor.set_selection(i, Selection::new(range, false));
        }
    }

    pub(crate) fn flash(&mut self, operator: &str, ranges: Vec<Range>) {
        if ranges.is_empty() || !self.config.file.flash.should_flash(operator) {
            return;
        }
        self.events.emit(OperatorEvent::Flash {
            operator: operator.to_string(),
            ranges,
            duration_ms: self.config.file.flash.duration_ms,
        });
    }

    /// Select, then run `f` once per selection inside one transaction.
    /// Nothing selected is a silent no-op without a transaction.
    pub(crate) fn mutate_selections(
        &mut self,
        op: &mut Operator,
        f: impl FnMut(&mut Session, &mut Operator, usize),
    ) -> Outcome {
        if !self.select_target(op) {
            self.finish_no_op(op);
            return Outcome::NoOp;
        }
        self.apply_to_selections(op, f)
    }

    /// Run `f` over the already selected target.
    pub(crate) fn apply_to_selections(
        &mut self,
        op: &mut Operator,
        mut f: impl FnMut(&mut Session, &mut Operator, usize),
    ) -> Outcome {
        self.editor.begin_transaction();
        for i in 0..self.editor.selections().len() {
            f(self, op, i);
        }
        self.editor.end_transaction();
        self.finish(op);
        Outcome::Finished
    }

    /// Shared flow for operators with an optional prompt: ask before or
    /// after selecting, per the operator's input timing.
    pub(crate) fn mutate_with_input(
        &mut self,
        op: &mut Operator,
        f: impl FnMut(&mut Session, &mut Operator, usize),
    ) -> Outcome {
        match op.spec.input {
            Some(input) if input.after_select => {
                if !self.select_target(op) {
                    self.finish_no_op(op);
                    return Outcome::NoOp;
                }
                if self.read_input(op).is_none() {
                    self.cancel(op);
                    return Outcome::Cancelled;
                }
                self.apply_to_selections(op, f)
            }
            Some(_) => {
                if self.read_input(op).is_none() {
                    self.cancel(op);
                    return Outcome::Cancelled;
                }
                self.mutate_selections(op, f)
            }
            None => self.mutate_selections(op, f),
        }
    }

    /// Publish change marks, notify observers and settle the final mode.
    pub(crate) fn finish(&mut self, op: &mut Operator) {
        if let Some(marker) = op.marker.take() {
            if let Some(range) = self.editor.tracked_range(marker) {
                self.marks.set_change_range(range);
            }
            self.editor.untrack(marker);
        }
        self.events.emit(OperatorEvent::DidFinish {
            operator: op.name().to_string(),
        });
        self.editor.activate_mode(op.final_mode);
    }

    pub(crate) fn finish_no_op(&mut self, op: &mut Operator) {
        trace!(target: "operator.base", operator = op.name(), "nothing_selected");
        self.restore_stay_points(op);
        if let Some(marker) = op.marker.take() {
            self.editor.untrack(marker);
        }
        self.editor.activate_mode(Mode::Normal);
    }

    /// Abort after selecting: put cursors back where they were.
    pub(crate) fn cancel(&mut self, op: &mut Operator) {
        debug!(target: "operator.base", operator = op.name(), "cancelled");
        self.finish_no_op(op);
    }

    fn restore_stay_points(&mut self, op: &Operator) {
        if !op.stay_points.is_empty() {
            self.editor.set_cursors(&op.stay_points);
        }
    }

    /// Whether the cursor returns to where it was before the target moved it.
    pub(crate) fn need_stay(&self, op: &Operator) -> bool {
        let configured = op
            .spec
            .stay_option
            .is_some_and(|o| self.config.file.stay.enabled(o));
        configured || (op.has(OperatorFlags::STAY_ON_LINEWISE) && op.is_linewise())
    }

    pub(crate) fn stay_point(&self, op: &Operator, idx: usize) -> Option<Position> {
        op.stay_points.get(idx).copied()
    }

    /// Write everything collected during this run as one register entry.
    pub(crate) fn flush_register(&mut self, op: &mut Operator) {
        let texts = std::mem::take(&mut op.yanked);
        if texts.iter().all(|t| t.is_empty()) {
            return;
        }
        // finish() has already left visual mode, so read the kind recorded at selection
        let kind = if op.blockwise {
            SelectionKind::Blockwise
        } else {
            op.wise
        };
        let text = if kind == SelectionKind::Linewise {
            texts
                .into_iter()
                .map(|mut t| {
                    if !t.ends_with('\n') {
                        t.push('\n');
                    }
                    t
                })
                .collect::<String>()
        } else {
            texts.join("\n")
        };
        trace!(target: "operator.base", operator = op.name(), register = ?op.register, ?kind, chars = text.chars().count(), "register_write");
        self.registers
            .set(op.register, RegisterEntry::new(text, Some(kind)));
    }
}
