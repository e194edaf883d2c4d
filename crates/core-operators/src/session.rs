//! Session: the shared stores operators run against.
//!
//! A `Session` owns the editor state, registers, marks, settings, the event
//! bus and the input source. `run` builds an operator from a request (name,
//! target, count), binds its target, executes it and records it for
//! `Repeat`. Insert-mode operators return `Outcome::InsertPending`; the host
//! types into `editor` and then calls `leave_insert_mode`.

use crate::error::{OperatorError, Outcome};
use crate::input::{InputSource, ScriptedInput};
use crate::operator::{Operator, OperatorRequest, TargetRequest};
use crate::spec::{self, Behavior, OperatorFlags};
use crate::target::resolve_target;
use core_config::Config;
use core_events::{EventBus, EventHooks, OperatorEvent};
use core_state::{EditorState, Marks, Registers};
use tracing::{debug, info};

pub struct Session {
    pub editor: EditorState,
    pub registers: Registers,
    pub marks: Marks,
    pub config: Config,
    pub(crate) events: EventBus,
    pub(crate) input: Box<dyn InputSource>,
    pub(crate) recorded: Option<Operator>,
    pub(crate) pending_insert: Option<Operator>,
}

impl Session {
    /// New session; indentation and comment settings are pushed into the
    /// editor.
    pub fn new(mut editor: EditorState, config: Config) -> Self {
        editor.indent_unit = config.file.indent.unit.clone();
        editor.comment_prefix = config.file.indent.comment_prefix.clone();
        Self {
            editor,
            registers: Registers::new(),
            marks: Marks::new(),
            config,
            events: EventBus::new(),
            input: Box::new(ScriptedInput::default()),
            recorded: None,
            pending_insert: None,
        }
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn set_input(&mut self, input: impl InputSource + 'static) {
        self.input = Box::new(input);
    }

    pub fn register_hooks<H: EventHooks>(&mut self, hooks: H) {
        self.events.register(hooks);
    }

    /// Address a register for the next operator only.
    pub fn select_register(&mut self, name: char) {
        self.registers.select(name);
    }

    /// Last operator eligible for `Repeat`.
    pub fn recorded(&self) -> Option<&Operator> {
        self.recorded.as_ref()
    }

    pub fn pending_insert(&self) -> Option<&Operator> {
        self.pending_insert.as_ref()
    }

    /// Build, bind and execute one operator.
    pub fn run(&mut self, request: OperatorRequest) -> Result<Outcome, OperatorError> {
        let mut op = self.prepare(request)?;
        if op.spec.behavior == Behavior::SelectList {
            return self.open_select_list(&mut op);
        }
        let outcome = self.execute(&mut op)?;
        self.settle(op, outcome);
        Ok(outcome)
    }

    /// `run` for async hosts: external commands are awaited on the caller's
    /// runtime instead of a private one.
    pub async fn run_async(&mut self, request: OperatorRequest) -> Result<Outcome, OperatorError> {
        let mut op = self.prepare(request)?;
        let outcome = match op.spec.behavior {
            Behavior::SelectList => return self.open_select_list_async(&mut op).await,
            Behavior::ExternalCommand => self.execute_async(&mut op).await,
            Behavior::Repeat => self.repeat_async(&mut op).await?,
            _ => self.execute(&mut op)?,
        };
        self.settle(op, outcome);
        Ok(outcome)
    }

    fn prepare(&mut self, request: OperatorRequest) -> Result<Operator, OperatorError> {
        if self.pending_insert.is_some() {
            debug!(target: "operator.session", "finishing_pending_insert");
            self.leave_insert_mode();
        }
        let (spec, external) = match spec::lookup(&request.name) {
            Some(spec) => (spec, None),
            None => {
                let command = self
                    .config
                    .external_command(&request.name)
                    .cloned()
                    .ok_or_else(|| OperatorError::UnknownOperator(request.name.clone()))?;
                let base = spec::lookup("TransformStringByExternalCommand")
                    .ok_or_else(|| OperatorError::UnknownOperator(request.name.clone()))?;
                (base, Some(command))
            }
        };
        let mut op = Operator::new(spec, request.count);
        op.external = external;
        op.register = self.registers.take_selected();
        let target = match request.target {
            Some(TargetRequest::Name(name)) => {
                Some(resolve_target(&name).ok_or(OperatorError::UnknownTarget(name))?)
            }
            Some(TargetRequest::Instance(target)) => Some(target),
            None => self.default_target(spec),
        };
        match target {
            Some(mut target) => {
                if !target.can_select() {
                    return Err(self.fail_target(&op, target.name()));
                }
                target.bind_operator(spec.name);
                self.events.emit(OperatorEvent::TargetSet {
                    operator: op.name().to_string(),
                    target: target.name().to_string(),
                });
                op.target = Some(target);
            }
            None if spec.has(OperatorFlags::REQUIRE_TARGET) => {
                return Err(self.fail_target(&op, "none"));
            }
            None => {}
        }
        debug!(target: "operator.session", operator = op.name(), target = op.target_name().unwrap_or(""), count = op.count, register = ?op.register, "prepared");
        Ok(op)
    }

    fn fail_target(&self, op: &Operator, target: &str) -> OperatorError {
        self.events.emit(OperatorEvent::FailedToSetTarget {
            operator: op.name().to_string(),
            target: target.to_string(),
        });
        OperatorError::CannotSetTarget {
            operator: op.name().to_string(),
            target: target.to_string(),
        }
    }

    /// Remember the operator for repeat or for the end of insert mode.
    fn settle(&mut self, op: Operator, outcome: Outcome) {
        match outcome {
            Outcome::InsertPending => self.pending_insert = Some(op),
            Outcome::Finished if op.has(OperatorFlags::RECORDABLE) => {
                self.recorded = Some(op);
            }
            _ => {}
        }
    }

    fn begin_execute(&mut self, op: &Operator) {
        debug!(target: "operator.base", operator = op.name(), count = op.count, repeated = op.repeated, "execute");
        if self.editor.is_visual() {
            self.editor.preserve_visual_selection();
        }
    }

    /// External filter awaited on the caller's runtime.
    pub(crate) async fn execute_async(&mut self, op: &mut Operator) -> Outcome {
        self.begin_execute(op);
        let outcome = self.execute_external(op).await;
        info!(target: "operator.base", operator = op.name(), ?outcome, "executed");
        outcome
    }

    /// Dispatch on the operator's behaviour.
    pub fn execute(&mut self, op: &mut Operator) -> Result<Outcome, OperatorError> {
        self.begin_execute(op);
        let outcome = match op.spec.behavior {
            Behavior::Delete => self.delete(op),
            Behavior::Yank => self.yank(op),
            Behavior::Transform(_)
            | Behavior::ReplaceWithRegister { .. }
            | Behavior::IncrementNumber { .. } => self.transform(op),
            Behavior::Rows(_) => self.mutate_selections(op, Self::rows_selection),
            Behavior::Surround(mode) => self.surround(op, mode),
            Behavior::ExternalCommand => self.execute_external_blocking(op)?,
            Behavior::SelectList => return Err(OperatorError::NotExecutable(op.spec.name)),
            Behavior::Join => self.join(op),
            Behavior::Repeat => self.repeat(op)?,
            Behavior::Mark => self.mark(op),
            Behavior::Increase { step } => self.increase(op, step),
            Behavior::Put { before, select } => self.put(op, before, select),
            Behavior::Replace => self.replace(op),
            Behavior::Insert(kind) => self.activate_insert(op, kind),
        };
        info!(target: "operator.base", operator = op.name(), ?outcome, "executed");
        Ok(outcome)
    }
}
