//! Operator lifecycle events.
//!
//! Operators report what they do (target resolution, selection, flash
//! feedback, beeps, insert sessions, external processes) as `OperatorEvent`s
//! on an `EventBus`. Hosts attach `EventHooks` to render feedback; tests attach
//! a `RecordingHooks` to assert on the sequence. Hooks must not block: they run
//! synchronously inside the operator's turn.

use core_text::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

// Simple atomic counters (fetch_add relaxed), inspected by tests or logged by
// the binary on exit.
pub static EVENTS_EMITTED: AtomicU64 = AtomicU64::new(0);
pub static FLASHES_EMITTED: AtomicU64 = AtomicU64::new(0);
pub static BEEPS_EMITTED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorEvent {
    /// A target was bound to the operator.
    TargetSet { operator: String, target: String },
    /// The target could not be bound (unknown or not selectable).
    FailedToSetTarget { operator: String, target: String },
    WillSelectTarget { operator: String },
    /// `selected` is true when at least one selection ended up non-empty.
    DidSelectTarget { operator: String, selected: bool },
    /// Highlight `ranges` for `duration_ms`.
    Flash {
        operator: String,
        ranges: Vec<Range>,
        duration_ms: u64,
    },
    /// Audible/visual bell for a no-op (nothing to increment, nothing selected).
    Beep { operator: String },
    /// An insert-mode operator handed control to the user.
    InsertStarted { operator: String },
    /// The insert session ended with `text` typed by the user.
    InsertFinished { operator: String, text: String },
    /// The select list was shown with `items` entries.
    SelectListOpened { items: usize },
    ExternalCommandFailed { command: String, error: String },
    DidFinish { operator: String },
}

impl OperatorEvent {
    /// Stable snake_case name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorEvent::TargetSet { .. } => "target_set",
            OperatorEvent::FailedToSetTarget { .. } => "failed_to_set_target",
            OperatorEvent::WillSelectTarget { .. } => "will_select_target",
            OperatorEvent::DidSelectTarget { .. } => "did_select_target",
            OperatorEvent::Flash { .. } => "flash",
            OperatorEvent::Beep { .. } => "beep",
            OperatorEvent::InsertStarted { .. } => "insert_started",
            OperatorEvent::InsertFinished { .. } => "insert_finished",
            OperatorEvent::SelectListOpened { .. } => "select_list_opened",
            OperatorEvent::ExternalCommandFailed { .. } => "external_command_failed",
            OperatorEvent::DidFinish { .. } => "did_finish",
        }
    }
}

/// Observer attached to an `EventBus`.
pub trait EventHooks: Send + Sync + 'static {
    fn on_event(&self, _event: &OperatorEvent) {}
}

/// Default no-op hooks implementation.
pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}

/// Hooks that keep every event, shareable between the bus and a test.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    events: Arc<Mutex<Vec<OperatorEvent>>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OperatorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(OperatorEvent::kind).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut e) = self.events.lock() {
            e.clear();
        }
    }
}

impl EventHooks for RecordingHooks {
    fn on_event(&self, event: &OperatorEvent) {
        if let Ok(mut e) = self.events.lock() {
            e.push(event.clone());
        }
    }
}

/// Fan-out of operator events to registered hooks.
#[derive(Default)]
pub struct EventBus {
    hooks: Vec<Box<dyn EventHooks>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register<H: EventHooks>(&mut self, hooks: H) {
        self.hooks.push(Box::new(hooks));
    }

    pub fn emit(&self, event: OperatorEvent) {
        EVENTS_EMITTED.fetch_add(1, Ordering::Relaxed);
        match &event {
            OperatorEvent::Flash { .. } => {
                FLASHES_EMITTED.fetch_add(1, Ordering::Relaxed);
            }
            OperatorEvent::Beep { .. } => {
                BEEPS_EMITTED.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        trace!(target: "operator.events", kind = event.kind(), hooks = self.hooks.len(), "emit");
        for hooks in &self.hooks {
            hooks.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Position;

    #[test]
    fn recording_hooks_see_events_in_order() {
        let rec = RecordingHooks::new();
        let mut bus = EventBus::new();
        bus.register(rec.clone());
        bus.register(NoopEventHooks);
        bus.emit(OperatorEvent::WillSelectTarget {
            operator: "Delete".into(),
        });
        bus.emit(OperatorEvent::Flash {
            operator: "Delete".into(),
            ranges: vec![Range::new(Position::new(0, 0), Position::new(0, 2))],
            duration_ms: 300,
        });
        assert_eq!(rec.kinds(), vec!["will_select_target", "flash"]);
        rec.clear();
        assert!(rec.events().is_empty());
    }

    #[test]
    fn counters_advance() {
        let before = BEEPS_EMITTED.load(Ordering::Relaxed);
        let bus = EventBus::new();
        bus.emit(OperatorEvent::Beep {
            operator: "Increase".into(),
        });
        assert!(BEEPS_EMITTED.load(Ordering::Relaxed) > before);
    }
}
