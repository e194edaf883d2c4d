#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_config::Config;
use core_events::RecordingHooks;
use core_operators::{OperatorRequest, Outcome, ScriptedInput, Session};
use core_state::{EditorState, SelectionKind};
use core_text::{Position, Range};

/// Session over `text` with the cursor at `at` and default settings.
pub fn session(text: &str, at: (usize, usize)) -> Session {
    session_with(text, at, Config::default())
}

pub fn session_with(text: &str, at: (usize, usize), config: Config) -> Session {
    let mut editor = EditorState::from_text(text).unwrap();
    editor.set_cursor(Position::new(at.0, at.1));
    Session::new(editor, config)
}

/// Session whose prompts are answered from `answers` in order.
pub fn scripted(text: &str, at: (usize, usize), answers: &[&str]) -> Session {
    session(text, at).with_input(ScriptedInput::new(answers.to_vec()))
}

pub fn config(toml: &str) -> Config {
    Config::from_toml(toml).unwrap()
}

pub fn record(s: &mut Session) -> RecordingHooks {
    let hooks = RecordingHooks::new();
    s.register_hooks(hooks.clone());
    hooks
}

/// Characterwise visual selection from `a` to `b` (exclusive end).
pub fn select(s: &mut Session, a: (usize, usize), b: (usize, usize)) {
    s.editor.select_range(
        Range::new(Position::new(a.0, a.1), Position::new(b.0, b.1)),
        SelectionKind::Characterwise,
    );
}

/// Blockwise visual selection between two inclusive corners.
pub fn block(s: &mut Session, a: (usize, usize), b: (usize, usize)) {
    s.editor
        .select_block(Position::new(a.0, a.1), Position::new(b.0, b.1));
}

pub fn run(s: &mut Session, name: &str) -> Outcome {
    s.run(OperatorRequest::new(name)).unwrap()
}

pub fn run_on(s: &mut Session, name: &str, target: &str) -> Outcome {
    s.run(OperatorRequest::new(name).target(target)).unwrap()
}

pub fn cursor(s: &Session) -> (usize, usize) {
    let p = s.editor.cursor();
    (p.line, p.col)
}
