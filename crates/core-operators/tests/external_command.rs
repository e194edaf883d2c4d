//! External filter commands run through `run_async` (and the blocking
//! fallback outside a runtime).

mod common;
use common::*;

use core_operators::{OperatorError, OperatorRequest, Outcome};
use core_state::{PreservedSelection, SelectionKind};
use core_text::{Position, Range};
use pretty_assertions::assert_eq;

const UPPER: &str = r#"
[[external_command]]
name = "Upper"
command = "tr"
args = ["a-z", "A-Z"]
"#;

#[tokio::test]
async fn configured_command_filters_every_selection() {
    let mut s = session_with("abc x\ndef y\n", (0, 0), config(UPPER));
    s.editor.add_cursor(Position::new(1, 0));
    let out = s
        .run_async(OperatorRequest::new("Upper").target("InnerWord"))
        .await
        .unwrap();
    assert_eq!(out, Outcome::Finished);
    assert_eq!(s.editor.text(), "ABC x\nDEF y\n");
    assert_eq!(s.editor.undo_depth(), 1);
    assert_eq!(s.recorded().map(|op| op.name()), Some("Upper"));
}

#[tokio::test]
async fn visual_filter_preserves_the_selection() {
    let mut s = session_with("abc x\n", (0, 0), config(UPPER));
    select(&mut s, (0, 0), (0, 3));
    let out = s.run_async(OperatorRequest::new("Upper")).await.unwrap();
    assert_eq!(out, Outcome::Finished);
    assert_eq!(s.editor.text(), "ABC x\n");
    assert_eq!(
        s.editor.previous_selection,
        Some(PreservedSelection {
            ranges: vec![Range::new(Position::new(0, 0), Position::new(0, 3))],
            kind: SelectionKind::Characterwise,
        })
    );
}

#[tokio::test]
async fn prompted_command_line_is_split_into_args() {
    let mut s = scripted("hello\n", (0, 0), &["tr a-z A-Z"]);
    s.run_async(
        OperatorRequest::new("TransformStringByExternalCommand").target("InnerWord"),
    )
    .await
    .unwrap();
    assert_eq!(s.editor.text(), "HELLO\n");
}

#[tokio::test]
async fn repeat_reruns_the_filter() {
    let mut s = session_with("ab cd\n", (0, 0), config(UPPER));
    s.run_async(OperatorRequest::new("Upper").target("InnerWord"))
        .await
        .unwrap();
    s.editor.set_cursor(Position::new(0, 3));
    s.run_async(OperatorRequest::new("Repeat")).await.unwrap();
    assert_eq!(s.editor.text(), "AB CD\n");
}

#[tokio::test]
async fn missing_program_cancels_without_edits() {
    let missing = r#"
[[external_command]]
name = "Missing"
command = "oxop-definitely-not-installed"
"#;
    let mut s = session_with("abc\n", (0, 1), config(missing));
    let hooks = record(&mut s);
    let out = s
        .run_async(OperatorRequest::new("Missing").target("InnerWord"))
        .await
        .unwrap();
    assert_eq!(out, Outcome::Cancelled);
    assert_eq!(s.editor.text(), "abc\n");
    assert_eq!(s.editor.undo_depth(), 0);
    assert_eq!(cursor(&s), (0, 1));
    assert!(hooks.kinds().contains(&"external_command_failed"));
    assert!(s.recorded().is_none());
}

#[tokio::test]
async fn blocking_entry_refuses_inside_a_runtime() {
    let mut s = session_with("abc\n", (0, 0), config(UPPER));
    let err = s
        .run(OperatorRequest::new("Upper").target("InnerWord"))
        .unwrap_err();
    assert!(matches!(err, OperatorError::Runtime(_)));
    assert_eq!(s.editor.text(), "abc\n");
}

#[test]
fn blocking_entry_drives_a_private_runtime() {
    let mut s = session_with("abc\n", (0, 0), config(UPPER));
    let out = s.run(OperatorRequest::new("Upper").target("InnerWord")).unwrap();
    assert_eq!(out, Outcome::Finished);
    assert_eq!(s.editor.text(), "ABC\n");
}
