mod common;
use common::*;

use core_operators::{OperatorError, OperatorRequest, Outcome, Target, TargetKind};
use core_state::{EditorState, Mode, RegisterEntry, SelectionKind};
use pretty_assertions::assert_eq;

/// A target that refuses to bind.
#[derive(Debug, Clone)]
struct Unselectable;

impl Target for Unselectable {
    fn name(&self) -> &'static str {
        "Unselectable"
    }
    fn kind(&self) -> TargetKind {
        TargetKind::Motion
    }
    fn wise(&self, _state: &EditorState) -> SelectionKind {
        SelectionKind::Characterwise
    }
    fn select(&mut self, _state: &mut EditorState, _count: usize) -> bool {
        false
    }
    fn can_select(&self) -> bool {
        false
    }
    fn box_clone(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }
}

#[test]
fn increment_number_chains_across_matches() {
    let mut s = session("1 1 1\n", (0, 0));
    select(&mut s, (0, 0), (0, 5));
    assert_eq!(run(&mut s, "IncrementNumber"), Outcome::Finished);
    assert_eq!(s.editor.text(), "2 3 4\n");
    assert_eq!(s.editor.mode(), Mode::Normal);
}

#[test]
fn increment_number_single_match_uses_count() {
    let mut s = session("5\n", (0, 0));
    select(&mut s, (0, 0), (0, 1));
    s.run(OperatorRequest::new("IncrementNumber").count(3)).unwrap();
    assert_eq!(s.editor.text(), "8\n");
}

#[test]
fn join_by_input_then_split_back() {
    let mut s = scripted("a\nb\nc\n", (0, 0), &["-", " - "]);
    s.run(OperatorRequest::new("JoinByInput").count(3)).unwrap();
    assert_eq!(s.editor.text(), "a - b - c\n");
    run(&mut s, "SplitString");
    assert_eq!(s.editor.text(), "a\nb\nc\n");
}

#[test]
fn linewise_put_after_lands_on_new_row() {
    let mut s = session("one\ntwo\n", (0, 1));
    s.registers
        .set(None, core_state::RegisterEntry::new("x\n", None));
    run(&mut s, "PutAfter");
    assert_eq!(s.editor.text(), "one\nx\ntwo\n");
    assert_eq!(cursor(&s), (1, 0));
}

#[test]
fn repeated_change_reinserts_without_prompting() {
    let mut s = session("abc def\n", (0, 0));
    assert_eq!(run_on(&mut s, "Change", "InnerWord"), Outcome::InsertPending);
    s.editor.type_text("foo");
    assert_eq!(s.leave_insert_mode(), Outcome::Finished);
    assert_eq!(s.editor.text(), "foo def\n");

    s.editor.set_cursor(core_text::Position::new(0, 4));
    assert_eq!(run(&mut s, "Repeat"), Outcome::Finished);
    assert_eq!(s.editor.text(), "foo foo\n");
    assert_eq!(s.editor.mode(), Mode::Normal);
    assert!(s.pending_insert().is_none());
}

#[test]
fn missing_required_target_fails_before_any_edit() {
    let mut s = session("abc\n", (0, 0));
    let hooks = record(&mut s);
    let err = s.run(OperatorRequest::new("Delete")).unwrap_err();
    assert!(matches!(
        err,
        OperatorError::CannotSetTarget { ref operator, ref target }
            if operator == "Delete" && target == "none"
    ));
    assert_eq!(hooks.kinds(), vec!["failed_to_set_target"]);
    assert_eq!(s.editor.text(), "abc\n");
}

#[test]
fn unknown_names_are_rejected() {
    let mut s = session("abc\n", (0, 0));
    assert!(matches!(
        s.run(OperatorRequest::new("Frobnicate")),
        Err(OperatorError::UnknownOperator(_))
    ));
    assert!(matches!(
        s.run(OperatorRequest::new("Delete").target("MoveSideways")),
        Err(OperatorError::UnknownTarget(_))
    ));
}

#[test]
fn empty_selection_leaves_no_undo_step() {
    let mut s = session("abc\n", (0, 1));
    assert_eq!(run_on(&mut s, "Delete", "Empty"), Outcome::NoOp);
    assert_eq!(s.editor.undo_depth(), 0);
    assert_eq!(cursor(&s), (0, 1));
    assert!(s.recorded().is_none());
}

#[test]
fn one_undo_step_per_operator() {
    let mut s = session("a b c\nd e f\n", (0, 0));
    s.editor.add_cursor(core_text::Position::new(1, 0));
    run_on(&mut s, "UpperCase", "MoveToLastCharacterOfLine");
    assert_eq!(s.editor.text(), "A B C\nD E F\n");
    assert_eq!(s.editor.undo_depth(), 1);
    assert!(s.editor.undo());
    assert_eq!(s.editor.text(), "a b c\nd e f\n");
}

#[test]
fn addressed_register_is_used_once() {
    let mut s = session("one\ntwo\n", (0, 0));
    s.select_register('a');
    run(&mut s, "YankLine");
    assert_eq!(s.registers.get(Some('a')).text, "one\n");
    assert_eq!(s.registers.selected(), None);

    s.editor.set_cursor(core_text::Position::new(1, 0));
    run(&mut s, "YankLine");
    assert_eq!(s.registers.get(Some('a')).text, "one\n");
    assert_eq!(s.registers.get(None).text, "two\n");
}

#[test]
fn flash_follows_blacklist() {
    let mut s = session("abc\n", (0, 0));
    let hooks = record(&mut s);
    run_on(&mut s, "UpperCase", "InnerWord");
    assert!(hooks.kinds().contains(&"flash"));

    let mut s = session_with("abc\n", (0, 0), config("[flash]\nblacklist = [\"UpperCase\"]\n"));
    let hooks = record(&mut s);
    run_on(&mut s, "UpperCase", "InnerWord");
    assert_eq!(s.editor.text(), "ABC\n");
    assert!(!hooks.kinds().contains(&"flash"));
}

#[test]
fn change_marks_cover_the_last_change() {
    let mut s = session("abc def\n", (0, 4));
    run_on(&mut s, "UpperCase", "InnerWord");
    let range = s.marks.change_range().unwrap();
    assert_eq!((range.start.col, range.end.col), (4, 7));
}

#[test]
fn surround_word_then_delete_surround() {
    let mut s = scripted("abc def\n", (0, 0), &["(", "("]);
    run(&mut s, "SurroundWord");
    assert_eq!(s.editor.text(), "(abc) def\n");
    run(&mut s, "DeleteSurround");
    assert_eq!(s.editor.text(), "abc def\n");
}

#[test]
fn change_surround_any_pair_replaces_delimiters() {
    let mut s = scripted("f(a, b)\n", (0, 3), &["["]);
    assert_eq!(run(&mut s, "ChangeSurroundAnyPair"), Outcome::Finished);
    assert_eq!(s.editor.text(), "f[a, b]\n");
}

#[test]
fn change_surround_any_pair_aborts_without_pair() {
    let mut s = scripted("plain\n", (0, 1), &["["]);
    assert_eq!(run(&mut s, "ChangeSurroundAnyPair"), Outcome::Aborted);
    assert_eq!(s.editor.text(), "plain\n");
    assert_eq!(cursor(&s), (0, 1));
}

#[test]
fn cancelled_prompt_edits_nothing() {
    let mut s = scripted("abc\n", (0, 0), &[]);
    assert_eq!(run_on(&mut s, "Surround", "InnerWord"), Outcome::Cancelled);
    assert_eq!(s.editor.text(), "abc\n");
    assert_eq!(s.editor.undo_depth(), 0);
}

#[test]
fn delete_in_visual_mode_returns_to_normal() {
    let mut s = session("hello world\n", (0, 0));
    select(&mut s, (0, 0), (0, 6));
    run(&mut s, "Delete");
    assert_eq!(s.editor.text(), "world\n");
    assert_eq!(s.registers.get(None).text, "hello ");
    assert_eq!(s.editor.mode(), Mode::Normal);
}

#[test]
fn reverse_rows() {
    let mut s = session("1\n2\n3\n", (0, 0));
    s.run(OperatorRequest::new("Reverse").target("MoveToRelativeLine").count(3))
        .unwrap();
    assert_eq!(s.editor.text(), "3\n2\n1\n");
}

#[test]
fn stay_option_keeps_cursor_on_yank() {
    let mut s = session_with("abc def\n", (0, 5), config("[stay]\non_yank = true\n"));
    run_on(&mut s, "Yank", "InnerWord");
    assert_eq!(s.registers.get(None).text, "def");
    assert_eq!(cursor(&s), (0, 5));

    let mut s = session("abc def\n", (0, 5));
    run_on(&mut s, "Yank", "InnerWord");
    assert_eq!(cursor(&s), (0, 4));
}

#[test]
fn target_that_cannot_select_is_rejected() {
    let mut s = session("abc\n", (0, 0));
    let hooks = record(&mut s);
    let err = s
        .run(OperatorRequest::new("Delete").target_instance(Box::new(Unselectable)))
        .unwrap_err();
    assert!(matches!(
        err,
        OperatorError::CannotSetTarget { ref target, .. } if target == "Unselectable"
    ));
    assert_eq!(hooks.kinds(), vec!["failed_to_set_target"]);
    assert_eq!(s.editor.text(), "abc\n");
    assert_eq!(s.editor.undo_depth(), 0);
    assert!(s.recorded().is_none());
}

#[test]
fn blockwise_delete_to_line_end_keeps_block_register() {
    let mut s = session("abcd\nefgh\nij\n", (0, 0));
    block(&mut s, (0, 1), (2, 2));
    assert_eq!(run(&mut s, "DeleteToLastCharacterOfLine"), Outcome::Finished);
    assert_eq!(s.editor.text(), "a\ne\ni\n");
    assert_eq!(
        s.registers.get(None),
        RegisterEntry::new("bcd\nfgh\nj", Some(SelectionKind::Blockwise))
    );
    assert_eq!(s.editor.mode(), Mode::Normal);
    assert_eq!(s.editor.cursors().len(), 1);
}

#[test]
fn blockwise_change_to_line_end_types_on_every_row() {
    let mut s = session("abcd\nefgh\nij\n", (0, 0));
    block(&mut s, (0, 1), (2, 2));
    assert_eq!(run(&mut s, "ChangeToLastCharacterOfLine"), Outcome::InsertPending);
    assert_eq!(s.editor.text(), "a\ne\ni\n");
    s.editor.type_text("X");
    assert_eq!(s.leave_insert_mode(), Outcome::Finished);
    assert_eq!(s.editor.text(), "aX\neX\niX\n");
    assert_eq!(s.registers.get(None).kind, SelectionKind::Blockwise);
    s.editor.undo();
    assert_eq!(s.editor.text(), "abcd\nefgh\nij\n");
}

#[test]
fn blockwise_insert_at_start_and_end_of_selection() {
    let mut s = session("abcd\nefgh\n", (0, 0));
    block(&mut s, (0, 1), (1, 2));
    assert_eq!(run(&mut s, "InsertAtStartOfSelection"), Outcome::InsertPending);
    s.editor.type_text("X");
    s.leave_insert_mode();
    assert_eq!(s.editor.text(), "aXbcd\neXfgh\n");

    let mut s = session("abcd\nefgh\n", (0, 0));
    block(&mut s, (0, 1), (1, 2));
    assert_eq!(run(&mut s, "InsertAtEndOfSelection"), Outcome::InsertPending);
    s.editor.type_text("X");
    s.leave_insert_mode();
    assert_eq!(s.editor.text(), "abcXd\nefgXh\n");
}

#[test]
fn map_surround_wraps_each_word() {
    let mut s = scripted("x a b y\n", (0, 0), &["("]);
    select(&mut s, (0, 2), (0, 5));
    assert_eq!(run(&mut s, "MapSurround"), Outcome::Finished);
    assert_eq!(s.editor.text(), "x (a) (b) y\n");
}

#[test]
fn delete_surround_any_pair_uses_enclosing_pair() {
    let mut s = session("(foo) (bar)\n", (0, 1));
    assert_eq!(run(&mut s, "DeleteSurroundAnyPair"), Outcome::Finished);
    assert_eq!(s.editor.text(), "foo (bar)\n");
}

#[test]
fn delete_surround_any_pair_forwarding_finds_later_pair() {
    let mut s = session("a (foo) (bar)\n", (0, 0));
    assert_eq!(run(&mut s, "DeleteSurroundAnyPair"), Outcome::NoOp);
    assert_eq!(s.editor.text(), "a (foo) (bar)\n");

    assert_eq!(run(&mut s, "DeleteSurroundAnyPairAllowForwarding"), Outcome::Finished);
    assert_eq!(s.editor.text(), "a foo (bar)\n");
}

#[test]
fn swap_with_register_stores_replaced_text() {
    let mut s = session("abc def\n", (0, 0));
    s.registers.set(None, RegisterEntry::new("xyz", None));
    assert_eq!(run_on(&mut s, "SwapWithRegister", "InnerWord"), Outcome::Finished);
    assert_eq!(s.editor.text(), "xyz def\n");
    assert_eq!(s.registers.get(None).text, "abc");
}

#[test]
fn insert_at_last_insert_returns_to_where_typing_stopped() {
    let mut s = session("abc\ndef\n", (1, 1));
    assert_eq!(run(&mut s, "ActivateInsertMode"), Outcome::InsertPending);
    s.editor.type_text("X");
    s.leave_insert_mode();
    assert_eq!(s.editor.text(), "abc\ndXef\n");

    s.editor.set_cursor(core_text::Position::new(0, 0));
    assert_eq!(run(&mut s, "InsertAtLastInsert"), Outcome::InsertPending);
    s.editor.type_text("Y");
    s.leave_insert_mode();
    assert_eq!(s.editor.text(), "abc\ndXYef\n");
}
