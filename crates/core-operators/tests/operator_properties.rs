//! Property-based tests for operator round trips.

mod common;
use common::*;

use core_operators::OperatorRequest;
use proptest::prelude::*;

proptest! {
    // Toggling case twice restores any letters-only text
    #[test]
    fn toggle_case_is_an_involution(word in "[a-zA-Z]{1,24}") {
        let text = format!("{word}\n");
        let mut s = session(&text, (0, 0));
        run_on(&mut s, "ToggleCase", "MoveToLastCharacterOfLine");
        prop_assert_ne!(s.editor.text(), text.clone());
        run_on(&mut s, "ToggleCase", "MoveToLastCharacterOfLine");
        prop_assert_eq!(s.editor.text(), text);
    }

    // Surrounding a word and deleting the same pair gives the word back
    #[test]
    fn surround_then_delete_surround(
        word in "[a-z]{1,8}",
        open in prop::sample::select(vec!["(", "[", "{"]),
    ) {
        let text = format!("{word} tail\n");
        let mut s = scripted(&text, (0, 0), &[open, open]);
        run(&mut s, "SurroundWord");
        prop_assert!(s.editor.text().starts_with(open));
        run(&mut s, "DeleteSurround");
        prop_assert_eq!(s.editor.text(), text);
    }

    // Decrease undoes Increase with the same count
    #[test]
    fn increase_then_decrease(n in -1000i64..1000, count in 1usize..50) {
        let text = format!("x {n}\n");
        let mut s = session(&text, (0, 0));
        s.run(OperatorRequest::new("Increase").count(count)).unwrap();
        prop_assert_eq!(s.editor.text(), format!("x {}\n", n + count as i64));
        s.run(OperatorRequest::new("Decrease").count(count)).unwrap();
        prop_assert_eq!(s.editor.text(), text);
    }
}
