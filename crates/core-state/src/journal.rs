//! Change journal.
//!
//! Every buffer mutation made through `EditorState` is appended here with the
//! range it replaced and the range the new text occupies. Checkpoints are
//! sequence numbers into the journal (plus the undo depth at creation), which
//! lets insert sessions ask "what did the user type since X" without diffing
//! whole buffers.

use core_text::{Position, Range};

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub old_range: Range,
    pub new_range: Range,
    pub old_text: String,
    pub new_text: String,
}

/// Opaque handle returned by `EditorState::create_checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub(crate) seq: usize,
    pub(crate) undo_depth: usize,
}

#[derive(Debug, Default, Clone)]
pub struct ChangeJournal {
    changes: Vec<Change>,
}

impl ChangeJournal {
    pub fn record(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn seq(&self) -> usize {
        self.changes.len()
    }

    pub fn since(&self, seq: usize) -> &[Change] {
        self.changes.get(seq..).unwrap_or(&[])
    }

    /// Compose changes since `seq` into one contiguous insertion.
    ///
    /// Edits landing inside the text accumulated so far are spliced into it
    /// (typing appends, backspace removes). An edit outside it starts a new
    /// accumulation, so the result reflects the last contiguous run.
    pub fn inserted_text_since(&self, seq: usize) -> Option<(Range, String)> {
        let mut acc: Option<(Position, Vec<char>)> = None;
        for change in self.since(seq) {
            let spliced = acc.as_mut().and_then(|(start, text)| {
                let a = offset_in(*start, text, change.old_range.start)?;
                let b = offset_in(*start, text, change.old_range.end)?;
                text.splice(a..b, change.new_text.chars());
                Some(())
            });
            if spliced.is_none() {
                acc = Some((change.new_range.start, change.new_text.chars().collect()));
            }
        }
        acc.map(|(start, chars)| {
            let text: String = chars.into_iter().collect();
            (Range::new(start, start.traverse(&text)), text)
        })
    }
}

/// Char offset of `target` inside `text` laid out from `start`, if it falls
/// within (or at the end of) the text.
fn offset_in(start: Position, text: &[char], target: Position) -> Option<usize> {
    let mut pos = start;
    for (i, ch) in text.iter().enumerate() {
        if pos == target {
            return Some(i);
        }
        if *ch == '\n' {
            pos.line += 1;
            pos.col = 0;
        } else {
            pos.col += 1;
        }
    }
    (pos == target).then_some(text.len())
}
