//! Register store.
//!
//! Semantics:
//! - `"` (or no name) is the unnamed register. Every write that is not
//!   addressed to `_` or `.` lands in it and is pushed onto the numbered ring
//!   (newest at index 0, capacity `Registers::MAX`).
//! - `a`..`z` replace a named slot, `A`..`Z` append to it. Named writes are
//!   mirrored into the unnamed register and the ring.
//! - `.` holds the text typed during the last insert session.
//! - `_` is the blackhole: writes are discarded, reads are empty.
//! - `0`..`9` read (and write) the ring directly.
//!
//! A one-shot register can be addressed with `select`; operators consume it
//! through `take_selected` when they start.

use crate::SelectionKind;
use tracing::trace;

/// Text plus the orientation it was captured with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterEntry {
    pub text: String,
    pub kind: SelectionKind,
}

impl RegisterEntry {
    /// Build an entry. Without an explicit kind, text ending in a newline is
    /// linewise and anything else characterwise.
    pub fn new(text: impl Into<String>, kind: Option<SelectionKind>) -> Self {
        let text = text.into();
        let kind = kind.unwrap_or(if text.ends_with('\n') {
            SelectionKind::Linewise
        } else {
            SelectionKind::Characterwise
        });
        Self { text, kind }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Registers {
    unnamed: RegisterEntry,
    numbered: Vec<RegisterEntry>, // newest at index 0, length <= MAX
    named: [RegisterEntry; 26],
    last_insert: RegisterEntry,
    selected: Option<char>,
    writes: u64,
    rotations: u64,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub const MAX: usize = 10; // ring capacity

    pub fn new() -> Self {
        Self {
            unnamed: RegisterEntry::default(),
            numbered: Vec::new(),
            named: std::array::from_fn(|_| RegisterEntry::default()),
            last_insert: RegisterEntry::default(),
            selected: None,
            writes: 0,
            rotations: 0,
        }
    }

    /// Address the next operator's register.
    pub fn select(&mut self, name: char) {
        self.selected = Some(name);
    }

    pub fn selected(&self) -> Option<char> {
        self.selected
    }

    /// Consume the addressed register (if any).
    pub fn take_selected(&mut self) -> Option<char> {
        self.selected.take()
    }

    pub fn is_unnamed(name: Option<char>) -> bool {
        matches!(name, None | Some('"'))
    }

    /// Read a register. Unknown names read as empty.
    pub fn get(&self, name: Option<char>) -> RegisterEntry {
        match name {
            None | Some('"') => self.unnamed.clone(),
            Some('.') => self.last_insert.clone(),
            Some('_') => RegisterEntry::default(),
            Some(c) if c.is_ascii_digit() => {
                let idx = c as usize - '0' as usize;
                self.numbered.get(idx).cloned().unwrap_or_default()
            }
            Some(c) => Self::named_index(c)
                .map(|i| self.named[i].clone())
                .unwrap_or_default(),
        }
    }

    /// Write a register following the addressing rules in the module docs.
    pub fn set(&mut self, name: Option<char>, entry: RegisterEntry) {
        self.writes += 1;
        match name {
            Some('_') => {
                trace!(target: "state.registers", "blackhole_write");
            }
            Some('.') => {
                trace!(target: "state.registers", len = entry.text.len(), "last_insert_write");
                self.last_insert = entry;
            }
            Some(c) if c.is_ascii_digit() => {
                let idx = c as usize - '0' as usize;
                if idx < self.numbered.len() {
                    self.numbered[idx] = entry;
                } else {
                    self.unshift_numbered(entry);
                }
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let Some(idx) = Self::named_index(c) else {
                    return;
                };
                let slot = &mut self.named[idx];
                if c.is_ascii_uppercase() && !slot.is_empty() {
                    if entry.kind == SelectionKind::Linewise && !slot.text.ends_with('\n') {
                        slot.text.push('\n');
                    }
                    slot.text.push_str(&entry.text);
                    if entry.kind == SelectionKind::Linewise {
                        slot.kind = SelectionKind::Linewise;
                    }
                } else {
                    *slot = entry;
                }
                let payload = slot.clone();
                trace!(target: "state.registers", register = %c, len = payload.text.len(), "named_write");
                self.unnamed = payload.clone();
                self.unshift_numbered(payload);
            }
            _ => {
                trace!(target: "state.registers", len = entry.text.len(), kind = ?entry.kind, "unnamed_write");
                self.unnamed = entry.clone();
                self.unshift_numbered(entry);
            }
        }
    }

    /// Return immutable slice of numbered ring (newest first).
    pub fn numbered(&self) -> &[RegisterEntry] {
        &self.numbered
    }

    /// Snapshot non-empty named registers (a-z).
    pub fn named_snapshot(&self) -> Vec<(char, &RegisterEntry)> {
        self.named
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_empty())
            .map(|(i, e)| ((b'a' + i as u8) as char, e))
            .collect()
    }

    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn rotation_count(&self) -> u64 {
        self.rotations
    }

    fn unshift_numbered(&mut self, entry: RegisterEntry) {
        if self.numbered.len() == Self::MAX {
            self.numbered.pop();
            self.rotations += 1;
        }
        self.numbered.insert(0, entry);
    }

    fn named_index(c: char) -> Option<usize> {
        if c.is_ascii_alphabetic() {
            Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> RegisterEntry {
        RegisterEntry::new(text, None)
    }

    #[test]
    fn kind_inferred_from_trailing_newline() {
        assert_eq!(chars("abc\n").kind, SelectionKind::Linewise);
        assert_eq!(chars("abc").kind, SelectionKind::Characterwise);
        let block = RegisterEntry::new("a\nb", Some(SelectionKind::Blockwise));
        assert_eq!(block.kind, SelectionKind::Blockwise);
    }

    #[test]
    fn unnamed_write_populates_ring() {
        let mut r = Registers::new();
        r.set(None, chars("alpha"));
        assert_eq!(r.get(None).text, "alpha");
        assert_eq!(r.get(Some('"')).text, "alpha");
        assert_eq!(r.get(Some('0')).text, "alpha");
    }

    #[test]
    fn ring_rotates_capped() {
        let mut r = Registers::new();
        for i in 0..12 {
            r.set(None, chars(&format!("d{i}")));
        }
        assert_eq!(r.numbered().len(), Registers::MAX);
        assert_eq!(r.numbered()[0].text, "d11");
        assert_eq!(r.numbered().last().unwrap().text, "d2");
        assert_eq!(r.rotation_count(), 2);
    }

    #[test]
    fn uppercase_appends_to_named_slot() {
        let mut r = Registers::new();
        r.set(Some('a'), chars("one"));
        r.set(Some('A'), chars("two"));
        assert_eq!(r.get(Some('a')).text, "onetwo");
        assert_eq!(r.get(None).text, "onetwo");
    }

    #[test]
    fn linewise_append_separates_lines() {
        let mut r = Registers::new();
        r.set(Some('q'), chars("one"));
        r.set(Some('Q'), chars("two\n"));
        let e = r.get(Some('q'));
        assert_eq!(e.text, "one\ntwo\n");
        assert_eq!(e.kind, SelectionKind::Linewise);
    }

    #[test]
    fn blackhole_discards_and_keeps_unnamed() {
        let mut r = Registers::new();
        r.set(None, chars("keep"));
        r.set(Some('_'), chars("gone"));
        assert_eq!(r.get(None).text, "keep");
        assert!(r.get(Some('_')).is_empty());
    }

    #[test]
    fn last_insert_register_is_separate() {
        let mut r = Registers::new();
        r.set(Some('.'), chars("typed"));
        assert_eq!(r.get(Some('.')).text, "typed");
        assert!(r.get(None).is_empty());
    }

    #[test]
    fn selected_register_is_one_shot() {
        let mut r = Registers::new();
        r.select('b');
        assert_eq!(r.take_selected(), Some('b'));
        assert_eq!(r.take_selected(), None);
    }
}
