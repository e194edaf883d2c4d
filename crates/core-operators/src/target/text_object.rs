//! Text-object targets: words, delimiter pairs, the whole buffer, and the
//! active visual selection.
//!
//! Pair lookup works on the buffer's chars. Brackets nest and may span
//! lines; quotes pair up left to right within the cursor's line (a backslash
//! escapes a quote). `AnyPair` picks the innermost pair around the cursor;
//! the forwarding variant falls back to the next pair later on the line.

use super::{Target, TargetKind, select_each};
use core_state::{EditorState, Selection, SelectionKind};
use core_text::class::{self, CharClass};
use core_text::{Buffer, Position, Range};

/// Open/close delimiter chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub open: char,
    pub close: char,
}

impl Pair {
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    pub fn is_quote(&self) -> bool {
        self.open == self.close
    }

    /// Known pair containing `c` as either delimiter.
    pub fn for_char(c: char) -> Option<Pair> {
        PAIRS
            .iter()
            .find(|p| p.pair.open == c || p.pair.close == c)
            .map(|p| p.pair)
    }
}

struct PairEntry {
    inner_name: &'static str,
    a_name: &'static str,
    pair: Pair,
}

// Order matters for AnyPair tie-breaks: quotes first, then brackets.
const PAIRS: [PairEntry; 7] = [
    PairEntry {
        inner_name: "InnerDoubleQuote",
        a_name: "ADoubleQuote",
        pair: Pair::new('"', '"'),
    },
    PairEntry {
        inner_name: "InnerSingleQuote",
        a_name: "ASingleQuote",
        pair: Pair::new('\'', '\''),
    },
    PairEntry {
        inner_name: "InnerBackTick",
        a_name: "ABackTick",
        pair: Pair::new('`', '`'),
    },
    PairEntry {
        inner_name: "InnerCurlyBracket",
        a_name: "ACurlyBracket",
        pair: Pair::new('{', '}'),
    },
    PairEntry {
        inner_name: "InnerAngleBracket",
        a_name: "AAngleBracket",
        pair: Pair::new('<', '>'),
    },
    PairEntry {
        inner_name: "InnerSquareBracket",
        a_name: "ASquareBracket",
        pair: Pair::new('[', ']'),
    },
    PairEntry {
        inner_name: "InnerParenthesis",
        a_name: "AParenthesis",
        pair: Pair::new('(', ')'),
    },
];

pub(crate) const NAMES: [&str; 22] = [
    "InnerWord",
    "AWord",
    "InnerDoubleQuote",
    "ADoubleQuote",
    "InnerSingleQuote",
    "ASingleQuote",
    "InnerBackTick",
    "ABackTick",
    "InnerCurlyBracket",
    "ACurlyBracket",
    "InnerAngleBracket",
    "AAngleBracket",
    "InnerSquareBracket",
    "ASquareBracket",
    "InnerParenthesis",
    "AParenthesis",
    "AnyPair",
    "InnerAnyPair",
    "AnyPairAllowForwarding",
    "Entire",
    "Empty",
    "CurrentSelection",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjectKind {
    InnerWord,
    AWord,
    Pair { pair: Pair, inner: bool },
    AnyPair { inner: bool, allow_forwarding: bool },
    Entire,
    /// Selects nothing.
    Empty,
    CurrentSelection,
}

/// Size of a visual selection, replayed from the cursor on repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Extent {
    kind: SelectionKind,
    rows: usize,
    /// Width for single-row and blockwise extents, end column otherwise.
    cols: usize,
}

#[derive(Debug, Clone)]
pub struct TextObject {
    kind: TextObjectKind,
    name: &'static str,
    extent: Option<Extent>,
}

impl TextObject {
    pub fn new(kind: TextObjectKind) -> Self {
        let name = match kind {
            TextObjectKind::InnerWord => "InnerWord",
            TextObjectKind::AWord => "AWord",
            TextObjectKind::Pair { pair, inner } => PAIRS
                .iter()
                .find(|p| p.pair == pair)
                .map(|p| if inner { p.inner_name } else { p.a_name })
                .unwrap_or(if inner { "InnerPair" } else { "APair" }),
            TextObjectKind::AnyPair {
                inner: true,
                allow_forwarding: _,
            } => "InnerAnyPair",
            TextObjectKind::AnyPair {
                inner: false,
                allow_forwarding: true,
            } => "AnyPairAllowForwarding",
            TextObjectKind::AnyPair { .. } => "AnyPair",
            TextObjectKind::Entire => "Entire",
            TextObjectKind::Empty => "Empty",
            TextObjectKind::CurrentSelection => "CurrentSelection",
        };
        Self {
            kind,
            name,
            extent: None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "InnerWord" => TextObjectKind::InnerWord,
            "AWord" => TextObjectKind::AWord,
            "AnyPair" => TextObjectKind::AnyPair {
                inner: false,
                allow_forwarding: false,
            },
            "InnerAnyPair" => TextObjectKind::AnyPair {
                inner: true,
                allow_forwarding: false,
            },
            "AnyPairAllowForwarding" => TextObjectKind::AnyPair {
                inner: false,
                allow_forwarding: true,
            },
            "Entire" => TextObjectKind::Entire,
            "Empty" => TextObjectKind::Empty,
            "CurrentSelection" => TextObjectKind::CurrentSelection,
            _ => {
                let entry = PAIRS
                    .iter()
                    .find(|p| p.inner_name == name || p.a_name == name)?;
                TextObjectKind::Pair {
                    pair: entry.pair,
                    inner: entry.inner_name == name,
                }
            }
        };
        Some(Self::new(kind))
    }

    /// Pair object for a typed delimiter char, `None` for unknown chars.
    pub fn for_char(c: char, inner: bool) -> Option<Self> {
        Pair::for_char(c).map(|pair| Self::new(TextObjectKind::Pair { pair, inner }))
    }

    pub fn object_kind(&self) -> TextObjectKind {
        self.kind
    }

    fn range_at(&self, buf: &Buffer, head: Position) -> Option<Range> {
        match self.kind {
            TextObjectKind::InnerWord => word_range(buf, head, false),
            TextObjectKind::AWord => word_range(buf, head, true),
            TextObjectKind::Pair { pair, inner } => {
                let chars: Vec<char> = buf.text().chars().collect();
                let at = buf.char_index(head);
                // quotes may forward to a later pair on the line
                let found = find_pair(buf, &chars, at, pair, false).or_else(|| {
                    if pair.is_quote() {
                        find_pair(buf, &chars, at, pair, true)
                    } else {
                        None
                    }
                })?;
                Some(pair_range(buf, found, inner))
            }
            TextObjectKind::AnyPair {
                inner,
                allow_forwarding,
            } => {
                let chars: Vec<char> = buf.text().chars().collect();
                let at = buf.char_index(head);
                let enclosing = PAIRS
                    .iter()
                    .filter_map(|p| find_pair(buf, &chars, at, p.pair, false))
                    .max_by_key(|(open, close)| (*open, std::cmp::Reverse(*close)));
                let found = enclosing.or_else(|| {
                    allow_forwarding
                        .then(|| {
                            PAIRS
                                .iter()
                                .filter_map(|p| find_pair(buf, &chars, at, p.pair, true))
                                .min_by_key(|(open, _)| *open)
                        })
                        .flatten()
                })?;
                Some(pair_range(buf, found, inner))
            }
            TextObjectKind::Entire => Some(Range::new(Position::origin(), buf.end_position())),
            TextObjectKind::Empty | TextObjectKind::CurrentSelection => None,
        }
    }

    fn reselect_extent(&self, state: &mut EditorState, extent: Extent) -> bool {
        let buf = state.buffer();
        let last_row = buf.line_count() - 1;
        let mut sels = Vec::new();
        for head in state.cursors() {
            let end_row = (head.line + extent.rows).min(last_row);
            match extent.kind {
                SelectionKind::Linewise => {
                    sels.push(Selection::new(buf.rows_range(head.line, end_row), false));
                }
                SelectionKind::Characterwise => {
                    let end = if extent.rows == 0 {
                        Position::new(head.line, head.col + extent.cols)
                    } else {
                        Position::new(end_row, extent.cols)
                    };
                    sels.push(Selection::new(Range::new(head, end), false));
                }
                SelectionKind::Blockwise => {
                    for row in head.line..=end_row {
                        let len = buf.line_len(row);
                        let start = Position::new(row, head.col.min(len));
                        let end = Position::new(row, (head.col + extent.cols).min(len));
                        sels.push(Selection::new(Range::new(start, end), false));
                    }
                }
            }
        }
        state.set_selections(sels);
        state.has_non_empty_selection()
    }
}

impl Target for TextObject {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::TextObject
    }

    fn wise(&self, state: &EditorState) -> SelectionKind {
        match self.kind {
            TextObjectKind::Entire => SelectionKind::Linewise,
            TextObjectKind::CurrentSelection => state
                .visual_kind()
                .or(self.extent.map(|e| e.kind))
                .unwrap_or_default(),
            _ => SelectionKind::Characterwise,
        }
    }

    fn select(&mut self, state: &mut EditorState, _count: usize) -> bool {
        match self.kind {
            TextObjectKind::Empty => false,
            TextObjectKind::CurrentSelection => {
                if let Some(kind) = state.visual_kind() {
                    let sels = state.selections();
                    if let (Some(first), Some(last)) = (sels.first(), sels.last()) {
                        let extent = match kind {
                            SelectionKind::Blockwise => Extent {
                                kind,
                                rows: last.range.start.line.abs_diff(first.range.start.line),
                                cols: first.range.end.col - first.range.start.col,
                            },
                            _ => {
                                let r = last.range;
                                let rows = r.end.line - r.start.line;
                                let cols = if rows == 0 {
                                    r.end.col - r.start.col
                                } else {
                                    r.end.col
                                };
                                let rows = if kind == SelectionKind::Linewise {
                                    r.row_span().1 - r.start.line
                                } else {
                                    rows
                                };
                                Extent { kind, rows, cols }
                            }
                        };
                        self.extent = Some(extent);
                    }
                    state.has_non_empty_selection()
                } else if let Some(extent) = self.extent {
                    self.reselect_extent(state, extent)
                } else {
                    state.has_non_empty_selection()
                }
            }
            _ => select_each(state, |st, sel| self.range_at(st.buffer(), sel.head())),
        }
    }

    fn box_clone(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }
}

fn word_range(buf: &Buffer, head: Position, around: bool) -> Option<Range> {
    let line: Vec<char> = buf.line_text(head.line).chars().collect();
    let c = *line.get(head.col)?;
    let cls = class::of(c);
    let same = |i: usize, cls: CharClass| line.get(i).is_some_and(|c| class::of(*c) == cls);
    let mut start = head.col;
    while start > 0 && same(start - 1, cls) {
        start -= 1;
    }
    let mut end = head.col + 1;
    while same(end, cls) {
        end += 1;
    }
    if around {
        if cls == CharClass::Whitespace {
            if let Some(next) = line.get(end).map(|c| class::of(*c)) {
                while same(end, next) {
                    end += 1;
                }
            }
        } else if same(end, CharClass::Whitespace) {
            while same(end, CharClass::Whitespace) {
                end += 1;
            }
        } else {
            while start > 0 && same(start - 1, CharClass::Whitespace) {
                start -= 1;
            }
        }
    }
    Some(Range::new(
        Position::new(head.line, start),
        Position::new(head.line, end),
    ))
}

/// Char indices of the open and close delimiter around `at`, or with
/// `forward` of the next pair starting after `at` on the same line.
fn find_pair(
    buf: &Buffer,
    chars: &[char],
    at: usize,
    pair: Pair,
    forward: bool,
) -> Option<(usize, usize)> {
    if pair.is_quote() {
        return find_quote(buf, chars, at, pair.open, forward);
    }
    if chars.is_empty() {
        return None;
    }
    if forward {
        let line_end = line_end_index(chars, at);
        let open = (at + 1..line_end).find(|i| chars[*i] == pair.open)?;
        return match_forward(chars, open, pair).map(|close| (open, close));
    }
    let at = at.min(chars.len() - 1);
    let open = if chars[at] == pair.close {
        match_backward(chars, at, pair)?
    } else {
        enclosing_open(chars, at, pair)?
    };
    let close = match_forward(chars, open, pair)?;
    (close >= at).then_some((open, close))
}

fn enclosing_open(chars: &[char], at: usize, pair: Pair) -> Option<usize> {
    let mut depth = 0usize;
    for j in (0..=at).rev() {
        let c = chars[j];
        if c == pair.close && j != at {
            depth += 1;
        } else if c == pair.open {
            if depth == 0 {
                return Some(j);
            }
            depth -= 1;
        }
    }
    None
}

fn match_backward(chars: &[char], close: usize, pair: Pair) -> Option<usize> {
    let mut depth = 0usize;
    for j in (0..close).rev() {
        let c = chars[j];
        if c == pair.close {
            depth += 1;
        } else if c == pair.open {
            if depth == 0 {
                return Some(j);
            }
            depth -= 1;
        }
    }
    None
}

fn match_forward(chars: &[char], open: usize, pair: Pair) -> Option<usize> {
    let mut depth = 0usize;
    for (j, c) in chars.iter().enumerate().skip(open + 1) {
        if *c == pair.open {
            depth += 1;
        } else if *c == pair.close {
            if depth == 0 {
                return Some(j);
            }
            depth -= 1;
        }
    }
    None
}

fn line_end_index(chars: &[char], at: usize) -> usize {
    (at..chars.len())
        .find(|i| chars[*i] == '\n')
        .unwrap_or(chars.len())
}

fn find_quote(
    buf: &Buffer,
    chars: &[char],
    at: usize,
    quote: char,
    forward: bool,
) -> Option<(usize, usize)> {
    let pos = buf.position_of(at);
    let line_start = at - pos.col;
    let line_end = line_end_index(chars, at);
    let quotes: Vec<usize> = (line_start..line_end)
        .filter(|i| chars[*i] == quote && (*i == line_start || chars[*i - 1] != '\\'))
        .collect();
    let mut pairs = quotes.chunks_exact(2).map(|q| (q[0], q[1]));
    if forward {
        pairs.find(|(open, _)| *open > at)
    } else {
        pairs.find(|(open, close)| *open <= at && at <= *close)
    }
}

fn pair_range(buf: &Buffer, (open, close): (usize, usize), inner: bool) -> Range {
    if !inner {
        return Range::new(buf.position_of(open), buf.position_of(close + 1));
    }
    let mut start = buf.position_of(open + 1);
    let mut end = buf.position_of(close);
    if start.line < end.line && start.col == buf.line_len(start.line) {
        start = Position::new(start.line + 1, 0);
    }
    if end.line > start.line && buf.first_non_blank_col(end.line) >= end.col {
        end = Position::new(end.line, 0);
    }
    Range::new(start, end.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn selected(text: &str, at: Position, name: &str) -> String {
        let mut state = EditorState::from_text(text).unwrap();
        state.set_cursor(at);
        let mut obj = TextObject::from_name(name).unwrap();
        obj.select(&mut state, 1);
        state.selected_text(0)
    }

    #[test]
    fn words() {
        assert_eq!(selected("foo bar baz", Position::new(0, 5), "InnerWord"), "bar");
        assert_eq!(selected("foo bar baz", Position::new(0, 5), "AWord"), "bar ");
        assert_eq!(selected("foo bar", Position::new(0, 5), "AWord"), " bar");
        assert_eq!(selected("", Position::new(0, 0), "InnerWord"), "");
    }

    #[test]
    fn nested_brackets() {
        let text = "f(a, (b), c)";
        assert_eq!(selected(text, Position::new(0, 3), "InnerParenthesis"), "a, (b), c");
        assert_eq!(selected(text, Position::new(0, 6), "AParenthesis"), "(b)");
        assert_eq!(selected(text, Position::new(0, 11), "AParenthesis"), "(a, (b), c)");
        assert_eq!(selected(text, Position::new(0, 0), "AParenthesis"), "");
    }

    #[test]
    fn multi_line_inner_bracket_is_whole_rows() {
        let text = "{\n  foo\n}\n";
        assert_eq!(selected(text, Position::new(1, 2), "InnerCurlyBracket"), "  foo\n");
        assert_eq!(selected(text, Position::new(1, 2), "ACurlyBracket"), "{\n  foo\n}");
    }

    #[test]
    fn quotes_pair_left_to_right() {
        let text = r#"say "a" or "b""#;
        assert_eq!(selected(text, Position::new(0, 5), "InnerDoubleQuote"), "a");
        assert_eq!(selected(text, Position::new(0, 8), "ADoubleQuote"), r#""b""#);
        assert_eq!(selected(text, Position::new(0, 0), "InnerDoubleQuote"), "a");
    }

    #[test]
    fn any_pair_prefers_innermost() {
        let text = r#"f("x(y)")"#;
        assert_eq!(selected(text, Position::new(0, 5), "AnyPair"), "(y)");
        assert_eq!(selected(text, Position::new(0, 3), "InnerAnyPair"), "x(y)");
        assert_eq!(selected("ab (c)", Position::new(0, 0), "AnyPair"), "");
        assert_eq!(
            selected("ab (c)", Position::new(0, 0), "AnyPairAllowForwarding"),
            "(c)"
        );
    }

    #[test]
    fn entire_and_empty() {
        assert_eq!(selected("a\nb\n", Position::new(1, 0), "Entire"), "a\nb\n");
        assert_eq!(selected("a\nb\n", Position::new(1, 0), "Empty"), "");
    }

    #[test]
    fn current_selection_replays_extent_from_cursor() {
        let mut state = EditorState::from_text("abcdef\nghijkl\n").unwrap();
        state.select_range(
            Range::new(Position::new(0, 0), Position::new(0, 3)),
            SelectionKind::Characterwise,
        );
        let mut obj = TextObject::from_name("CurrentSelection").unwrap();
        assert!(obj.select(&mut state, 1));
        state.activate_mode(core_state::Mode::Normal);
        state.set_cursor(Position::new(1, 1));
        assert!(obj.select(&mut state, 1));
        assert_eq!(state.selected_text(0), "hij");
    }
}
