//! String transforms: every selection's text is replaced by a function of
//! itself (case, encoding, whitespace, join/split, reverse, registers,
//! numbers), plus the row operators that delegate to the host.

use crate::error::Outcome;
use crate::operator::Operator;
use crate::session::Session;
use crate::spec::{Behavior, OperatorFlags, RowOp, Transform};
use core_state::{RegisterEntry, Selection};
use core_text::{Position, Range};
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase};
use regex::Regex;
use tracing::{trace, warn};

/// Apply a pure text transform. `input` is the operator's prompt answer.
pub(crate) fn apply(transform: Transform, text: &str, input: &str) -> String {
    match transform {
        Transform::ToggleCase => toggle_case(text),
        Transform::UpperCase => text.to_uppercase(),
        Transform::LowerCase => text.to_lowercase(),
        Transform::CamelCase => text.to_lower_camel_case(),
        Transform::SnakeCase => text.to_snake_case(),
        Transform::PascalCase => text.to_upper_camel_case(),
        Transform::DashCase => text.to_kebab_case(),
        Transform::TitleCase => text.to_title_case(),
        Transform::EncodeUriComponent => urlencoding::encode(text).into_owned(),
        Transform::DecodeUriComponent => urlencoding::decode(text)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| text.to_string()),
        Transform::TrimString => text.trim().to_string(),
        Transform::CompactSpaces => compact_spaces(text),
        Transform::RemoveLeadingWhiteSpaces => {
            let mut out = split_rows(text)
                .map(str::trim_start)
                .collect::<Vec<_>>()
                .join("\n");
            out.push('\n');
            out
        }
        Transform::JoinWithKeepingSpace => join_rows(text, "", false),
        Transform::JoinByInput => join_rows(text, &format!(" {input} "), true),
        Transform::SplitString { keep_splitter } => {
            let separator = if keep_splitter {
                format!("{input}\n")
            } else {
                "\n".to_string()
            };
            text.replace(input, &separator)
        }
        Transform::Reverse => {
            let mut rows: Vec<&str> = split_rows(text).collect();
            rows.reverse();
            let mut out = rows.join("\n");
            out.push('\n');
            out
        }
    }
}

/// Chars whose lowercase is themselves become uppercase, the rest lowercase.
fn toggle_case(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            let lower: Vec<char> = c.to_lowercase().collect();
            if lower == [c] {
                c.to_uppercase().collect::<Vec<_>>()
            } else {
                lower
            }
        })
        .collect()
}

/// Rows of `text` without the final newline.
fn split_rows(text: &str) -> std::str::Split<'_, char> {
    text.strip_suffix('\n').unwrap_or(text).split('\n')
}

/// Collapse inner runs of blanks on every row, keeping leading and trailing
/// whitespace. All-space text becomes one space.
fn compact_spaces(text: &str) -> String {
    if !text.is_empty() && text.chars().all(|c| c == ' ') {
        return " ".to_string();
    }
    text.split('\n')
        .map(|row| {
            let body = row.trim();
            if body.is_empty() {
                return row.to_string();
            }
            let lead = &row[..row.len() - row.trim_start().len()];
            let trail = &row[row.trim_end().len()..];
            let middle = body.split([' ', '\t']).filter(|w| !w.is_empty());
            format!("{lead}{}{trail}", middle.collect::<Vec<_>>().join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_rows(text: &str, separator: &str, trim: bool) -> String {
    let mut rows = text.trim_end().split('\n');
    let mut out = rows.next().unwrap_or_default().to_string();
    for row in rows {
        out.push_str(separator);
        out.push_str(if trim { row.trim_start_matches([' ', '\t']) } else { row });
    }
    out.push('\n');
    out
}

/// Replace every `pattern` match, each one `delta` past the previous
/// result. The first match starts from its own value unless `base` already
/// carries one from an earlier selection.
pub(crate) fn increment_numbers(
    re: &Regex,
    text: &str,
    delta: i64,
    base: &mut Option<i64>,
) -> String {
    re.replace_all(text, |caps: &regex::Captures| {
        let matched = &caps[0];
        let from = match *base {
            Some(b) => Some(b),
            None => matched.parse::<i64>().ok(),
        };
        // unparsable or overflowing matches stay as they are
        match from.and_then(|n| n.checked_add(delta)) {
            Some(next) => {
                *base = Some(next);
                next.to_string()
            }
            None => matched.to_string(),
        }
    })
    .into_owned()
}

impl Session {
    pub(crate) fn transform(&mut self, op: &mut Operator) -> Outcome {
        self.mutate_with_input(op, Self::transform_selection)
    }

    pub(crate) fn transform_selection(&mut self, op: &mut Operator, idx: usize) {
        let sel = self.editor.selection(idx);
        if sel.is_empty() {
            return;
        }
        let old = self.editor.buffer().text_in_range(sel.range);
        let Some(new) = self.new_text(op, &old, idx) else {
            return;
        };
        let range = self.editor.set_text_in_range(sel.range, &new);
        if std::mem::take(&mut op.auto_indent_after) {
            let (first, last) = range.row_span();
            self.editor.auto_indent_rows(first, last);
        }
        self.place_after_transform(op, idx, range);
    }

    /// Replacement for one selection's text; `None` leaves it untouched.
    pub(crate) fn new_text(&mut self, op: &mut Operator, old: &str, idx: usize) -> Option<String> {
        let input = op.inputs.last().cloned().unwrap_or_default();
        match op.spec.behavior {
            Behavior::Transform(t) => Some(apply(t, old, &input)),
            Behavior::ReplaceWithRegister { swap } => {
                let entry = self.registers.get(op.register);
                if entry.is_empty() {
                    return None;
                }
                if swap {
                    self.registers
                        .set(op.register, RegisterEntry::new(old, Some(op.wise)));
                }
                Some(entry.text)
            }
            Behavior::ExternalCommand => op.outputs.get(idx).cloned().flatten(),
            Behavior::IncrementNumber { step } => {
                let re = match Regex::new(&self.config.file.number.pattern) {
                    Ok(re) => re,
                    Err(e) => {
                        warn!(target: "operator.transform", error = %e, "invalid_number_pattern");
                        return None;
                    }
                };
                let delta = i64::try_from(op.count)
                    .ok()
                    .and_then(|count| step.checked_mul(count))?;
                Some(increment_numbers(&re, old, delta, &mut op.number_base))
            }
            Behavior::Surround(mode) => self.surround_text(op, mode, old),
            _ => None,
        }
    }

    /// Cursor after a replacement: the stay point, the start of the new
    /// text, or just past it when the operator advances.
    pub(crate) fn place_after_transform(&mut self, op: &Operator, idx: usize, range: Range) {
        let cursor = match self.stay_point(op, idx).filter(|_| self.need_stay(op)) {
            Some(stay) => stay,
            None if op.has(OperatorFlags::SET_POINT) => range.start,
            None => range.end,
        };
        trace!(target: "operator.transform", operator = op.name(), line = cursor.line, col = cursor.col, "cursor_after_transform");
        self.editor.set_selection(idx, Selection::cursor(cursor));
    }

    pub(crate) fn rows_selection(&mut self, op: &mut Operator, idx: usize) {
        let sel = self.editor.selection(idx);
        if sel.is_empty() {
            return;
        }
        let (first, last) = sel.range.row_span();
        match op.spec.behavior {
            Behavior::Rows(RowOp::Indent) => self.editor.indent_rows(first, last),
            Behavior::Rows(RowOp::Outdent) => self.editor.outdent_rows(first, last),
            Behavior::Rows(RowOp::AutoIndent) => self.editor.auto_indent_rows(first, last),
            Behavior::Rows(RowOp::ToggleLineComments) => {
                self.editor.toggle_line_comments(first, last)
            }
            _ => return,
        }
        let cursor = self
            .stay_point(op, idx)
            .filter(|_| self.need_stay(op))
            .unwrap_or_else(|| {
                Position::new(first, self.editor.buffer().first_non_blank_col(first))
            });
        self.editor.set_selection(idx, Selection::cursor(cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn case_transforms() {
        assert_eq!(apply(Transform::ToggleCase, "Hello", ""), "hELLO");
        assert_eq!(apply(Transform::CamelCase, "foo_bar baz", ""), "fooBarBaz");
        assert_eq!(apply(Transform::SnakeCase, "fooBarBaz", ""), "foo_bar_baz");
        assert_eq!(apply(Transform::PascalCase, "foo-bar", ""), "FooBar");
        assert_eq!(apply(Transform::DashCase, "FooBar", ""), "foo-bar");
        assert_eq!(apply(Transform::TitleCase, "foo_bar", ""), "Foo Bar");
    }

    #[test]
    fn uri_components() {
        assert_eq!(apply(Transform::EncodeUriComponent, "a b&c", ""), "a%20b%26c");
        assert_eq!(apply(Transform::DecodeUriComponent, "a%20b", ""), "a b");
        // invalid utf-8 keeps the original
        assert_eq!(apply(Transform::DecodeUriComponent, "%FF", ""), "%FF");
    }

    #[test]
    fn whitespace_transforms() {
        assert_eq!(apply(Transform::TrimString, "  a b \n", ""), "a b");
        assert_eq!(apply(Transform::CompactSpaces, "   ", ""), " ");
        assert_eq!(
            apply(Transform::CompactSpaces, "  a   b \t c  \nx  y", ""),
            "  a b c  \nx y"
        );
        assert_eq!(
            apply(Transform::RemoveLeadingWhiteSpaces, "  a\n\tb\n", ""),
            "a\nb\n"
        );
    }

    #[test]
    fn join_split_reverse() {
        assert_eq!(apply(Transform::JoinWithKeepingSpace, "a\n  b\nc\n", ""), "a  bc\n");
        assert_eq!(apply(Transform::JoinByInput, "a\n  b\nc\n", "-"), "a - b - c\n");
        assert_eq!(
            apply(Transform::SplitString { keep_splitter: false }, "a,b,c\n", ","),
            "a\nb\nc\n"
        );
        assert_eq!(
            apply(Transform::SplitString { keep_splitter: true }, "a,b\n", ","),
            "a,\nb\n"
        );
        assert_eq!(apply(Transform::Reverse, "1\n2\n3\n", ""), "3\n2\n1\n");
    }

    #[test]
    fn numbers_chain_from_previous_result() {
        let re = Regex::new("-?[0-9]+").unwrap();
        let mut base = None;
        assert_eq!(increment_numbers(&re, "1 1 1", 1, &mut base), "2 3 4");
        assert_eq!(base, Some(4));
        assert_eq!(increment_numbers(&re, "x 9", 1, &mut base), "x 5");
        let mut base = None;
        assert_eq!(increment_numbers(&re, "5", 3, &mut base), "8");
        let mut base = None;
        assert_eq!(increment_numbers(&re, "0", -2, &mut base), "-2");
    }

    #[test]
    fn overflowing_number_is_kept() {
        let re = Regex::new("-?[0-9]+").unwrap();
        let mut base = None;
        let text = "9223372036854775807 1";
        assert_eq!(increment_numbers(&re, text, 1, &mut base), "9223372036854775807 2");
        assert_eq!(base, Some(2));
        let mut base = Some(i64::MAX);
        assert_eq!(increment_numbers(&re, "7", 1, &mut base), "7");
        assert_eq!(base, Some(i64::MAX));
    }
}
