//! Input prompt and select-list seams.
//!
//! Operators that need a char (surround, replace, mark) or a choice (select
//! list) ask an `InputSource`. Returning `None` cancels the operator.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPrompt {
    pub operator: &'static str,
    /// Longest answer the operator accepts.
    pub chars_max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    /// Operator name dispatched when chosen.
    pub name: String,
    pub display_name: String,
}

pub trait InputSource {
    fn read(&mut self, prompt: InputPrompt) -> Option<String>;
    fn select(&mut self, items: &[SelectItem]) -> Option<String>;
}

/// Answers prompts from a queue; an exhausted queue cancels.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self, _prompt: InputPrompt) -> Option<String> {
        self.answers.pop_front()
    }

    /// Answers with the queued name when it is on the list.
    fn select(&mut self, items: &[SelectItem]) -> Option<String> {
        let answer = self.answers.pop_front()?;
        items
            .iter()
            .find(|item| item.name == answer || item.display_name == answer)
            .map(|item| item.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_drains_in_order() {
        let mut input = ScriptedInput::new(["(", "x"]);
        let prompt = InputPrompt {
            operator: "Surround",
            chars_max: 1,
        };
        assert_eq!(input.read(prompt).as_deref(), Some("("));
        assert_eq!(input.read(prompt).as_deref(), Some("x"));
        assert_eq!(input.read(prompt), None);
    }

    #[test]
    fn select_matches_name_or_display_name() {
        let items = vec![SelectItem {
            name: "SnakeCase".into(),
            display_name: "Snake Case".into(),
        }];
        let mut input = ScriptedInput::new(["Snake Case", "Nope"]);
        assert_eq!(input.select(&items).as_deref(), Some("SnakeCase"));
        assert_eq!(input.select(&items), None);
    }
}
