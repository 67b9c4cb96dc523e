//! Asking the operator yes/no questions.

use anyhow::{bail, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use std::collections::VecDeque;

use crate::flags::{Answer, FlagKey};

/// Source of answers for questions that were not preset.
pub trait Prompter {
    /// Ask `prompt` for `key` and return the operator's answer.
    fn ask(&mut self, key: FlagKey, prompt: &str) -> Result<Answer>;
}

/// Prompts on the controlling terminal. There is no default; only `y` or `n`
/// ends the prompt.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, key: FlagKey, prompt: &str) -> Result<Answer> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()
            .with_context(|| format!("reading answer for '{}'", key))?;
        Ok(Answer::from(confirmed))
    }
}

/// Answers questions from a fixed script, in order.
///
/// Records every key it was asked so callers can check which questions were
/// shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<FlagKey>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[FlagKey] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, key: FlagKey, _prompt: &str) -> Result<Answer> {
        self.asked.push(key);
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("no scripted answer left for '{}'", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompter_in_order() {
        let mut prompter = ScriptedPrompter::new([Answer::Yes, Answer::No]);

        assert_eq!(prompter.ask(FlagKey::FullApi, "full?").unwrap(), Answer::Yes);
        assert_eq!(prompter.ask(FlagKey::Office, "office?").unwrap(), Answer::No);
        assert_eq!(prompter.asked(), &[FlagKey::FullApi, FlagKey::Office]);
    }

    #[test]
    fn test_scripted_prompter_exhausted() {
        let mut prompter = ScriptedPrompter::new([]);
        let err = prompter.ask(FlagKey::Backup, "backup?").unwrap_err();
        assert!(err.to_string().contains("backup"));
    }
}
