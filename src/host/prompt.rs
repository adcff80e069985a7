//! Follow-up questions to the user

use async_trait::async_trait;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::notifier::DialogData;
use crate::core::Vocabulary;

/// Asks the user something and waits for the answer
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Speak `dialog` and return the user's reply, `None` on silence
    async fn get_response(&self, dialog: &str, data: &DialogData) -> Option<String>;
}

/// Whether any of `words` appears as a whole word in `response`
pub fn matches_vocabulary(response: &str, words: &[String]) -> bool {
    let response = response.to_lowercase();
    words.iter().any(|word| {
        Regex::new(&format!(r"\b{}\b", regex::escape(&word.to_lowercase())))
            .map(|re| re.is_match(&response))
            .unwrap_or(false)
    })
}

pub fn is_affirmative(response: &str, vocabulary: &Vocabulary) -> bool {
    matches_vocabulary(response, &vocabulary.yes)
}

/// Ask a yes/no question. `None` when the answer was neither or absent.
pub async fn ask_yes_no(
    prompter: &dyn Prompter,
    vocabulary: &Vocabulary,
    dialog: &str,
    data: &DialogData,
) -> Option<bool> {
    let response = prompter.get_response(dialog, data).await?;
    if matches_vocabulary(&response, &vocabulary.no) {
        Some(false)
    } else if is_affirmative(&response, vocabulary) {
        Some(true)
    } else {
        None
    }
}

/// Prompter that replays canned answers and records the questions asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(Into::into)).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn get_response(&self, dialog: &str, _data: &DialogData) -> Option<String> {
        self.asked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(dialog.to_string());
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .flatten()
    }
}
