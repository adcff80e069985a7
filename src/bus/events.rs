//! # Bus Events
//!
//! The closed set of speech-lifecycle events the reminder skill listens to.

use serde::{Deserialize, Serialize};

/// Events published on the host bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SkillEvent {
    /// The assistant started speaking an utterance
    SpeechStarted { source: Option<String> },
    /// A handler finished its turn and the assistant is done speaking
    SpeechEnded { source: Option<String> },
    /// A new intent handler started, meaning the user said something
    HandlerStarted { source: Option<String> },
}

impl SkillEvent {
    /// Skill or component that produced the event
    pub fn source(&self) -> Option<&str> {
        match self {
            SkillEvent::SpeechStarted { source }
            | SkillEvent::SpeechEnded { source }
            | SkillEvent::HandlerStarted { source } => source.as_deref(),
        }
    }

    /// Whether the event was produced by the named skill
    pub fn is_from(&self, skill_name: &str) -> bool {
        self.source()
            .map(|s| s.contains(skill_name))
            .unwrap_or(false)
    }

    /// Stable event name as used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            SkillEvent::SpeechStarted { .. } => "speechStarted",
            SkillEvent::SpeechEnded { .. } => "speechEnded",
            SkillEvent::HandlerStarted { .. } => "handlerStarted",
        }
    }
}
