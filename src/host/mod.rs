//! # Host Module
//!
//! Interfaces to the collaborators the assistant runtime provides: clock,
//! settings persistence, speech output, follow-up prompts and time extraction.
//! Each comes with an implementation good enough for the console host and tests.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod clock;
pub mod extractor;
pub mod notifier;
pub mod prompt;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use extractor::{
    contains_datetime, extract_datetime, normalize, Extracted, SimpleTimeExtractor,
    TimeExtractor,
};
pub use notifier::{
    dialog_data, DialogData, Notifier, RecordingNotifier, TemplateNotifier, Utterance,
};
pub use prompt::{ask_yes_no, is_affirmative, Prompter, ScriptedPrompter};
pub use settings::{JsonFileSettings, MemorySettings, SettingsStore};
