// Core layer - configuration and errors
pub mod core;

// Host layer - clock, settings, speech, prompts and time extraction
pub mod host;

// Event bus between host and skill
pub mod bus;

// Features layer - the reminder lifecycle
pub mod features;

// Application layer - intent dispatch
pub mod intents;

pub use core::{Config, ReminderError, SkillConfig};

pub use features::{Reminder, ReminderScheduler, ReminderSkill};

pub use intents::{default_registry, Intent, IntentContext, IntentRegistry};
