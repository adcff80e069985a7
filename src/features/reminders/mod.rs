//! # Reminders Feature
//!
//! Spoken reminders: creation, periodic due checks with repeat, snooze,
//! cancellation, and "by the way" mentions after the assistant speaks.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Priming split out of the skill
//! - 1.1.0: Persisted records accept legacy timestamp layouts
//! - 1.0.0: Initial release

pub mod dialog;
pub mod pronouns;
pub mod priming;
pub mod record;
pub mod scheduler;
pub mod skill;

pub use pronouns::PronounNormalizer;
pub use priming::Primer;
pub use record::{deserialize_timestamp, serialize_timestamp, Reminder};
pub use scheduler::{DueCheck, ReminderScheduler, REMINDERS_KEY, UNSPECIFIED_KEY};
pub use skill::ReminderSkill;
