//! Reminder error taxonomy
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use thiserror::Error;

/// Result type for reminder store operations
pub type Result<T> = std::result::Result<T, ReminderError>;

/// Errors raised by the reminder store and its collaborators
#[derive(Error, Debug)]
pub enum ReminderError {
    /// The time extractor produced nothing usable
    #[error("No usable date or time could be resolved")]
    InvalidTime,

    /// Lookup by reminder text found no match
    #[error("No reminder named '{0}'")]
    NotFound(String),

    /// The user declined to confirm a reminder inside the night window
    #[error("Night-time reminder was not confirmed")]
    NightTimeDeclined,

    /// A persisted record could not be decoded
    #[error("Invalid reminder record: {0}")]
    InvalidRecord(String),

    #[error("Settings storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Error serializing or deserializing settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ReminderError {
    /// Expected outcomes that should be answered with a spoken response, not logged as failures
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ReminderError::InvalidTime
                | ReminderError::NotFound(_)
                | ReminderError::NightTimeDeclined
        )
    }
}
