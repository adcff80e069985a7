//! # Core Module
//!
//! Configuration and error handling shared by every layer of the skill.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, SkillConfig, Vocabulary};
pub use error::{ReminderError, Result};
