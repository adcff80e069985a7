//! # Configuration
//!
//! Runtime configuration from the environment plus the YAML skill profile
//! (timings, night window, vocabulary).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Built-in Arabic vocabulary
//! - 1.0.0: Initial release with env + YAML loading

use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::ReminderError;

/// Process-level configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file holding the persisted settings object
    pub settings_path: PathBuf,
    /// Optional YAML skill profile
    pub skill_config_path: Option<String>,
    /// Optional YAML dialog templates
    pub dialog_path: Option<String>,
    pub lang: String,
    pub log_level: String,
}

impl Config {
    /// Read configuration from environment variables (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self> {
        let settings_path = std::env::var("REMINDER_SETTINGS_PATH")
            .unwrap_or_else(|_| "reminder-settings.json".to_string());

        Ok(Config {
            settings_path: PathBuf::from(settings_path),
            skill_config_path: std::env::var("REMINDER_SKILL_CONFIG").ok(),
            dialog_path: std::env::var("REMINDER_DIALOG_PATH").ok(),
            lang: std::env::var("REMINDER_LANG").unwrap_or_else(|_| "en-us".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Load the skill profile named by `REMINDER_SKILL_CONFIG`, or defaults for the configured language
    pub fn skill_config(&self) -> Result<SkillConfig> {
        match &self.skill_config_path {
            Some(path) => SkillConfig::load(path),
            None => Ok(SkillConfig::for_lang(&self.lang)),
        }
    }
}

/// Words the skill needs to understand or produce in the user's language
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Vocabulary {
    /// First-person possessives rewritten to `your`
    pub possessives: Vec<String>,
    pub your: String,
    pub yes: Vec<String>,
    pub no: Vec<String>,
    pub today: String,
    pub tomorrow: String,
}

impl Vocabulary {
    pub fn english() -> Self {
        Self {
            possessives: vec!["my".to_string(), "our".to_string()],
            your: "your".to_string(),
            yes: ["yes", "yeah", "sure", "yep", "ok", "okay", "please do"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            no: ["no", "nope", "don't", "cancel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            today: "today".to_string(),
            tomorrow: "tomorrow".to_string(),
        }
    }

    pub fn arabic() -> Self {
        Self {
            possessives: vec!["لي".to_string(), "لنا".to_string()],
            your: "لك".to_string(),
            yes: vec!["نعم".to_string(), "أجل".to_string(), "حسنا".to_string()],
            no: vec!["لا".to_string(), "كلا".to_string()],
            today: "اليوم".to_string(),
            tomorrow: "غدا".to_string(),
        }
    }

    /// Built-in vocabulary for a language tag, falling back to English
    pub fn for_lang(lang: &str) -> Self {
        if lang.to_lowercase().starts_with("ar") {
            Self::arabic()
        } else {
            Self::english()
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::english()
    }
}

/// Timing and policy knobs for the reminder lifecycle
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SkillConfig {
    /// Name used to recognise this skill's own bus events
    pub skill_name: String,
    pub lang: String,
    pub tick_seconds: u64,
    pub warning_window_minutes: i64,
    pub repeat_interval_minutes: i64,
    pub max_repeats: u32,
    pub snooze_minutes: i64,
    pub grace_period_seconds: u64,
    pub prime_delay_seconds: u64,
    /// Hours (0-23) that require confirmation before a reminder is saved
    pub night_hours: Vec<u32>,
    /// Hour used when a date is given without a time of day
    pub default_hour: u32,
    /// Audio cue played when a reminder fires
    pub reminder_cue: String,
    /// Overrides the built-in vocabulary for `lang`
    pub vocabulary: Option<Vocabulary>,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            skill_name: "reminder-skill".to_string(),
            lang: "en-us".to_string(),
            tick_seconds: 30,
            warning_window_minutes: 10,
            repeat_interval_minutes: 2,
            max_repeats: 3,
            snooze_minutes: 15,
            grace_period_seconds: 10,
            prime_delay_seconds: 1,
            night_hours: vec![23, 0, 1, 2, 3, 4, 5, 6],
            default_hour: 8,
            reminder_cue: "twoBeep.wav".to_string(),
            vocabulary: None,
        }
    }
}

impl SkillConfig {
    /// Defaults with the language set
    pub fn for_lang(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            ..Self::default()
        }
    }

    /// Load a skill profile from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SkillConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ReminderError> {
        if let Some(hour) = self.night_hours.iter().find(|h| **h > 23) {
            return Err(ReminderError::Config(format!(
                "Night hour out of range: {}",
                hour
            )));
        }
        if self.default_hour > 23 {
            return Err(ReminderError::Config(format!(
                "Default hour out of range: {}",
                self.default_hour
            )));
        }
        if self.tick_seconds == 0 {
            return Err(ReminderError::Config(
                "tick_seconds must be positive".to_string(),
            ));
        }
        if self.warning_window_minutes <= 0
            || self.repeat_interval_minutes <= 0
            || self.snooze_minutes <= 0
        {
            return Err(ReminderError::Config(
                "Reminder intervals must be positive".to_string(),
            ));
        }
        if self.max_repeats == 0 {
            return Err(ReminderError::Config(
                "max_repeats must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
            .clone()
            .unwrap_or_else(|| Vocabulary::for_lang(&self.lang))
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_seconds)
    }

    pub fn warning_window(&self) -> Duration {
        Duration::minutes(self.warning_window_minutes)
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::minutes(self.repeat_interval_minutes)
    }

    pub fn snooze_delay(&self) -> Duration {
        Duration::minutes(self.snooze_minutes)
    }

    pub fn grace_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.grace_period_seconds)
    }

    pub fn prime_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.prime_delay_seconds)
    }
}
