//! # Intents
//!
//! Parsed user requests and the handlers that turn them into scheduler
//! operations and spoken responses.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;

use std::collections::HashMap;

pub use context::IntentContext;
pub use handler::IntentHandler;
pub use registry::IntentRegistry;

/// One parsed request from the host's intent router
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intent {
    pub name: String,
    pub utterance: String,
    pub slots: HashMap<String, String>,
}

impl Intent {
    pub fn new(name: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            utterance: utterance.into(),
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    /// Non-empty slot value
    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Registry with every reminder intent handler
pub fn default_registry() -> IntentRegistry {
    let mut registry = IntentRegistry::new();
    for handler in handlers::create_all_handlers() {
        registry.register(handler);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ignores_blank_values() {
        let intent = Intent::new("ReminderAt", "remind me")
            .with_slot("reminder", "  ")
            .with_slot("timedate", "at 6 pm");
        assert_eq!(intent.slot("reminder"), None);
        assert_eq!(intent.slot("timedate"), Some("at 6 pm"));
        assert_eq!(intent.slot("missing"), None);
    }

    #[test]
    fn test_default_registry_covers_all_intents() {
        let registry = default_registry();
        for name in [
            "ReminderAt",
            "Reminder",
            "SomethingReminder",
            "UnspecifiedReminderAt",
            "GetRemindersForDay",
            "GetNextReminders",
            "DeleteReminderForDay",
            "CancelActiveReminder",
            "SnoozeReminder",
            "ClearReminders",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert_eq!(registry.len(), 10);
    }
}
