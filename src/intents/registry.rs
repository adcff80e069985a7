//! Intent handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Dispatch brackets every handler with handler lifecycle events
//! - 1.0.0: Initial implementation for handler dispatch

use log::{debug, error, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::context::IntentContext;
use super::handler::IntentHandler;
use super::Intent;
use crate::bus::SkillEvent;
use crate::core::ReminderError;

/// Registry mapping intent names to handlers
///
/// Multiple intent names can map to the same handler if they share logic.
///
/// # Example
///
/// ```ignore
/// let mut registry = IntentRegistry::new();
/// registry.register(Arc::new(RemindHandler));
///
/// registry.dispatch(ctx, &Intent::new("ReminderAt", "remind me to call mom at 6 pm")).await;
/// ```
#[derive(Clone)]
pub struct IntentRegistry {
    handlers: HashMap<&'static str, Arc<dyn IntentHandler>>,
}

impl IntentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its declared intent names
    pub fn register(&mut self, handler: Arc<dyn IntentHandler>) {
        for name in handler.intent_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IntentHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered intent names
    ///
    /// Note: a handler registered for several names is counted once per name.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }

    /// Run the handler for `intent`, returning false when none is registered
    ///
    /// The run is bracketed by `HandlerStarted` and `SpeechEnded` events
    /// sourced from this skill. Handler errors are logged and swallowed so
    /// a failed request never reaches the host.
    pub async fn dispatch(&self, ctx: Arc<IntentContext>, intent: &Intent) -> bool {
        let Some(handler) = self.get(&intent.name) else {
            warn!("No handler registered for intent '{}'", intent.name);
            return false;
        };

        let source = Some(ctx.skill_name().to_string());
        ctx.publish(SkillEvent::HandlerStarted {
            source: source.clone(),
        });

        debug!("Dispatching intent '{}'", intent.name);
        if let Err(e) = handler.handle(Arc::clone(&ctx), intent).await {
            match e.downcast_ref::<ReminderError>() {
                Some(err) if err.is_user_facing() => {
                    debug!("Intent '{}' ended early: {}", intent.name, err)
                }
                _ => error!("Intent '{}' failed: {:#}", intent.name, e),
            }
        }

        ctx.publish(SkillEvent::SpeechEnded { source });
        true
    }
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
