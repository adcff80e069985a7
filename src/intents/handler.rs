//! Intent handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::context::IntentContext;
use super::Intent;

/// Trait for intent handlers
///
/// Each handler processes one or more intents delivered by the host's
/// natural-language router. Handlers are registered with an `IntentRegistry`
/// and dispatched by intent name.
///
/// # Example
///
/// ```ignore
/// pub struct StopHandler;
///
/// #[async_trait]
/// impl IntentHandler for StopHandler {
///     fn intent_names(&self) -> &'static [&'static str] {
///         &["Stop"]
///     }
///
///     async fn handle(&self, ctx: Arc<IntentContext>, intent: &Intent) -> Result<()> {
///         ctx.scheduler.cancel_active()?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Intent name(s) this handler processes
    fn intent_names(&self) -> &'static [&'static str];

    /// Handle one parsed intent
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared context with the scheduler and host collaborators
    /// * `intent` - The intent with its extracted slots
    async fn handle(&self, ctx: Arc<IntentContext>, intent: &Intent) -> Result<()>;
}
