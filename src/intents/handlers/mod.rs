//! Per-intent handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

pub mod cancel;
pub mod create;
pub mod query;

use std::sync::Arc;

use super::handler::IntentHandler;

/// Create all reminder intent handlers
pub fn create_all_handlers() -> Vec<Arc<dyn IntentHandler>> {
    vec![
        Arc::new(create::RemindHandler),
        Arc::new(query::QueryHandler),
        Arc::new(cancel::CancelHandler),
    ]
}
