//! # Bus Module
//!
//! Speech-lifecycle event bus between the host and the skill.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod broadcast;
pub mod events;

pub use broadcast::{next_event, BroadcastBus, EventBus};
pub use events::SkillEvent;
