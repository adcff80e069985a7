//! # Broadcast Bus
//!
//! In-process publish/subscribe over `tokio::sync::broadcast`. Every subscriber
//! receives every event; dropping the receiver unsubscribes.

use log::{debug, warn};
use tokio::sync::broadcast;

use super::events::SkillEvent;

/// Broadcast channel capacity for events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Publish/subscribe interface the skill depends on
pub trait EventBus: Send + Sync {
    fn publish(&self, event: SkillEvent);

    fn subscribe(&self) -> broadcast::Receiver<SkillEvent>;
}

#[derive(Debug, Clone)]
pub struct BroadcastBus {
    event_tx: broadcast::Sender<SkillEvent>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { event_tx }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for BroadcastBus {
    fn publish(&self, event: SkillEvent) {
        debug!("Bus event {}", event.name());
        // No subscribers is fine
        if self.event_tx.send(event).is_err() {
            debug!("Bus event dropped, no subscribers");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SkillEvent> {
        self.event_tx.subscribe()
    }
}

/// Receive the next event, skipping over lag gaps. `None` once the bus is closed.
pub async fn next_event(rx: &mut broadcast::Receiver<SkillEvent>) -> Option<SkillEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Closed) => return None,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Bus subscriber lagged behind by {} events", n);
            }
        }
    }
}
