//! # Priming
//!
//! Tracks whether the assistant has just spoken, so an impending reminder can
//! be mentioned "by the way". Speech primes the flag; a new handler starting
//! (the user talking again) resets it. When a turn ends the skill waits out a
//! grace period; whichever comes first, the grace timeout or a reset, ends the
//! wait, and the flag is consumed exactly once.

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug)]
pub struct Primer {
    primed: AtomicBool,
    reset: Notify,
    prime_delay: Duration,
    grace: Duration,
}

impl Primer {
    pub fn new(prime_delay: Duration, grace: Duration) -> Self {
        Self {
            primed: AtomicBool::new(false),
            reset: Notify::new(),
            prime_delay,
            grace,
        }
    }

    /// Speech started: become primed after a short delay
    pub async fn prime(&self) {
        tokio::time::sleep(self.prime_delay).await;
        self.primed.store(true, Ordering::SeqCst);
    }

    /// The user started a new interaction
    pub fn reset(&self) {
        self.primed.store(false, Ordering::SeqCst);
        self.reset.notify_waiters();
    }

    pub fn is_primed(&self) -> bool {
        self.primed.load(Ordering::SeqCst)
    }

    /// Speech ended: wait for the grace period or a reset, then take the primed flag.
    /// Returns true when the caller may mention upcoming reminders.
    pub async fn settle(&self, own_speech: bool) -> bool {
        if own_speech {
            // Our own announcement must not trigger another one
            self.primed.store(false, Ordering::SeqCst);
            return false;
        }

        let interrupted = self.reset.notified();
        tokio::select! {
            _ = tokio::time::sleep(self.grace) => {}
            _ = interrupted => {
                debug!("Grace period interrupted by a new interaction");
            }
        }

        self.primed.swap(false, Ordering::SeqCst)
    }
}
