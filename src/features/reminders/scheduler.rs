//! # Feature: Reminder Scheduler
//!
//! Owns the pending reminder list and the set of "cancellable" reminders (ones
//! that have fired and are repeating). The persisted settings object is the
//! only durable state: every operation re-reads the `reminders` list, mutates
//! it, and writes it back while holding the store lock.
//!
//! Per-reminder lifecycle:
//! `PENDING -> fired -> PENDING[cancellable] -> (cancel | snooze | repeat budget spent) -> REMOVED`.
//! Each re-fire while cancellable re-queues the reminder `repeat_interval` later;
//! snoozing moves it forward and clears the cancellable flag.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Writes keep stored entries that cannot be decoded
//! - 1.2.0: Opportunistic "by the way" selection moved into the scheduler
//! - 1.1.0: Unspecified reminders can be listed
//! - 1.0.0: Initial release with due check, repeat, snooze and cancel

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use log::{debug, info};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use super::pronouns::PronounNormalizer;
use super::record::{decode_list, encode_list, undecodable_entries, Reminder};
use crate::core::{ReminderError, Result, SkillConfig};
use crate::host::{Clock, SettingsStore};

/// Settings key holding the pending reminder tuples
pub const REMINDERS_KEY: &str = "reminders";

/// Settings key holding reminders saved without a time
pub const UNSPECIFIED_KEY: &str = "unspec";

/// Outcome of one due check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueCheck {
    /// Reminders whose time was reached, as they were before re-queueing
    pub fired: Vec<Reminder>,
    /// Reminders due within the warning window
    pub warned: Vec<Reminder>,
    /// Fired reminders put back with a later time
    pub requeued: Vec<Reminder>,
    /// Fired reminders dropped because their repeat budget ran out
    pub expired: Vec<Reminder>,
}

#[derive(Debug, Default)]
struct SchedulerState {
    // Insertion-ordered set of reminder texts
    cancellable: Vec<String>,
}

impl SchedulerState {
    fn mark(&mut self, text: &str) {
        if !self.cancellable.iter().any(|c| c == text) {
            self.cancellable.push(text.to_string());
        }
    }

    fn unmark(&mut self, text: &str) {
        self.cancellable.retain(|c| c != text);
    }

    fn contains(&self, text: &str) -> bool {
        self.cancellable.iter().any(|c| c == text)
    }
}

/// Remove the first reminder with the given text
fn remove_by_text(reminders: &mut Vec<Reminder>, name: &str) -> Option<Reminder> {
    let idx = reminders.iter().position(|r| r.text == name)?;
    Some(reminders.remove(idx))
}

/// Move the first reminder with the given text to `new_time`, resetting its repeats
fn reschedule(reminders: &mut Vec<Reminder>, name: &str, new_time: DateTime<FixedOffset>) -> bool {
    match remove_by_text(reminders, name) {
        Some(old) => {
            reminders.push(Reminder::new(old.text, new_time));
            true
        }
        None => false,
    }
}

pub struct ReminderScheduler {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    config: SkillConfig,
    pronouns: PronounNormalizer,
    state: Mutex<SchedulerState>,
}

impl ReminderScheduler {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        config: SkillConfig,
    ) -> Result<Self> {
        config.validate()?;
        let pronouns = PronounNormalizer::new(&config.vocabulary())
            .map_err(|e| ReminderError::Config(format!("bad pronoun vocabulary: {}", e)))?;

        Ok(Self {
            settings,
            clock,
            config,
            pronouns,
            state: Mutex::new(SchedulerState::default()),
        })
    }

    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self) -> Result<Vec<Reminder>> {
        Ok(decode_list(self.settings.get(REMINDERS_KEY)?))
    }

    /// Write `reminders` back, carrying over stored entries this version cannot read
    fn save(&self, reminders: &[Reminder]) -> Result<()> {
        let kept = undecodable_entries(self.settings.get(REMINDERS_KEY)?.as_ref())?;
        let mut list = encode_list(reminders);
        if let Value::Array(items) = &mut list {
            items.extend(kept);
        }
        self.settings.set(REMINDERS_KEY, list)
    }

    /// Whether `due_at` falls in the configured night window
    pub fn is_night(&self, due_at: &DateTime<FixedOffset>) -> bool {
        self.config.night_hours.contains(&due_at.hour())
    }

    /// Create a reminder. Night-time reminders are only stored if `confirm_night` resolves to true.
    pub async fn create<F, Fut>(
        &self,
        text: &str,
        due_at: Option<DateTime<FixedOffset>>,
        confirm_night: F,
    ) -> Result<Reminder>
    where
        F: FnOnce(DateTime<FixedOffset>) -> Fut,
        Fut: Future<Output = bool>,
    {
        let due_at = due_at.ok_or(ReminderError::InvalidTime)?;

        if self.is_night(&due_at) && !confirm_night(due_at).await {
            info!("Night-time reminder '{}' at {} declined", text, due_at);
            return Err(ReminderError::NightTimeDeclined);
        }

        self.insert(text, due_at)
    }

    /// Store a reminder without the night-time policy check
    pub fn insert(&self, text: &str, due_at: DateTime<FixedOffset>) -> Result<Reminder> {
        let reminder = Reminder::new(self.pronouns.normalize(text), due_at);

        let _state = self.lock();
        let mut reminders = self.load()?;
        reminders.push(reminder.clone());
        self.save(&reminders)?;

        info!("Saved reminder '{}' for {}", reminder.text, reminder.due_at);
        Ok(reminder)
    }

    /// Store a reminder the user did not want a time for
    pub fn create_unspecified(&self, text: &str) -> Result<()> {
        let text = self.pronouns.normalize(text);

        let _state = self.lock();
        let mut unspecified = self.list_unspecified_unlocked()?;
        unspecified.push(text.clone());
        self.settings.set(
            UNSPECIFIED_KEY,
            Value::Array(unspecified.into_iter().map(Value::String).collect()),
        )?;

        info!("Saved unspecified reminder '{}'", text);
        Ok(())
    }

    fn list_unspecified_unlocked(&self) -> Result<Vec<String>> {
        Ok(match self.settings.get(UNSPECIFIED_KEY)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn list_unspecified(&self) -> Result<Vec<String>> {
        let _state = self.lock();
        self.list_unspecified_unlocked()
    }

    /// Fire reminders whose time has come and re-queue or expire them
    pub fn due_check(&self, now: DateTime<FixedOffset>) -> Result<DueCheck> {
        let mut state = self.lock();
        let mut reminders = self.load()?;
        let window = self.config.warning_window();

        let mut check = DueCheck::default();
        for r in &reminders {
            if r.is_due(now) {
                check.fired.push(r.clone());
            }
            if r.due_at - now <= window {
                check.warned.push(r.clone());
            }
        }

        if check.fired.is_empty() {
            return Ok(check);
        }

        for fired in &check.fired {
            if let Some(idx) = reminders.iter().position(|r| r == fired) {
                reminders.remove(idx);
            }

            let repeats = fired.repeat_count + 1;
            if repeats < self.config.max_repeats {
                let next = Reminder::new(fired.text.clone(), fired.due_at + self.config.repeat_interval())
                    .with_repeat_count(repeats);
                debug!("Re-queued '{}' for {} (repeat {})", next.text, next.due_at, repeats);
                reminders.push(next.clone());
                state.mark(&fired.text);
                check.requeued.push(next);
            } else {
                info!("Reminder '{}' expired after {} repeats", fired.text, repeats);
                state.unmark(&fired.text);
                check.expired.push(fired.clone());
            }
        }

        self.save(&reminders)?;
        Ok(check)
    }

    /// Reminders worth mentioning right after the assistant spoke; each is returned once
    pub fn opportunistic_notify(
        &self,
        now: DateTime<FixedOffset>,
        primed: bool,
    ) -> Result<Vec<Reminder>> {
        if !primed {
            return Ok(Vec::new());
        }

        let mut state = self.lock();
        let window = self.config.warning_window();
        let mut upcoming = Vec::new();
        for r in self.load()? {
            if now < r.due_at && r.due_at - now <= window && !state.contains(&r.text) {
                state.mark(&r.text);
                upcoming.push(r);
            }
        }
        Ok(upcoming)
    }

    /// Remove the first reminder with this text
    pub fn cancel_by_text(&self, name: &str) -> Result<bool> {
        let mut state = self.lock();
        let mut reminders = self.load()?;
        if remove_by_text(&mut reminders, name).is_none() {
            debug!("No reminder named '{}' to cancel", name);
            return Ok(false);
        }
        if !reminders.iter().any(|r| r.text == name) {
            state.unmark(name);
        }
        self.save(&reminders)?;
        info!("Cancelled reminder '{}'", name);
        Ok(true)
    }

    /// Like `cancel_by_text`, but reports a missing reminder as `NotFound`
    pub fn cancel_named(&self, name: &str) -> Result<()> {
        if self.cancel_by_text(name)? {
            Ok(())
        } else {
            Err(ReminderError::NotFound(name.to_string()))
        }
    }

    /// Move the first reminder with this text to `new_time`
    pub fn reschedule_by_text(&self, name: &str, new_time: DateTime<FixedOffset>) -> Result<bool> {
        let _state = self.lock();
        let mut reminders = self.load()?;
        if !reschedule(&mut reminders, name, new_time) {
            return Ok(false);
        }
        self.save(&reminders)?;
        Ok(true)
    }

    fn cancel_active_locked(&self, state: &mut SchedulerState, reminders: &mut Vec<Reminder>) -> usize {
        std::mem::take(&mut state.cancellable)
            .iter()
            .filter(|text| remove_by_text(reminders, text).is_some())
            .count()
    }

    /// Cancel every reminder that has fired and is still repeating
    pub fn cancel_active(&self) -> Result<usize> {
        let mut state = self.lock();
        let mut reminders = self.load()?;
        let removed = self.cancel_active_locked(&mut state, &mut reminders);
        if removed > 0 {
            self.save(&reminders)?;
            info!("Cancelled {} active reminder(s)", removed);
        }
        Ok(removed)
    }

    /// Push every active reminder `delta` past now; each must fire again to become cancellable
    pub fn snooze_active(&self, delta: Duration) -> Result<usize> {
        let new_time = self.clock.now() + delta;
        let mut state = self.lock();
        let mut reminders = self.load()?;

        let snoozed = std::mem::take(&mut state.cancellable)
            .iter()
            .filter(|text| reschedule(&mut reminders, text, new_time))
            .count();

        if snoozed > 0 {
            self.save(&reminders)?;
            info!("Snoozed {} reminder(s) until {}", snoozed, new_time);
        }
        Ok(snoozed)
    }

    fn on_day(&self, reminder: &Reminder, date: NaiveDate) -> bool {
        let local = *self.clock.now().offset();
        reminder.due_at.with_timezone(&local).date_naive() == date
    }

    /// Pending reminders on a host-local calendar day, in stored order
    pub fn list_for_day(&self, date: NaiveDate) -> Result<Vec<Reminder>> {
        let _state = self.lock();
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| self.on_day(r, date))
            .collect())
    }

    /// Drop all reminders on a day. The cancellable set is left alone.
    pub fn remove_for_day(&self, date: NaiveDate) -> Result<usize> {
        let _state = self.lock();
        let reminders = self.load()?;
        let before = reminders.len();
        let kept: Vec<Reminder> = reminders
            .into_iter()
            .filter(|r| !self.on_day(r, date))
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.save(&kept)?;
            info!("Removed {} reminder(s) on {}", removed, date);
        }
        Ok(removed)
    }

    /// Earliest pending reminder; ties go to the one stored first
    pub fn next_reminder(&self) -> Result<Option<Reminder>> {
        let _state = self.lock();
        Ok(self.load()?.into_iter().min_by_key(|r| r.due_at))
    }

    /// Cancel active reminders, then drop everything pending
    pub fn clear_all(&self) -> Result<()> {
        let mut state = self.lock();
        let mut reminders = self.load()?;
        self.cancel_active_locked(&mut state, &mut reminders);
        // Unreadable entries go too
        self.settings.set(REMINDERS_KEY, Value::Array(Vec::new()))?;
        info!("Cleared all reminders");
        Ok(())
    }

    pub fn pending(&self) -> Result<Vec<Reminder>> {
        let _state = self.lock();
        self.load()
    }

    /// Texts of reminders that can currently be cancelled or snoozed
    pub fn cancellable(&self) -> Vec<String> {
        self.lock().cancellable.clone()
    }

    pub fn is_cancellable(&self, text: &str) -> bool {
        self.lock().contains(text)
    }
}
