//! # Reminder Skill
//!
//! Wires the scheduler to the host: a periodic due check that announces
//! reminders, and a bus subscription that mentions upcoming reminders after
//! the assistant finishes speaking.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Shutdown waits for background tasks so the bus subscription is gone on return
//! - 1.0.0: Initial release

use log::{debug, error, info};
use std::sync::{Arc, Mutex};
use tokio::task::{JoinHandle, JoinSet};

use super::dialog;
use super::priming::Primer;
use super::scheduler::{DueCheck, ReminderScheduler};
use crate::bus::{next_event, EventBus, SkillEvent};
use crate::core::Result;
use crate::host::{dialog_data, Clock, DialogData, Notifier};

pub struct ReminderSkill {
    scheduler: Arc<ReminderScheduler>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    primer: Primer,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReminderSkill {
    pub fn new(
        scheduler: Arc<ReminderScheduler>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = scheduler.config();
        let primer = Primer::new(config.prime_delay(), config.grace_period());
        Self {
            scheduler,
            notifier,
            clock,
            primer,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.scheduler.config().skill_name
    }

    pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
        &self.scheduler
    }

    /// Run one due check and announce what fired
    pub fn check_reminders(&self) -> Result<DueCheck> {
        let check = self.scheduler.due_check(self.clock.now())?;

        for r in &check.fired {
            self.notifier.play(&self.scheduler.config().reminder_cue);
            self.notifier.speak(
                dialog::REMINDING,
                &dialog_data([("reminder", r.text.clone())]),
            );
        }
        for _ in &check.requeued {
            self.notifier
                .speak(dialog::TO_CANCEL_INSTRUCTIONS, &DialogData::new());
        }

        Ok(check)
    }

    /// Mention reminders due within the warning window that were not mentioned yet
    pub fn announce_upcoming(&self) -> Result<usize> {
        let upcoming = self.scheduler.opportunistic_notify(self.clock.now(), true)?;
        for r in &upcoming {
            self.notifier.speak(
                dialog::BY_THE_WAY,
                &dialog_data([("reminder", r.text.clone())]),
            );
        }
        Ok(upcoming.len())
    }

    pub async fn handle_event(&self, event: SkillEvent) {
        debug!("{} received {}", self.name(), event.name());
        match event {
            SkillEvent::SpeechStarted { .. } => self.primer.prime().await,
            SkillEvent::HandlerStarted { .. } => self.primer.reset(),
            SkillEvent::SpeechEnded { .. } => {
                let own = event.is_from(self.name());
                if self.primer.settle(own).await {
                    if let Err(e) = self.announce_upcoming() {
                        error!("Failed to check upcoming reminders: {}", e);
                    }
                }
            }
        }
    }

    /// Start the due-check ticker and subscribe to the bus
    pub fn initialize(self: &Arc<Self>, bus: &dyn EventBus) {
        let tick = self.scheduler.config().tick_interval();

        let ticker = {
            let skill = Arc::clone(self);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick);
                loop {
                    interval.tick().await;
                    if let Err(e) = skill.check_reminders() {
                        error!("Reminder check failed: {}", e);
                    }
                }
            })
        };

        let listener = {
            let skill = Arc::clone(self);
            let mut rx = bus.subscribe();
            tokio::spawn(async move {
                // Owned here so aborting the listener also aborts pending grace-period waits
                let mut handlers = JoinSet::new();
                loop {
                    tokio::select! {
                        event = next_event(&mut rx) => match event {
                            Some(event) => {
                                let handler = Arc::clone(&skill);
                                handlers.spawn(async move { handler.handle_event(event).await });
                            }
                            None => break,
                        },
                        Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
                    }
                }
                while handlers.join_next().await.is_some() {}
            })
        };

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(ticker);
        tasks.push(listener);
        info!("{} initialized, checking every {:?}", self.name(), tick);
    }

    /// Stop the ticker, drop the bus subscription and abandon in-flight event handling
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> =
            std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            // Cancelled is the expected outcome
            let _ = task.await;
        }
        info!("{} shut down", self.name());
    }

    /// Host "stop" request: cancel active reminders. True when something was cancelled.
    pub fn stop(&self) -> Result<bool> {
        if self.scheduler.cancel_active()? > 0 {
            self.notifier
                .speak(dialog::REMINDER_CANCELLED, &DialogData::new());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BroadcastBus;
    use crate::core::SkillConfig;
    use crate::host::{ManualClock, MemorySettings, RecordingNotifier, Utterance};
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, h, m, 0)
            .unwrap()
    }

    fn setup(now: DateTime<FixedOffset>) -> (Arc<ReminderSkill>, Arc<RecordingNotifier>) {
        let clock = Arc::new(ManualClock::new(now));
        let scheduler = Arc::new(
            ReminderScheduler::new(
                Arc::new(MemorySettings::new()),
                clock.clone(),
                SkillConfig::default(),
            )
            .unwrap(),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let skill = Arc::new(ReminderSkill::new(scheduler, notifier.clone(), clock));
        (skill, notifier)
    }

    #[test]
    fn test_check_reminders_announces_fired() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("take out trash", at(18, 0)).unwrap();

        let check = skill.check_reminders().unwrap();
        assert_eq!(check.fired.len(), 1);

        let calls = notifier.calls();
        assert_eq!(
            calls[0],
            Utterance::Play {
                cue: "twoBeep.wav".to_string()
            }
        );
        assert_eq!(
            calls[1],
            Utterance::Speak {
                dialog: "Reminding".to_string(),
                data: dialog_data([("reminder", "take out trash".to_string())]),
            }
        );
        assert_eq!(notifier.dialogs()[1], "ToCancelInstructions");
    }

    #[test]
    fn test_stop_cancels_active() {
        let (skill, notifier) = setup(at(18, 0));
        assert!(!skill.stop().unwrap());

        skill.scheduler().insert("stretch", at(18, 0)).unwrap();
        skill.check_reminders().unwrap();
        notifier.clear();

        assert!(skill.stop().unwrap());
        assert_eq!(notifier.dialogs(), vec!["ReminderCancelled".to_string()]);
        assert!(skill.scheduler().pending().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_due_check() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("call mom", at(18, 0)).unwrap();
        let bus = BroadcastBus::new();

        skill.initialize(&bus);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(notifier.dialogs().contains(&"Reminding".to_string()));
        skill.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_by_the_way_after_other_speech() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("call mom", at(18, 0) + Duration::minutes(5)).unwrap();
        let bus = BroadcastBus::new();
        skill.initialize(&bus);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let weather = Some("weather-skill".to_string());
        bus.publish(SkillEvent::SpeechStarted { source: weather.clone() });
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        bus.publish(SkillEvent::SpeechEnded { source: weather });
        tokio::time::sleep(std::time::Duration::from_secs(11)).await;

        assert_eq!(notifier.dialogs(), vec!["ByTheWay".to_string()]);
        assert!(skill.scheduler().is_cancellable("call mom"));
        skill.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_own_speech_does_not_trigger() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("call mom", at(18, 0) + Duration::minutes(5)).unwrap();
        let bus = BroadcastBus::new();
        skill.initialize(&bus);

        let own = Some("reminder-skill".to_string());
        bus.publish(SkillEvent::SpeechStarted { source: own.clone() });
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        bus.publish(SkillEvent::SpeechEnded { source: own });
        tokio::time::sleep(std::time::Duration::from_secs(11)).await;

        assert!(notifier.dialogs().is_empty());
        skill.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_interaction_during_grace_suppresses() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("call mom", at(18, 0) + Duration::minutes(5)).unwrap();
        let bus = BroadcastBus::new();
        skill.initialize(&bus);

        bus.publish(SkillEvent::SpeechStarted { source: None });
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        bus.publish(SkillEvent::SpeechEnded { source: None });
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        bus.publish(SkillEvent::HandlerStarted { source: None });
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;

        assert!(notifier.dialogs().is_empty());
        skill.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_grace_period_stays_silent() {
        let (skill, notifier) = setup(at(18, 0));
        skill.scheduler().insert("call mom", at(18, 0) + Duration::minutes(5)).unwrap();
        let bus = BroadcastBus::new();
        skill.initialize(&bus);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let weather = Some("weather-skill".to_string());
        bus.publish(SkillEvent::SpeechStarted { source: weather.clone() });
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        bus.publish(SkillEvent::SpeechEnded { source: weather });
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        skill.shutdown().await;
        tokio::time::sleep(std::time::Duration::from_secs(15)).await;

        assert!(notifier.dialogs().is_empty());
        assert!(!skill.scheduler().is_cancellable("call mom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_unsubscribes() {
        let (skill, _) = setup(at(18, 0));
        let bus = BroadcastBus::new();
        skill.initialize(&bus);
        assert_eq!(bus.subscriber_count(), 1);

        skill.shutdown().await;
        assert_eq!(bus.subscriber_count(), 0);
    }
}
