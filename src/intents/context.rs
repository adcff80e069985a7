//! Shared context handed to every intent handler
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::Arc;

use crate::bus::{EventBus, SkillEvent};
use crate::core::Vocabulary;
use crate::features::reminders::ReminderScheduler;
use crate::host::{
    ask_yes_no, contains_datetime, extract_datetime, is_affirmative, DialogData, Notifier,
    Prompter, TimeExtractor,
};

pub struct IntentContext {
    pub scheduler: Arc<ReminderScheduler>,
    pub notifier: Arc<dyn Notifier>,
    pub prompter: Arc<dyn Prompter>,
    pub extractor: Arc<dyn TimeExtractor>,
    pub bus: Option<Arc<dyn EventBus>>,
    pub vocabulary: Vocabulary,
}

impl IntentContext {
    pub fn new(
        scheduler: Arc<ReminderScheduler>,
        notifier: Arc<dyn Notifier>,
        prompter: Arc<dyn Prompter>,
        extractor: Arc<dyn TimeExtractor>,
    ) -> Self {
        let vocabulary = scheduler.config().vocabulary();
        Self {
            scheduler,
            notifier,
            prompter,
            extractor,
            bus: None,
            vocabulary,
        }
    }

    pub fn with_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn skill_name(&self) -> &str {
        &self.scheduler.config().skill_name
    }

    pub fn lang(&self) -> &str {
        &self.scheduler.config().lang
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.scheduler.now()
    }

    /// Host-local calendar day of a timestamp
    pub fn local_date(&self, dt: &DateTime<FixedOffset>) -> NaiveDate {
        self.local(dt).date_naive()
    }

    pub fn local(&self, dt: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        dt.with_timezone(self.now().offset())
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn publish(&self, event: SkillEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }

    pub fn speak(&self, dialog: &str, data: &DialogData) {
        self.notifier.speak(dialog, data);
    }

    pub fn extract(&self, utterance: &str) -> Option<DateTime<FixedOffset>> {
        extract_datetime(self.extractor.as_ref(), utterance, self.now(), self.lang())
    }

    pub fn contains_datetime(&self, utterance: &str) -> bool {
        contains_datetime(self.extractor.as_ref(), utterance, self.now(), self.lang())
    }

    pub async fn get_response(&self, dialog: &str, data: &DialogData) -> Option<String> {
        self.prompter.get_response(dialog, data).await
    }

    /// True only for an explicit yes
    pub async fn confirm(&self, dialog: &str, data: &DialogData) -> bool {
        ask_yes_no(self.prompter.as_ref(), &self.vocabulary, dialog, data).await == Some(true)
    }

    pub fn is_affirmative(&self, response: &str) -> bool {
        is_affirmative(response, &self.vocabulary)
    }
}
