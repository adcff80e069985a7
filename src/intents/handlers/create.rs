//! Reminder creation handlers
//!
//! Handles: ReminderAt, Reminder, SomethingReminder, UnspecifiedReminderAt
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Night-time confirmation on every path that stores a timed reminder
//! - 1.0.0: Initial implementation

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use log::{debug, info};
use std::sync::Arc;

use crate::core::ReminderError;
use crate::features::reminders::dialog::{
    nice_date, nice_time, relative_day, RelativeDay, ABOUT_WHAT, ARE_YOU_SURE, FINE, IT_IS_NIGHT,
    NO_DATE_TIME, OK, PARTICULAR_TIME, SAVING_REMINDER, SAVING_REMINDER_DATE,
    SAVING_REMINDER_TOMORROW, SPECIFY_TIME,
};
use crate::features::reminders::Reminder;
use crate::host::{dialog_data, DialogData};
use crate::intents::context::IntentContext;
use crate::intents::handler::IntentHandler;
use crate::intents::Intent;

/// Handler for the reminder creation intents
pub struct RemindHandler;

#[async_trait]
impl IntentHandler for RemindHandler {
    fn intent_names(&self) -> &'static [&'static str] {
        &[
            "ReminderAt",
            "Reminder",
            "SomethingReminder",
            "UnspecifiedReminderAt",
        ]
    }

    async fn handle(&self, ctx: Arc<IntentContext>, intent: &Intent) -> Result<()> {
        match intent.name.as_str() {
            "ReminderAt" => match intent.slot("reminder") {
                Some(text) => Self::add_at(&ctx, text, &intent.utterance).await,
                None => Self::add_unnamed_at(&ctx, intent).await,
            },
            "Reminder" => match intent.slot("reminder") {
                Some(text) => Self::add_unspecified(&ctx, text, &intent.utterance).await,
                None => Self::add_unnamed(&ctx, &intent.utterance).await,
            },
            "SomethingReminder" => Self::add_unnamed(&ctx, &intent.utterance).await,
            "UnspecifiedReminderAt" => Self::add_unnamed_at(&ctx, intent).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Named reminder with the time somewhere in the utterance
    async fn add_at(ctx: &IntentContext, text: &str, utterance: &str) -> Result<()> {
        match ctx.extract(utterance) {
            Some(when) => Self::save(ctx, text, when).await,
            None => {
                ctx.speak(NO_DATE_TIME, &DialogData::new());
                Ok(())
            }
        }
    }

    /// Named reminder without a time: ask for one, or keep it unscheduled
    async fn add_unspecified(ctx: &IntentContext, text: &str, utterance: &str) -> Result<()> {
        // The router sometimes misses a time that is in the utterance
        if ctx.contains_datetime(utterance) {
            return Self::add_at(ctx, text, utterance).await;
        }

        let response = ctx
            .get_response(PARTICULAR_TIME, &DialogData::new())
            .await
            .unwrap_or_default();
        let mut when = ctx.extract(&response);

        if when.is_none() && !ctx.is_affirmative(&response) {
            debug!("No time wanted for '{}'", text);
            ctx.scheduler.create_unspecified(text)?;
            ctx.speak(OK, &DialogData::new());
            return Ok(());
        }

        if when.is_none() {
            let response = ctx
                .get_response(SPECIFY_TIME, &DialogData::new())
                .await
                .unwrap_or_default();
            when = ctx.extract(&response);
        }

        match when {
            Some(when) => Self::save(ctx, text, when).await,
            None => {
                ctx.speak(FINE, &DialogData::new());
                Ok(())
            }
        }
    }

    /// Neither topic nor time given
    async fn add_unnamed(ctx: &IntentContext, utterance: &str) -> Result<()> {
        match ctx.get_response(ABOUT_WHAT, &DialogData::new()).await {
            Some(text) if !text.trim().is_empty() => {
                Self::add_unspecified(ctx, text.trim(), utterance).await
            }
            _ => Ok(()),
        }
    }

    /// Time given without a topic
    async fn add_unnamed_at(ctx: &IntentContext, intent: &Intent) -> Result<()> {
        let phrase = intent.slot("timedate").unwrap_or(&intent.utterance);
        let Some(when) = ctx.extract(phrase) else {
            ctx.speak(NO_DATE_TIME, &DialogData::new());
            return Ok(());
        };

        match ctx.get_response(ABOUT_WHAT, &DialogData::new()).await {
            Some(text) if !text.trim().is_empty() => Self::save(ctx, text.trim(), when).await,
            _ => Ok(()),
        }
    }

    /// Store the reminder, asking first when it falls in the night
    async fn save(ctx: &IntentContext, text: &str, when: DateTime<FixedOffset>) -> Result<()> {
        let confirm_night = move |_: DateTime<FixedOffset>| async move {
            ctx.speak(IT_IS_NIGHT, &DialogData::new());
            ctx.confirm(ARE_YOU_SURE, &DialogData::new()).await
        };

        match ctx.scheduler.create(text, Some(when), confirm_night).await {
            Ok(reminder) => {
                Self::announce_saved(ctx, &reminder);
                Ok(())
            }
            Err(ReminderError::NightTimeDeclined) => Ok(()),
            Err(ReminderError::InvalidTime) => {
                ctx.speak(NO_DATE_TIME, &DialogData::new());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn announce_saved(ctx: &IntentContext, reminder: &Reminder) {
        let local = ctx.local(&reminder.due_at);
        let time = nice_time(&local);

        match relative_day(local.date_naive(), ctx.today()) {
            RelativeDay::Today => ctx.speak(SAVING_REMINDER, &dialog_data([("timedate", time)])),
            RelativeDay::Tomorrow => {
                ctx.speak(SAVING_REMINDER_TOMORROW, &dialog_data([("timedate", time)]))
            }
            RelativeDay::Other => ctx.speak(
                SAVING_REMINDER_DATE,
                &dialog_data([("time", time), ("date", nice_date(local.date_naive()))]),
            ),
        }
        info!("Confirmed reminder '{}' at {}", reminder.text, local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Utterance;
    use crate::intents::context::testing::{harness, noon};
    use chrono::{Duration, Timelike};

    async fn run(h: &crate::intents::context::testing::Harness, intent: Intent) {
        RemindHandler.handle(Arc::clone(&h.ctx), &intent).await.unwrap();
    }

    #[tokio::test]
    async fn test_reminder_at_today() {
        let h = harness(&[]);
        run(
            &h,
            Intent::new("ReminderAt", "remind me to take out my trash at 6 pm")
                .with_slot("reminder", "take out my trash"),
        )
        .await;

        let pending = h.ctx.scheduler.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "take out your trash");
        assert_eq!(pending[0].due_at.hour(), 18);
        assert_eq!(
            h.notifier.calls(),
            vec![Utterance::Speak {
                dialog: "SavingReminder".to_string(),
                data: dialog_data([("timedate", "6:00 PM".to_string())]),
            }]
        );
    }

    #[tokio::test]
    async fn test_reminder_at_tomorrow_and_other_date() {
        let h = harness(&[]);
        run(
            &h,
            Intent::new("ReminderAt", "call bob tomorrow at 9 am").with_slot("reminder", "call bob"),
        )
        .await;
        run(
            &h,
            Intent::new("ReminderAt", "pay rent on monday").with_slot("reminder", "pay rent"),
        )
        .await;

        assert_eq!(
            h.notifier.dialogs(),
            vec!["SavingReminderTomorrow", "SavingReminderDate"]
        );
        assert_eq!(h.ctx.scheduler.pending().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reminder_at_without_time() {
        let h = harness(&[]);
        run(
            &h,
            Intent::new("ReminderAt", "remind me to stretch").with_slot("reminder", "stretch"),
        )
        .await;
        assert_eq!(h.notifier.dialogs(), vec!["NoDateTime"]);
        assert!(h.ctx.scheduler.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_night_reminder_declined_stores_nothing() {
        let h = harness(&[Some("no")]);
        run(
            &h,
            Intent::new("ReminderAt", "feed the cat tomorrow at 2 am")
                .with_slot("reminder", "feed the cat"),
        )
        .await;

        assert_eq!(h.notifier.dialogs(), vec!["ItIsNight"]);
        assert_eq!(h.prompter.asked(), vec!["AreYouSure"]);
        assert!(h.ctx.scheduler.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_night_reminder_confirmed() {
        let h = harness(&[Some("yes please")]);
        run(
            &h,
            Intent::new("ReminderAt", "feed the cat tomorrow at 2 am")
                .with_slot("reminder", "feed the cat"),
        )
        .await;

        assert_eq!(h.notifier.dialogs(), vec!["ItIsNight", "SavingReminderTomorrow"]);
        assert_eq!(h.ctx.scheduler.pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reminder_at_without_topic_asks_about_what() {
        let h = harness(&[Some("water the plants")]);
        run(
            &h,
            Intent::new("ReminderAt", "set a reminder in 10 minutes")
                .with_slot("timedate", "in 10 minutes"),
        )
        .await;

        assert_eq!(h.prompter.asked(), vec!["AboutWhat"]);
        let pending = h.ctx.scheduler.pending().unwrap();
        assert_eq!(pending[0].text, "water the plants");
        assert_eq!(pending[0].due_at, noon() + Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_unspecified_reminder_at_silence_stores_nothing() {
        let h = harness(&[None]);
        run(
            &h,
            Intent::new("UnspecifiedReminderAt", "remind me at 5 pm").with_slot("timedate", "at 5 pm"),
        )
        .await;
        assert!(h.ctx.scheduler.pending().unwrap().is_empty());
        assert!(h.notifier.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reminder_with_time_in_utterance_skips_question() {
        let h = harness(&[]);
        run(
            &h,
            Intent::new("Reminder", "remind me to call mom in 2 hours").with_slot("reminder", "call mom"),
        )
        .await;

        assert!(h.prompter.asked().is_empty());
        assert_eq!(
            h.ctx.scheduler.pending().unwrap()[0].due_at,
            noon() + Duration::hours(2)
        );
    }

    #[tokio::test]
    async fn test_reminder_answered_with_time() {
        let h = harness(&[Some("at 4 pm")]);
        run(
            &h,
            Intent::new("Reminder", "remind me to call mom").with_slot("reminder", "call mom"),
        )
        .await;

        assert_eq!(h.prompter.asked(), vec!["ParticularTime"]);
        assert_eq!(h.ctx.scheduler.pending().unwrap()[0].due_at.hour(), 16);
    }

    #[tokio::test]
    async fn test_reminder_yes_then_time() {
        let h = harness(&[Some("yes"), Some("in 30 minutes")]);
        run(
            &h,
            Intent::new("Reminder", "remind me to call mom").with_slot("reminder", "call mom"),
        )
        .await;

        assert_eq!(h.prompter.asked(), vec!["ParticularTime", "SpecifyTime"]);
        assert_eq!(
            h.ctx.scheduler.pending().unwrap()[0].due_at,
            noon() + Duration::minutes(30)
        );
    }

    #[tokio::test]
    async fn test_reminder_yes_then_nothing_is_fine() {
        let h = harness(&[Some("yes"), None]);
        run(
            &h,
            Intent::new("Reminder", "remind me to call mom").with_slot("reminder", "call mom"),
        )
        .await;

        assert_eq!(h.notifier.dialogs(), vec!["Fine"]);
        assert!(h.ctx.scheduler.pending().unwrap().is_empty());
        assert!(h.ctx.scheduler.list_unspecified().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reminder_no_time_wanted_is_unspecified() {
        let h = harness(&[Some("no")]);
        run(
            &h,
            Intent::new("Reminder", "remind me to buy my milk").with_slot("reminder", "buy my milk"),
        )
        .await;

        assert_eq!(h.notifier.dialogs(), vec!["Ok"]);
        assert_eq!(
            h.ctx.scheduler.list_unspecified().unwrap(),
            vec!["buy your milk".to_string()]
        );
    }

    #[tokio::test]
    async fn test_something_reminder_asks_topic_first() {
        let h = harness(&[Some("feed the fish"), Some("at 3 pm")]);
        run(&h, Intent::new("SomethingReminder", "remind me something")).await;

        assert_eq!(h.prompter.asked(), vec!["AboutWhat", "ParticularTime"]);
        let pending = h.ctx.scheduler.pending().unwrap();
        assert_eq!(pending[0].text, "feed the fish");
        assert_eq!(pending[0].due_at.hour(), 15);
    }

    #[tokio::test]
    async fn test_something_reminder_silence() {
        let h = harness(&[None]);
        run(&h, Intent::new("SomethingReminder", "remind me something")).await;
        assert_eq!(h.prompter.asked(), vec!["AboutWhat"]);
        assert!(h.notifier.calls().is_empty());
    }
}
