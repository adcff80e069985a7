//! Cancel, snooze and delete handlers
//!
//! Handles: CancelActiveReminder, SnoozeReminder, ClearReminders, DeleteReminderForDay
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::query::requested_day;
use crate::features::reminders::dialog::{
    date_str, CLEARED_ALL, CLEAR_ALL, CONFIRM_REMOVE_DAY, NO_ACTIVE, NO_REMINDERS_FOR_DATE,
    REMINDER_CANCELLED, REMINDING_IN_FIFTEEN,
};
use crate::host::{dialog_data, DialogData};
use crate::intents::context::IntentContext;
use crate::intents::handler::IntentHandler;
use crate::intents::Intent;

pub struct CancelHandler;

#[async_trait]
impl IntentHandler for CancelHandler {
    fn intent_names(&self) -> &'static [&'static str] {
        &[
            "CancelActiveReminder",
            "SnoozeReminder",
            "ClearReminders",
            "DeleteReminderForDay",
        ]
    }

    async fn handle(&self, ctx: Arc<IntentContext>, intent: &Intent) -> Result<()> {
        match intent.name.as_str() {
            "CancelActiveReminder" => Self::cancel_active(&ctx),
            "SnoozeReminder" => Self::snooze(&ctx),
            "ClearReminders" => Self::clear_all(&ctx).await,
            "DeleteReminderForDay" => Self::delete_for_day(&ctx, intent).await,
            _ => Ok(()),
        }
    }
}

impl CancelHandler {
    fn cancel_active(ctx: &IntentContext) -> Result<()> {
        if ctx.scheduler.cancel_active()? > 0 {
            ctx.speak(REMINDER_CANCELLED, &DialogData::new());
        } else {
            ctx.speak(NO_ACTIVE, &DialogData::new());
        }
        Ok(())
    }

    fn snooze(ctx: &IntentContext) -> Result<()> {
        let delay = ctx.scheduler.config().snooze_delay();
        let snoozed = ctx.scheduler.snooze_active(delay)?;
        if snoozed == 0 {
            ctx.speak(NO_ACTIVE, &DialogData::new());
        }
        for _ in 0..snoozed {
            ctx.speak(REMINDING_IN_FIFTEEN, &DialogData::new());
        }
        Ok(())
    }

    async fn clear_all(ctx: &IntentContext) -> Result<()> {
        if ctx.confirm(CLEAR_ALL, &DialogData::new()).await {
            ctx.scheduler.clear_all()?;
            ctx.speak(CLEARED_ALL, &DialogData::new());
        }
        Ok(())
    }

    async fn delete_for_day(ctx: &IntentContext, intent: &Intent) -> Result<()> {
        let day = requested_day(ctx, intent);
        let data = dialog_data([("date", date_str(day, ctx.today(), &ctx.vocabulary))]);

        if ctx.scheduler.list_for_day(day)?.is_empty() {
            ctx.speak(NO_REMINDERS_FOR_DATE, &data);
            return Ok(());
        }

        if ctx.confirm(CONFIRM_REMOVE_DAY, &data).await {
            let removed = ctx.scheduler.remove_for_day(day)?;
            info!("User removed {} reminder(s) on {}", removed, day);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Utterance;
    use crate::intents::context::testing::{harness, noon, Harness};
    use chrono::Duration;

    async fn run(h: &Harness, name: &str, utterance: &str) {
        CancelHandler
            .handle(Arc::clone(&h.ctx), &Intent::new(name, utterance))
            .await
            .unwrap();
    }

    /// Two reminders that have fired once and are now cancellable
    fn fire_two(h: &Harness) {
        let scheduler = &h.ctx.scheduler;
        scheduler.insert("stretch", noon()).unwrap();
        scheduler.insert("drink water", noon()).unwrap();
        scheduler.insert("later", noon() + Duration::hours(3)).unwrap();
        scheduler.due_check(noon()).unwrap();
    }

    #[tokio::test]
    async fn test_cancel_active() {
        let h = harness(&[]);
        fire_two(&h);

        run(&h, "CancelActiveReminder", "cancel reminder").await;
        run(&h, "CancelActiveReminder", "cancel reminder").await;

        assert_eq!(h.notifier.dialogs(), vec!["ReminderCancelled", "NoActive"]);
        let pending = h.ctx.scheduler.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "later");
    }

    #[tokio::test]
    async fn test_snooze_speaks_once_per_reminder() {
        let h = harness(&[]);
        fire_two(&h);
        h.clock.advance(Duration::minutes(1));

        run(&h, "SnoozeReminder", "snooze").await;

        assert_eq!(
            h.notifier.dialogs(),
            vec!["RemindingInFifteen", "RemindingInFifteen"]
        );
        assert!(h.ctx.scheduler.cancellable().is_empty());
        let expected = noon() + Duration::minutes(16);
        for reminder in h.ctx.scheduler.pending().unwrap() {
            if reminder.text != "later" {
                assert_eq!(reminder.due_at, expected);
                assert_eq!(reminder.repeat_count, 0);
            }
        }
    }

    #[tokio::test]
    async fn test_snooze_without_active() {
        let h = harness(&[]);
        run(&h, "SnoozeReminder", "snooze").await;
        assert_eq!(h.notifier.dialogs(), vec!["NoActive"]);
    }

    #[tokio::test]
    async fn test_clear_all_requires_yes() {
        let h = harness(&[Some("no"), Some("yes")]);
        fire_two(&h);

        run(&h, "ClearReminders", "clear all reminders").await;
        assert_eq!(h.ctx.scheduler.pending().unwrap().len(), 3);

        run(&h, "ClearReminders", "clear all reminders").await;
        assert!(h.ctx.scheduler.pending().unwrap().is_empty());
        assert!(h.ctx.scheduler.cancellable().is_empty());
        assert_eq!(h.notifier.dialogs(), vec!["ClearedAll"]);
        assert_eq!(h.prompter.asked(), vec!["ClearAll", "ClearAll"]);
    }

    #[tokio::test]
    async fn test_delete_for_day_with_nothing_there() {
        let h = harness(&[]);
        run(&h, "DeleteReminderForDay", "delete my reminders for tomorrow").await;

        assert_eq!(
            h.notifier.calls(),
            vec![Utterance::Speak {
                dialog: "NoRemindersForDate".to_string(),
                data: dialog_data([("date", "tomorrow".to_string())]),
            }]
        );
        assert!(h.prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn test_delete_for_day_confirmed() {
        let h = harness(&[Some("yes")]);
        let scheduler = &h.ctx.scheduler;
        scheduler.insert("today", noon() + Duration::hours(2)).unwrap();
        scheduler.insert("tomorrow", noon() + Duration::days(1)).unwrap();

        run(&h, "DeleteReminderForDay", "delete reminders for today").await;

        assert_eq!(h.prompter.asked(), vec!["ConfirmRemoveDay"]);
        let pending = scheduler.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "tomorrow");
    }

    #[tokio::test]
    async fn test_delete_for_day_declined() {
        let h = harness(&[None]);
        h.ctx
            .scheduler
            .insert("today", noon() + Duration::hours(2))
            .unwrap();

        run(&h, "DeleteReminderForDay", "delete reminders for today").await;
        assert_eq!(h.ctx.scheduler.pending().unwrap().len(), 1);
    }
}
