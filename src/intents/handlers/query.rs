//! Reminder listing handlers
//!
//! Handles: GetRemindersForDay, GetNextReminders
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::features::reminders::dialog::{
    nice_date, nice_time, relative_day, RelativeDay, NEXT_OTHER_DATE, NEXT_TODAY, NEXT_TOMORROW,
    NO_UPCOMING, REMINDER_AT_TIME,
};
use crate::host::{dialog_data, DialogData};
use crate::intents::context::IntentContext;
use crate::intents::handler::IntentHandler;
use crate::intents::Intent;

/// Day named by the `date` slot or the utterance, defaulting to today
pub(crate) fn requested_day(ctx: &IntentContext, intent: &Intent) -> NaiveDate {
    let phrase = intent.slot("date").unwrap_or(&intent.utterance);
    ctx.extract(phrase)
        .map(|when| ctx.local_date(&when))
        .unwrap_or_else(|| ctx.today())
}

pub struct QueryHandler;

#[async_trait]
impl IntentHandler for QueryHandler {
    fn intent_names(&self) -> &'static [&'static str] {
        &["GetRemindersForDay", "GetNextReminders"]
    }

    async fn handle(&self, ctx: Arc<IntentContext>, intent: &Intent) -> Result<()> {
        match intent.name.as_str() {
            "GetRemindersForDay" => Self::reminders_for_day(&ctx, intent),
            "GetNextReminders" => Self::next_reminder(&ctx),
            _ => Ok(()),
        }
    }
}

impl QueryHandler {
    fn reminders_for_day(ctx: &IntentContext, intent: &Intent) -> Result<()> {
        let day = requested_day(ctx, intent);
        let reminders = ctx.scheduler.list_for_day(day)?;

        if reminders.is_empty() {
            ctx.speak(NO_UPCOMING, &DialogData::new());
            return Ok(());
        }

        for reminder in reminders {
            let time = nice_time(&ctx.local(&reminder.due_at));
            ctx.speak(
                REMINDER_AT_TIME,
                &dialog_data([("reminder", reminder.text), ("time", time)]),
            );
        }
        Ok(())
    }

    fn next_reminder(ctx: &IntentContext) -> Result<()> {
        let Some(next) = ctx.scheduler.next_reminder()? else {
            ctx.speak(NO_UPCOMING, &DialogData::new());
            return Ok(());
        };

        let local = ctx.local(&next.due_at);
        let time = nice_time(&local);
        match relative_day(local.date_naive(), ctx.today()) {
            RelativeDay::Today => ctx.speak(
                NEXT_TODAY,
                &dialog_data([("time", time), ("reminder", next.text)]),
            ),
            RelativeDay::Tomorrow => ctx.speak(
                NEXT_TOMORROW,
                &dialog_data([("time", time), ("reminder", next.text)]),
            ),
            RelativeDay::Other => ctx.speak(
                NEXT_OTHER_DATE,
                &dialog_data([
                    ("time", time),
                    ("date", nice_date(local.date_naive())),
                    ("reminder", next.text),
                ]),
            ),
        }
        Ok(())
    }
}
