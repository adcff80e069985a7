//! Dialog names and the date/time phrasing the skill hands to the notifier

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::core::Vocabulary;

pub const REMINDING: &str = "Reminding";
pub const TO_CANCEL_INSTRUCTIONS: &str = "ToCancelInstructions";
pub const BY_THE_WAY: &str = "ByTheWay";
pub const SAVING_REMINDER: &str = "SavingReminder";
pub const SAVING_REMINDER_TOMORROW: &str = "SavingReminderTomorrow";
pub const SAVING_REMINDER_DATE: &str = "SavingReminderDate";
pub const NO_DATE_TIME: &str = "NoDateTime";
pub const IT_IS_NIGHT: &str = "ItIsNight";
pub const ARE_YOU_SURE: &str = "AreYouSure";
pub const OK: &str = "Ok";
pub const PARTICULAR_TIME: &str = "ParticularTime";
pub const SPECIFY_TIME: &str = "SpecifyTime";
pub const FINE: &str = "Fine";
pub const ABOUT_WHAT: &str = "AboutWhat";
pub const NO_REMINDERS_FOR_DATE: &str = "NoRemindersForDate";
pub const CONFIRM_REMOVE_DAY: &str = "ConfirmRemoveDay";
pub const REMINDER_AT_TIME: &str = "ReminderAtTime";
pub const NO_UPCOMING: &str = "NoUpcoming";
pub const NEXT_TODAY: &str = "NextToday";
pub const NEXT_TOMORROW: &str = "NextTomorrow";
pub const NEXT_OTHER_DATE: &str = "NextOtherDate";
pub const REMINDER_CANCELLED: &str = "ReminderCancelled";
pub const NO_ACTIVE: &str = "NoActive";
pub const REMINDING_IN_FIFTEEN: &str = "RemindingInFifteen";
pub const CLEAR_ALL: &str = "ClearAll";
pub const CLEARED_ALL: &str = "ClearedAll";

/// How a date relates to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    Other,
}

pub fn relative_day(date: NaiveDate, today: NaiveDate) -> RelativeDay {
    if date == today {
        RelativeDay::Today
    } else if Some(date) == today.succ_opt() {
        RelativeDay::Tomorrow
    } else {
        RelativeDay::Other
    }
}

/// Spoken time of day, e.g. "6:05 PM"
pub fn nice_time(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%-I:%M %p").to_string()
}

/// Spoken date, e.g. "Thursday, March 7"
pub fn nice_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// "today", "tomorrow" or the spoken date
pub fn date_str(date: NaiveDate, today: NaiveDate, vocabulary: &Vocabulary) -> String {
    match relative_day(date, today) {
        RelativeDay::Today => vocabulary.today.clone(),
        RelativeDay::Tomorrow => vocabulary.tomorrow.clone(),
        RelativeDay::Other => nice_date(date),
    }
}
