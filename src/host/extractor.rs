//! # Time Extraction
//!
//! Natural-language date/time extraction is the host's job; this module holds
//! the trait the skill consumes plus a small English extractor that covers the
//! phrasings a console session needs ("in 20 minutes", "at 6 pm",
//! "tomorrow at 8:30", "on friday", "in 1h30m").
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Compact duration tokens (`1h30m`) and weekday names
//! - 1.0.0: Initial release

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};
use log::debug;
use regex::Regex;

/// A resolved time plus whatever text the extractor did not consume
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub when: DateTime<FixedOffset>,
    pub leftover: String,
}

/// Parses date/time phrases relative to a reference time
pub trait TimeExtractor: Send + Sync {
    fn extract(
        &self,
        utterance: &str,
        reference: DateTime<FixedOffset>,
        lang: &str,
    ) -> Option<Extracted>;
}

/// Lowercase, strip trailing punctuation and collapse whitespace
pub fn normalize(utterance: &str) -> String {
    utterance
        .split_whitespace()
        .map(|w| w.trim_end_matches(|c: char| matches!(c, ',' | '?' | '!' | ';')))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .trim_end_matches('.')
        .to_string()
}

/// Run the extractor, treating "leftover equals the normalized input" as nothing found
pub fn extract_datetime(
    extractor: &dyn TimeExtractor,
    utterance: &str,
    reference: DateTime<FixedOffset>,
    lang: &str,
) -> Option<DateTime<FixedOffset>> {
    let extracted = extractor.extract(utterance, reference, lang)?;
    if extracted.leftover == normalize(utterance) {
        debug!("Extractor consumed nothing from '{}'", utterance);
        return None;
    }
    Some(extracted.when)
}

pub fn contains_datetime(
    extractor: &dyn TimeExtractor,
    utterance: &str,
    reference: DateTime<FixedOffset>,
    lang: &str,
) -> bool {
    extract_datetime(extractor, utterance, reference, lang).is_some()
}

/// Parse a compact duration like `30m`, `2h` or `1h30m` into seconds
pub fn parse_duration(input: &str) -> Option<i64> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 60 * 60 * 24,
                'w' => 60 * 60 * 24 * 7,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(value.checked_mul(unit)?)?;
        } else {
            return None;
        }
    }

    // Trailing digits without a unit
    if !current_number.is_empty() {
        return None;
    }

    if total_seconds > 0 {
        Some(total_seconds)
    } else {
        None
    }
}

fn word_number(word: &str) -> Option<i64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "fifteen" => 15,
        "twenty" => 20,
        "thirty" => 30,
        other => other.parse().ok()?,
    };
    Some(n)
}

fn unit_seconds(unit: &str) -> i64 {
    match unit {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        _ => 60 * 60 * 24 * 7,
    }
}

fn weekday_index(name: &str) -> Option<u32> {
    let idx = match name {
        "monday" => 0,
        "tuesday" => 1,
        "wednesday" => 2,
        "thursday" => 3,
        "friday" => 4,
        "saturday" => 5,
        "sunday" => 6,
        _ => return None,
    };
    Some(idx)
}

/// English extractor for relative durations, clock times and day words
pub struct SimpleTimeExtractor {
    default_hour: u32,
    compact: Regex,
    relative: Regex,
    clock: Regex,
    named_time: Regex,
    day_word: Regex,
    weekday: Regex,
}

impl SimpleTimeExtractor {
    pub fn new(default_hour: u32) -> Result<Self, regex::Error> {
        Ok(Self {
            default_hour,
            compact: Regex::new(r"\bin\s+((?:\d+[smhdw])+)\b")?,
            relative: Regex::new(
                r"\bin\s+(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|fifteen|twenty|thirty)\s+(second|minute|hour|day|week)s?\b",
            )?,
            clock: Regex::new(r"\bat\s+(\d{1,2})(?::(\d{2}))?(?:\s*(a\.?m\.?|p\.?m\.?))?")?,
            named_time: Regex::new(r"\b(?:at\s+)?(noon|midnight)\b")?,
            day_word: Regex::new(r"\b(today|tonight|tomorrow)\b")?,
            weekday: Regex::new(
                r"\b(?:on\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            )?,
        })
    }

    fn at(
        reference: DateTime<FixedOffset>,
        date: NaiveDate,
        hour: u32,
        minute: u32,
    ) -> Option<DateTime<FixedOffset>> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        reference.timezone().from_local_datetime(&naive).single()
    }

    fn leftover(text: &str, spans: &[(usize, usize)]) -> String {
        let mut spans = spans.to_vec();
        spans.sort();
        let mut out = String::new();
        let mut pos = 0;
        for (start, end) in spans {
            if start >= pos {
                out.push_str(&text[pos..start]);
                pos = end;
            }
        }
        out.push_str(&text[pos..]);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn extract_relative(
        &self,
        text: &str,
        reference: DateTime<FixedOffset>,
    ) -> Option<(DateTime<FixedOffset>, (usize, usize))> {
        if let Some(caps) = self.compact.captures(text) {
            if let Some(seconds) = parse_duration(&caps[1]) {
                let m = caps.get(0)?;
                return Some((Self::offset_by(reference, seconds)?, (m.start(), m.end())));
            }
        }

        let caps = self.relative.captures(text)?;
        let amount = word_number(&caps[1])?;
        let m = caps.get(0)?;
        let seconds = amount.checked_mul(unit_seconds(&caps[2]))?;
        Some((Self::offset_by(reference, seconds)?, (m.start(), m.end())))
    }

    /// `None` when the result falls outside the representable range
    fn offset_by(reference: DateTime<FixedOffset>, seconds: i64) -> Option<DateTime<FixedOffset>> {
        reference.checked_add_signed(Duration::try_seconds(seconds)?)
    }
}

impl TimeExtractor for SimpleTimeExtractor {
    fn extract(
        &self,
        utterance: &str,
        reference: DateTime<FixedOffset>,
        lang: &str,
    ) -> Option<Extracted> {
        if !lang.to_lowercase().starts_with("en") {
            debug!("SimpleTimeExtractor has no support for '{}'", lang);
            return None;
        }

        let text = normalize(utterance);

        if let Some((when, span)) = self.extract_relative(&text, reference) {
            return Some(Extracted {
                when,
                leftover: Self::leftover(&text, &[span]),
            });
        }

        let mut spans = Vec::new();
        let today = reference.date_naive();
        let mut date = None;
        let mut evening = false;

        if let Some(m) = self.day_word.find(&text) {
            date = match m.as_str() {
                "tomorrow" => today.succ_opt(),
                "tonight" => {
                    evening = true;
                    Some(today)
                }
                _ => Some(today),
            };
            spans.push((m.start(), m.end()));
        } else if let Some(caps) = self.weekday.captures(&text) {
            let target = weekday_index(&caps[1])?;
            let current = today.weekday().num_days_from_monday();
            let mut ahead = (7 + target - current) % 7;
            if ahead == 0 {
                ahead = 7;
            }
            date = Some(today + Duration::days(ahead as i64));
            let m = caps.get(0)?;
            spans.push((m.start(), m.end()));
        }

        let mut time = None;
        let mut meridiem = false;
        if let Some(caps) = self.named_time.captures(&text) {
            time = Some(if &caps[1] == "noon" { (12, 0) } else { (0, 0) });
            meridiem = true;
            let m = caps.get(0)?;
            spans.push((m.start(), m.end()));
        } else if let Some(caps) = self.clock.captures(&text) {
            let mut hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
            if let Some(suffix) = caps.get(3) {
                meridiem = true;
                hour %= 12;
                if suffix.as_str().starts_with('p') {
                    hour += 12;
                }
            }
            if hour < 24 && minute < 60 {
                time = Some((hour, minute));
                let m = caps.get(0)?;
                spans.push((m.start(), m.end()));
            }
        }

        if date.is_none() && time.is_none() {
            return None;
        }

        let (mut hour, minute) = time.unwrap_or((if evening { 20 } else { self.default_hour }, 0));
        if evening && !meridiem && hour < 12 {
            hour += 12;
        }

        let when = match date {
            Some(day) => Self::at(reference, day, hour, minute)?,
            None => {
                let candidate = Self::at(reference, today, hour, minute)?;
                if candidate > reference {
                    candidate
                } else if !meridiem && hour < 12 && Self::at(reference, today, hour + 12, minute)? > reference {
                    Self::at(reference, today, hour + 12, minute)?
                } else {
                    candidate + Duration::days(1)
                }
            }
        };

        Some(Extracted {
            when,
            leftover: Self::leftover(&text, &spans),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn reference() -> DateTime<FixedOffset> {
        // Wednesday
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(30));
        assert_eq!(parse_duration("30m"), Some(1800));
        assert_eq!(parse_duration("2h"), Some(7200));
        assert_eq!(parse_duration("1d"), Some(86400));
        assert_eq!(parse_duration("1w"), Some(604800));
        assert_eq!(parse_duration("1h30m"), Some(5400));
        assert_eq!(parse_duration("invalid"), None);
        assert_eq!(parse_duration("15"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("99999999999999w"), None);
        assert_eq!(parse_duration("9223372036854775807s1s"), None);
    }

    #[test]
    fn test_out_of_range_durations_extract_nothing() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        assert!(ex
            .extract("remind me to x in 99999999999 days", reference(), "en-us")
            .is_none());
        assert!(ex
            .extract("remind me to x in 99999999999999w", reference(), "en-us")
            .is_none());
        assert!(ex
            .extract("in 99999999999999999999 hours", reference(), "en-us")
            .is_none());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Remind me,  to CALL mom!  "), "remind me to call mom");
        assert_eq!(normalize("at 6 p.m."), "at 6 p.m");
    }

    #[test]
    fn test_relative_minutes() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex
            .extract("remind me to stretch in 20 minutes", reference(), "en-us")
            .unwrap();
        assert_eq!(got.when, reference() + Duration::minutes(20));
        assert_eq!(got.leftover, "remind me to stretch");
    }

    #[test]
    fn test_relative_word_and_compact() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let hour = ex.extract("in an hour", reference(), "en").unwrap();
        assert_eq!(hour.when, reference() + Duration::hours(1));

        let compact = ex.extract("ping me in 1h30m", reference(), "en").unwrap();
        assert_eq!(compact.when, reference() + Duration::minutes(90));
    }

    #[test]
    fn test_clock_time_with_meridiem() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex.extract("take out trash at 6 pm", reference(), "en-us").unwrap();
        assert_eq!(got.when.date_naive(), reference().date_naive());
        assert_eq!((got.when.hour(), got.when.minute()), (18, 0));
        assert_eq!(got.leftover, "take out trash");
        assert_eq!(got.when.offset(), reference().offset());
    }

    #[test]
    fn test_past_clock_time_without_meridiem_moves_to_afternoon() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex.extract("call bob at 9:15", reference(), "en-us").unwrap();
        assert_eq!((got.when.hour(), got.when.minute()), (21, 15));
        assert_eq!(got.when.date_naive(), reference().date_naive());
    }

    #[test]
    fn test_past_clock_time_with_meridiem_rolls_to_tomorrow() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex.extract("at 9 am", reference(), "en-us").unwrap();
        assert_eq!(got.when.hour(), 9);
        assert_eq!(got.when.date_naive(), reference().date_naive().succ_opt().unwrap());
    }

    #[test]
    fn test_tomorrow_uses_default_hour() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex.extract("water plants tomorrow", reference(), "en-us").unwrap();
        assert_eq!(got.when.hour(), 8);
        assert_eq!(got.when.date_naive(), reference().date_naive().succ_opt().unwrap());
        assert_eq!(got.leftover, "water plants");
    }

    #[test]
    fn test_weekday_is_next_occurrence() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let friday = ex.extract("on friday at noon", reference(), "en-us").unwrap();
        assert_eq!(friday.when.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(friday.when.hour(), 12);

        let wednesday = ex.extract("on wednesday", reference(), "en-us").unwrap();
        assert_eq!(wednesday.when.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    }

    #[test]
    fn test_tonight_is_evening() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        let got = ex.extract("tonight at 9", reference(), "en-us").unwrap();
        assert_eq!(got.when.hour(), 21);
    }

    #[test]
    fn test_nothing_extracted() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        assert!(ex.extract("buy milk", reference(), "en-us").is_none());
        assert!(!contains_datetime(&ex, "buy milk", reference(), "en-us"));
        assert!(contains_datetime(&ex, "buy milk at 5 pm", reference(), "en-us"));
    }

    #[test]
    fn test_unsupported_language() {
        let ex = SimpleTimeExtractor::new(8).unwrap();
        assert!(ex.extract("in 5 minutes", reference(), "ar").is_none());
    }

    struct EchoExtractor;

    impl TimeExtractor for EchoExtractor {
        fn extract(
            &self,
            utterance: &str,
            reference: DateTime<FixedOffset>,
            _lang: &str,
        ) -> Option<Extracted> {
            Some(Extracted {
                when: reference,
                leftover: normalize(utterance),
            })
        }
    }

    #[test]
    fn test_unchanged_leftover_counts_as_nothing() {
        assert!(extract_datetime(&EchoExtractor, "Buy milk", reference(), "en-us").is_none());
    }
}
