//! Best-effort recognition of a meeting date and time inside free text.
//!
//! The extractor scans for date phrases ("tomorrow", "next Monday",
//! "March 3rd", "2026-11-02", "10/25", "in 2 weeks") and time phrases
//! ("3pm", "10:30 a.m.", "15:00", "noon", "at 4"). The earliest date phrase in
//! the text is combined with the earliest time phrase in the text. Phrases are
//! resolved in the configured timezone against the current instant.
//!
//! When a phrase could mean a past or a future instant (a weekday, a month and
//! day without a year, a bare time), the future reading is always chosen.
//! Explicit phrases ("today", a date with a year) are taken as written.

use crate::utils::time::local_instant;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Time of day used when a date phrase carries no time
pub const DEFAULT_MEETING_TIME: (u32, u32) = (9, 0);

/// Time of day used for "tonight" without an explicit time
pub const TONIGHT_TIME: (u32, u32) = (19, 0);

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

/// A resolved meeting time found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDateTime {
    /// Absolute start instant
    pub start: DateTime<Utc>,
    /// The phrase(s) the instant was read from
    pub phrase: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateKind {
    /// Days from today ("today", "tomorrow", "in 3 days")
    Offset { days: i64, tonight: bool },
    Weekday { day: Weekday, next: bool },
    /// A date with an explicit year
    Absolute(NaiveDate),
    /// Month and day without a year
    MonthDay { month: u32, day: u32 },
}

#[derive(Debug, Clone)]
struct DateMatch {
    start: usize,
    text: String,
    kind: DateKind,
    time: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
struct TimeMatch {
    start: usize,
    // Lower wins when two phrases begin at the same offset
    rank: u8,
    text: String,
    time: NaiveTime,
}

struct Patterns {
    relative: Regex,
    in_days: Regex,
    weekday: Regex,
    iso: Regex,
    month_first: Regex,
    day_first: Regex,
    numeric: Regex,
    am_pm: Regex,
    clock: Regex,
    named: Regex,
    at_hour: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            relative: Regex::new(r"(?i)\b(day after tomorrow|today|tonight|tomorrow)\b").unwrap(),
            in_days: Regex::new(r"(?i)\bin\s+(\d{1,3}|an?|one|two|three|four|five|six|seven)\s+(days?|weeks?)\b")
                .unwrap(),
            weekday: Regex::new(
                r"(?i)\b(?:(next|this|on)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday|tues|tue|thurs|thur|thu|fri)\b",
            )
            .unwrap(),
            iso: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ](\d{1,2}):(\d{2}))?\b").unwrap(),
            month_first: Regex::new(&format!(
                r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
            ))
            .unwrap(),
            day_first: Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
            ))
            .unwrap(),
            numeric: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap(),
            am_pm: Regex::new(r"(?i)\b(\d{1,2})(?:[:.](\d{2}))?\s*([ap])\.?m\b\.?").unwrap(),
            clock: Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap(),
            named: Regex::new(r"(?i)\b(noon|midday|midnight)\b").unwrap(),
            at_hour: Regex::new(r"(?i)\bat\s+(\d{1,2})(?:[:.](\d{2}))?\b").unwrap(),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

/// Finds the single best meeting time in a piece of text
#[derive(Debug, Clone)]
pub struct DateTimeExtractor {
    timezone: Tz,
}

impl DateTimeExtractor {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Extract relative to the current instant
    pub fn extract(&self, text: &str) -> Option<CandidateDateTime> {
        self.extract_at(text, Utc::now())
    }

    /// Extract relative to `now`; `None` when the text holds no usable phrase
    pub fn extract_at(&self, text: &str, now: DateTime<Utc>) -> Option<CandidateDateTime> {
        if text.trim().is_empty() {
            return None;
        }

        let date = find_dates(text).into_iter().min_by_key(|d| d.start);
        let time = find_times(text).into_iter().min_by_key(|t| (t.start, t.rank));

        let (start, phrase) = match (date, time) {
            (Some(date), time) => {
                let explicit = date.time.or(time.as_ref().map(|t| t.time));
                let start = self.resolve_date(&date, explicit, now)?;
                let phrase = match (&date.time, &time) {
                    (None, Some(t)) => format!("{} {}", date.text, t.text),
                    _ => date.text.clone(),
                };
                (start, phrase)
            }
            (None, Some(time)) => (self.resolve_time_only(time.time, now)?, time.text),
            (None, None) => return None,
        };

        Some(CandidateDateTime { start, phrase })
    }

    fn resolve_date(
        &self,
        date: &DateMatch,
        explicit_time: Option<NaiveTime>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let default_time = match date.kind {
            DateKind::Offset { tonight: true, .. } => hm(TONIGHT_TIME),
            _ => hm(DEFAULT_MEETING_TIME),
        };
        let time = explicit_time.unwrap_or(default_time);
        let at = |day: NaiveDate| local_instant(&self.timezone, day, time);

        match date.kind {
            DateKind::Offset { days, .. } => at(today.checked_add_signed(Duration::days(days))?),
            DateKind::Absolute(day) => at(day),
            DateKind::Weekday { day, next } => {
                let ahead = (day.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
                let ahead = if ahead == 0 {
                    match at(today) {
                        Some(instant) if !next && instant > now => 0,
                        _ => 7,
                    }
                } else {
                    ahead
                };
                at(today + Duration::days(i64::from(ahead)))
            }
            DateKind::MonthDay { month, day } => {
                // Feb 29 may need several years to come around
                (today.year()..today.year() + 8)
                    .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
                    .filter_map(at)
                    .find(|instant| *instant > now)
            }
        }
    }

    fn resolve_time_only(&self, time: NaiveTime, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let candidate = local_instant(&self.timezone, today, time)?;
        if candidate > now {
            Some(candidate)
        } else {
            local_instant(&self.timezone, today + Duration::days(1), time)
        }
    }
}

fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn find_dates(text: &str) -> Vec<DateMatch> {
    let p = patterns();
    let mut found = Vec::new();

    for caps in p.relative.captures_iter(text) {
        let word = caps[1].to_ascii_lowercase();
        let (days, tonight) = match word.as_str() {
            "today" => (0, false),
            "tonight" => (0, true),
            "tomorrow" => (1, false),
            _ => (2, false),
        };
        push_date(&mut found, &caps, DateKind::Offset { days, tonight }, None);
    }

    for caps in p.in_days.captures_iter(text) {
        let Some(count) = number_word(&caps[1]) else { continue };
        let unit = if caps[2].to_ascii_lowercase().starts_with("week") { 7 } else { 1 };
        push_date(&mut found, &caps, DateKind::Offset { days: count * unit, tonight: false }, None);
    }

    for caps in p.weekday.captures_iter(text) {
        let Some(day) = weekday(&caps[2]) else { continue };
        let next = caps
            .get(1)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("next"));
        push_date(&mut found, &caps, DateKind::Weekday { day, next }, None);
    }

    for caps in p.iso.captures_iter(text) {
        let (Ok(year), Ok(month), Ok(day)) = (caps[1].parse::<i32>(), caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
            continue;
        };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else { continue };
        let time = match (caps.get(4), caps.get(5)) {
            (Some(h), Some(m)) => {
                let Some(t) = clock_time(h.as_str(), m.as_str()) else { continue };
                Some(t)
            }
            _ => None,
        };
        push_date(&mut found, &caps, DateKind::Absolute(date), time);
    }

    for caps in p.month_first.captures_iter(text) {
        let (Some(month), Ok(day)) = (month_number(&caps[1]), caps[2].parse::<u32>()) else { continue };
        if let Some(kind) = calendar_date(month, day, caps.get(3).map(|m| m.as_str())) {
            push_date(&mut found, &caps, kind, None);
        }
    }

    for caps in p.day_first.captures_iter(text) {
        let (Ok(day), Some(month)) = (caps[1].parse::<u32>(), month_number(&caps[2])) else { continue };
        if let Some(kind) = calendar_date(month, day, caps.get(3).map(|m| m.as_str())) {
            push_date(&mut found, &caps, kind, None);
        }
    }

    // Month first, as in 10/25
    for caps in p.numeric.captures_iter(text) {
        let (Ok(month), Ok(day)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else { continue };
        if let Some(kind) = calendar_date(month, day, caps.get(3).map(|m| m.as_str())) {
            push_date(&mut found, &caps, kind, None);
        }
    }

    found
}

fn push_date(found: &mut Vec<DateMatch>, caps: &Captures<'_>, kind: DateKind, time: Option<NaiveTime>) {
    let whole = &caps[0];
    found.push(DateMatch {
        start: caps.get(0).map_or(0, |m| m.start()),
        text: whole.trim().to_string(),
        kind,
        time,
    });
}

fn find_times(text: &str) -> Vec<TimeMatch> {
    let p = patterns();
    let mut found = Vec::new();

    for caps in p.am_pm.captures_iter(text) {
        let Ok(hour) = caps[1].parse::<u32>() else { continue };
        let minute = caps.get(2).map_or(Ok(0), |m| m.as_str().parse::<u32>());
        let Ok(minute) = minute else { continue };
        if !(1..=12).contains(&hour) || minute > 59 {
            continue;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        push_time(&mut found, &caps, 0, 0, hour, minute);
    }

    for caps in p.clock.captures_iter(text) {
        let Some(time) = clock_time(&caps[1], &caps[2]) else { continue };
        push_time(&mut found, &caps, 0, 2, time.hour(), time.minute());
    }

    for caps in p.named.captures_iter(text) {
        let hour = if caps[1].eq_ignore_ascii_case("midnight") { 0 } else { 12 };
        push_time(&mut found, &caps, 0, 2, hour, 0);
    }

    // "at 3" and "at 4:30" carry no am/pm; small hours are read as afternoon
    // meetings. Outranks the plain clock reading of the same digits.
    for caps in p.at_hour.captures_iter(text) {
        let Ok(hour) = caps[1].parse::<u32>() else { continue };
        let minute = caps.get(2).map_or(Ok(0), |m| m.as_str().parse::<u32>());
        let Ok(minute) = minute else { continue };
        if hour > 23 || minute > 59 {
            continue;
        }
        let hour = if (1..=7).contains(&hour) { hour + 12 } else { hour };
        push_time(&mut found, &caps, 1, 1, hour, minute);
    }

    found
}

fn push_time(found: &mut Vec<TimeMatch>, caps: &Captures<'_>, group: usize, rank: u8, hour: u32, minute: u32) {
    let (Some(anchor), Some(time)) = (caps.get(group), NaiveTime::from_hms_opt(hour, minute, 0)) else {
        return;
    };
    found.push(TimeMatch {
        start: anchor.start(),
        rank,
        text: caps[0].trim().to_string(),
        time,
    });
}

fn clock_time(hour: &str, minute: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

fn calendar_date(month: u32, day: u32, year: Option<&str>) -> Option<DateKind> {
    match year {
        Some(raw) => {
            let year: i32 = raw.parse().ok()?;
            let year = if raw.len() == 2 { 2000 + year } else { year };
            NaiveDate::from_ymd_opt(year, month, day).map(DateKind::Absolute)
        }
        // 2000 is a leap year, so Feb 29 passes here
        None => NaiveDate::from_ymd_opt(2000, month, day).map(|_| DateKind::MonthDay { month, day }),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday(name: &str) -> Option<Weekday> {
    let day = match name.to_ascii_lowercase().get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn number_word(word: &str) -> Option<i64> {
    let n = match word.to_ascii_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Monday 2026-10-19 10:00 UTC
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    fn utc() -> DateTimeExtractor {
        DateTimeExtractor::new(Tz::UTC)
    }

    fn start_of(text: &str) -> Option<String> {
        utc()
            .extract_at(text, now())
            .map(|c| c.start.format("%Y-%m-%d %H:%M").to_string())
    }

    #[test]
    fn test_no_date_found() {
        assert_eq!(start_of(""), None);
        assert_eq!(start_of("   \n"), None);
        assert_eq!(start_of("Please review the attached budget."), None);
        assert_eq!(start_of("Version 3 of the doc, 42 comments"), None);
    }

    #[test]
    fn test_tomorrow_at_three() {
        let found = utc()
            .extract_at("Let's meet tomorrow at 3pm to discuss the budget.", now())
            .unwrap();
        assert_eq!(found.start, Utc.with_ymd_and_hms(2026, 10, 20, 15, 0, 0).unwrap());
        assert_eq!(found.phrase, "tomorrow 3pm");
    }

    #[test]
    fn test_resolves_in_display_timezone() {
        let helsinki = DateTimeExtractor::new("Europe/Helsinki".parse().unwrap());
        let found = helsinki.extract_at("tomorrow at 3pm", now()).unwrap();
        assert_eq!(found.start, Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_weekdays_prefer_future() {
        // Today is Monday; 9am has already passed
        assert_eq!(start_of("Monday at 9am").as_deref(), Some("2026-10-26 09:00"));
        assert_eq!(start_of("Monday at 4pm").as_deref(), Some("2026-10-19 16:00"));
        assert_eq!(start_of("next Monday").as_deref(), Some("2026-10-26 09:00"));
        assert_eq!(start_of("see you on Friday 10:30").as_deref(), Some("2026-10-23 10:30"));
        assert_eq!(start_of("Thurs 2 p.m. works").as_deref(), Some("2026-10-22 14:00"));
    }

    #[test]
    fn test_month_day_rolls_to_next_year() {
        assert_eq!(start_of("Kickoff on March 3rd").as_deref(), Some("2027-03-03 09:00"));
        assert_eq!(start_of("the 5th of November at 3 p.m.").as_deref(), Some("2026-11-05 15:00"));
        assert_eq!(start_of("10/25 at noon").as_deref(), Some("2026-10-25 12:00"));
    }

    #[test]
    fn test_explicit_year_is_kept() {
        assert_eq!(start_of("December 1st, 2025").as_deref(), Some("2025-12-01 09:00"));
        assert_eq!(start_of("slot: 2026-11-02T14:30").as_deref(), Some("2026-11-02 14:30"));
    }

    #[test]
    fn test_time_only() {
        assert_eq!(start_of("call at 3").as_deref(), Some("2026-10-19 15:00"));
        assert_eq!(start_of("call at 8am").as_deref(), Some("2026-10-20 08:00"));
        assert_eq!(start_of("standup 10:30am").as_deref(), Some("2026-10-19 10:30"));
    }

    #[test]
    fn test_at_hour_with_minutes_reads_as_afternoon() {
        assert_eq!(start_of("tomorrow at 4").as_deref(), Some("2026-10-20 16:00"));
        assert_eq!(start_of("tomorrow at 4:30").as_deref(), Some("2026-10-20 16:30"));
        assert_eq!(start_of("tomorrow at 4:30am").as_deref(), Some("2026-10-20 04:30"));
        assert_eq!(start_of("tomorrow at 10:30").as_deref(), Some("2026-10-20 10:30"));
        assert_eq!(start_of("tomorrow 4:30").as_deref(), Some("2026-10-20 04:30"));
    }

    #[test]
    fn test_relative_phrases() {
        assert_eq!(start_of("day after tomorrow at 11am").as_deref(), Some("2026-10-21 11:00"));
        assert_eq!(start_of("in 2 weeks").as_deref(), Some("2026-11-02 09:00"));
        assert_eq!(start_of("dinner tonight").as_deref(), Some("2026-10-19 19:00"));
    }

    #[test]
    fn test_first_date_phrase_wins() {
        assert_eq!(start_of("tomorrow or Friday, 4pm").as_deref(), Some("2026-10-20 16:00"));
        assert_eq!(start_of("Friday or tomorrow").as_deref(), Some("2026-10-23 09:00"));
    }

    #[test]
    fn test_impossible_dates_are_ignored() {
        assert_eq!(start_of("February 30"), None);
        assert_eq!(start_of("13/45"), None);
    }
}
