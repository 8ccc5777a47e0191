use super::models::CalendarEntry;
use super::time::{entry_start, EntryStart};
use crate::utils::time::{end_of_utc_day, format_local_time};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Digest sent when the window holds no entries
pub const NO_MEETINGS: &str = "☕ No meetings scheduled for today. Enjoy your day!";

/// Digest used when the calendar could not be read
pub const SCHEDULE_UNAVAILABLE: &str = "⚠️ Could not fetch today's schedule.";

/// Shown instead of a time for all-day entries and unreadable start times
pub const TIME_UNKNOWN: &str = "time unknown";

/// Shown for entries without a summary
pub const NO_TITLE: &str = "(No title)";

/// A bounded slice of time the digest covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// From `now` until the next UTC midnight
    pub fn rest_of_utc_day(now: DateTime<Utc>) -> Self {
        Self {
            start: now,
            end: end_of_utc_day(now),
        }
    }
}

/// Renders calendar entries as a chat-friendly digest
#[derive(Debug, Clone)]
pub struct ScheduleFormatter {
    timezone: Tz,
}

impl ScheduleFormatter {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// One header line, then one line per entry in input order
    pub fn format(&self, entries: &[CalendarEntry], window: &TimeWindow) -> String {
        if entries.is_empty() {
            return NO_MEETINGS.to_string();
        }

        let day = window.start.with_timezone(&self.timezone).format("%a %d %b");
        let mut message = format!("🚀 *Your Daily Schedule ({}):*\n", day);
        for entry in entries {
            message.push_str(&format!("⏰ {} - {}\n", self.time_label(entry), summary_label(entry)));
        }
        message
    }

    fn time_label(&self, entry: &CalendarEntry) -> String {
        match entry_start(entry, &self.timezone) {
            EntryStart::Timed(start) => format_local_time(&self.timezone, start),
            EntryStart::AllDay(_) | EntryStart::Unknown => TIME_UNKNOWN.to_string(),
        }
    }
}

fn summary_label(entry: &CalendarEntry) -> String {
    match entry.summary.as_deref().map(str::trim) {
        Some(summary) if !summary.is_empty() => summary.replace(['\r', '\n'], " "),
        _ => NO_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        TimeWindow::rest_of_utc_day(Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap())
    }

    fn timed(id: &str, summary: Option<&str>, start: &str) -> CalendarEntry {
        CalendarEntry {
            id: id.to_string(),
            summary: summary.map(str::to_string),
            start_date_time: Some(start.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_schedule_literal() {
        let formatter = ScheduleFormatter::new(Tz::UTC);
        assert_eq!(
            formatter.format(&[], &window()),
            "☕ No meetings scheduled for today. Enjoy your day!"
        );
    }

    #[test]
    fn test_lines_follow_input_order() {
        let formatter = ScheduleFormatter::new(Tz::UTC);
        let entries = vec![
            timed("b", Some("Later"), "2026-10-19T16:00:00Z"),
            timed("a", Some("Earlier"), "2026-10-19T09:30:00Z"),
        ];
        let digest = formatter.format(&entries, &window());
        let lines: Vec<&str> = digest.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "🚀 *Your Daily Schedule (Mon 19 Oct):*");
        assert_eq!(lines[1], "⏰ 16:00 - Later");
        assert_eq!(lines[2], "⏰ 09:30 - Earlier");
    }

    #[test]
    fn test_times_shown_in_display_timezone() {
        let formatter = ScheduleFormatter::new("Europe/Helsinki".parse().unwrap());
        let digest = formatter.format(&[timed("a", Some("Standup"), "2026-10-19T07:00:00Z")], &window());
        assert!(digest.contains("⏰ 10:00 - Standup"));
    }

    #[test]
    fn test_all_day_missing_title_and_bad_time() {
        let formatter = ScheduleFormatter::new(Tz::UTC);
        let entries = vec![
            CalendarEntry {
                id: "holiday".to_string(),
                summary: Some("Company holiday".to_string()),
                start_date: Some("2026-10-19".to_string()),
                ..Default::default()
            },
            timed("untitled", None, "2026-10-19T12:00:00Z"),
            timed("broken", Some("Multi\nline"), "not a time"),
        ];
        let digest = formatter.format(&entries, &window());
        let lines: Vec<&str> = digest.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "⏰ time unknown - Company holiday");
        assert_eq!(lines[2], "⏰ 12:00 - (No title)");
        assert_eq!(lines[3], "⏰ time unknown - Multi line");
    }
}
