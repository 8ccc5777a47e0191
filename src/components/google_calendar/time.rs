use super::models::CalendarEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use crate::utils::time::resolve_local;

/// When an entry starts, as far as it can be told
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStart {
    Timed(DateTime<Utc>),
    AllDay(NaiveDate),
    Unknown,
}

/// Get the entry start; timestamps without an offset are read in `tz`
pub fn entry_start(entry: &CalendarEntry, tz: &Tz) -> EntryStart {
    if let Some(start_time) = &entry.start_date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(start_time) {
            return EntryStart::Timed(dt.with_timezone(&Utc));
        }
        if let Some(dt) = NaiveDateTime::parse_from_str(start_time, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .and_then(|naive| resolve_local(tz, naive))
        {
            return EntryStart::Timed(dt);
        }
    }

    match entry
        .start_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    {
        Some(date) => EntryStart::AllDay(date),
        None => EntryStart::Unknown,
    }
}
