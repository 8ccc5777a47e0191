use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a wall-clock time in `tz` to an absolute instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are moved forward by an hour.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    let shifted = naive.checked_add_signed(Duration::hours(1))?;
    tz.from_local_datetime(&shifted)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Instant for a local date and time of day in `tz`
pub fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    resolve_local(tz, date.and_time(time))
}

/// Start of the next UTC day after `now`
pub fn end_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Duration::days(1);
    Utc.from_utc_datetime(&tomorrow.and_time(NaiveTime::MIN))
}

/// Format an instant as HH:MM in the display timezone
pub fn format_local_time(tz: &Tz, instant: DateTime<Utc>) -> String {
    instant.with_timezone(tz).format("%H:%M").to_string()
}
