mod client;
pub mod digest;
pub mod models;
pub mod time;

pub use client::{to_google_event, GoogleCalendarClient, CALENDAR_API_BASE};
pub use digest::{ScheduleFormatter, TimeWindow, NO_MEETINGS, SCHEDULE_UNAVAILABLE};
pub use models::CalendarEntry;
