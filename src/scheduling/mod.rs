//! Turning free-text emails into calendar event requests.

pub mod builder;
pub mod extractor;

pub use builder::{BuildOutcome, EventRequest, EventRequestBuilder, NO_SUBJECT};
pub use extractor::{CandidateDateTime, DateTimeExtractor};
