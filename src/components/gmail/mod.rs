mod client;
pub mod decode;
pub mod models;

pub use client::{GmailClient, GMAIL_API_BASE};
pub use decode::{decode, decode_message, DecodedBody};
pub use models::{EmailMessage, RawMessage};
