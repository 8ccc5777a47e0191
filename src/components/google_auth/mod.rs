mod actor;
mod handle;

pub use actor::OAuthCredentials;
pub use handle::TokenHandle;

/// Scopes requested when authorizing
pub const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/calendar",
];

/// Google's OAuth consent endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
