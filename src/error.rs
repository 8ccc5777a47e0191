use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(agendabot::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(agendabot::config))]
    Config(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(agendabot::authentication),
        help("Run `get_google_token` to authorize the application again")
    )]
    Authentication(String),

    #[error("Gmail API error: {0}")]
    #[diagnostic(code(agendabot::gmail))]
    Gmail(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(agendabot::google_calendar))]
    GoogleCalendar(String),

    #[error("Notification error: {0}")]
    #[diagnostic(code(agendabot::notification))]
    Notification(String),

    #[error("Token store error: {0}")]
    #[diagnostic(code(agendabot::token_store))]
    TokenStore(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(agendabot::invalid_input))]
    InvalidInput(String),

    #[error(transparent)]
    #[diagnostic(code(agendabot::io))]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(agendabot::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(agendabot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(agendabot::other))]
    Other(String),
}

impl Error {
    /// Whether this error aborts a whole workflow run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AgendaResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create Gmail errors
pub fn gmail_error(message: &str) -> Error {
    Error::Gmail(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create notification errors
pub fn notification_error(message: &str) -> Error {
    Error::Notification(message.to_string())
}

/// Helper to create token store errors
pub fn token_store_error(message: &str) -> Error {
    Error::TokenStore(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
