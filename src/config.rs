use crate::error::{config_error, AgendaResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Default Gmail search query for meeting-related mail
pub const DEFAULT_GMAIL_QUERY: &str = "subject:meeting OR subject:appointment OR subject:scheduled";

/// Config file read when `AGENDA_CONFIG_FILE` is not set
pub const DEFAULT_CONFIG_FILE: &str = "config/agendabot.toml";

/// Longest event a run will create: one week
pub const MAX_EVENT_DURATION_MIN: i64 = 7 * 24 * 60;

/// Where OAuth tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    File,
    Redis,
}

impl FromStr for TokenStoreKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TokenStoreKind::File),
            "redis" => Ok(TokenStoreKind::Redis),
            other => Err(config_error(&format!("Unknown token store: {}", other))),
        }
    }
}

/// Channel used for the daily digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Whatsapp,
    Discord,
}

impl FromStr for NotifierKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Ok(NotifierKind::Whatsapp),
            "discord" => Ok(NotifierKind::Discord),
            other => Err(config_error(&format!("Unknown notifier: {}", other))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// OAuth token endpoint used for refreshing
    pub google_token_url: String,
    /// Backend for persisted tokens
    pub token_store: TokenStoreKind,
    /// Token file used by the file store
    pub token_file: PathBuf,
    /// Redis URL used by the redis store
    pub redis_url: String,
    /// Gmail search query for candidate emails
    pub gmail_query: String,
    /// Maximum number of messages fetched in one run
    pub gmail_max_results: usize,
    /// Calendar that receives new events and is read for the digest
    pub calendar_id: String,
    /// IANA timezone used to resolve phrases and display times
    pub timezone: String,
    /// Length of created events
    pub default_event_duration_min: i64,
    /// How many event inserts may be in flight at once
    pub event_concurrency: usize,
    /// Timeout for every outbound HTTP request
    pub http_timeout_secs: u64,
    /// Channel used for the digest
    pub notifier: NotifierKind,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub whatsapp_from: Option<String>,
    pub whatsapp_to: Option<String>,
    pub discord_webhook_url: Option<String>,
    /// Port for the HTTP API
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
            token_store: TokenStoreKind::File,
            token_file: PathBuf::from("token.json"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            gmail_query: DEFAULT_GMAIL_QUERY.to_string(),
            gmail_max_results: 20,
            calendar_id: "primary".to_string(),
            timezone: "UTC".to_string(),
            default_event_duration_min: 60,
            event_concurrency: 1,
            http_timeout_secs: 30,
            notifier: NotifierKind::Whatsapp,
            twilio_account_sid: None,
            twilio_auth_token: None,
            whatsapp_from: None,
            whatsapp_to: None,
            discord_webhook_url: None,
            port: 8000,
        }
    }
}

/// Public part of the configuration, safe to show to API callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSummary {
    pub gmail_query: String,
    pub gmail_max_results: usize,
    pub timezone: String,
    pub default_event_duration: i64,
    pub calendar_id: String,
}

impl Config {
    /// Load configuration from defaults, the optional config file and the environment
    pub fn load() -> AgendaResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("AGENDA_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML config file, falling back to defaults when it does not exist
    pub fn from_file(path: &Path) -> AgendaResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Reading configuration from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> AgendaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment-style key lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> AgendaResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GOOGLE_CLIENT_ID") {
            self.google_client_id = v;
        }
        if let Some(v) = lookup("GOOGLE_CLIENT_SECRET") {
            self.google_client_secret = v;
        }
        if let Some(v) = lookup("GOOGLE_TOKEN_URL") {
            self.google_token_url = v;
        }
        if let Some(v) = lookup("TOKEN_STORE") {
            self.token_store = v.parse()?;
        }
        if let Some(v) = lookup("GOOGLE_TOKEN_FILE") {
            self.token_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("REDIS_URL") {
            self.redis_url = v;
        }
        if let Some(v) = lookup("GMAIL_QUERY") {
            self.gmail_query = v;
        }
        if let Some(v) = lookup("GMAIL_MAX_RESULTS") {
            self.gmail_max_results = parse_or_keep("GMAIL_MAX_RESULTS", &v, self.gmail_max_results);
        }
        if let Some(v) = lookup("GOOGLE_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Some(v) = lookup("TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = lookup("DEFAULT_EVENT_DURATION_MIN") {
            self.default_event_duration_min =
                parse_or_keep("DEFAULT_EVENT_DURATION_MIN", &v, self.default_event_duration_min);
        }
        if let Some(v) = lookup("EVENT_CONCURRENCY") {
            self.event_concurrency = parse_or_keep("EVENT_CONCURRENCY", &v, self.event_concurrency);
        }
        if let Some(v) = lookup("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_or_keep("HTTP_TIMEOUT_SECS", &v, self.http_timeout_secs);
        }
        if let Some(v) = lookup("NOTIFIER") {
            self.notifier = v.parse()?;
        }
        self.twilio_account_sid = lookup("TWILIO_ACCOUNT_SID").or(self.twilio_account_sid.take());
        self.twilio_auth_token = lookup("TWILIO_AUTH_TOKEN").or(self.twilio_auth_token.take());
        self.whatsapp_from = lookup("WHATSAPP_FROM").or(self.whatsapp_from.take());
        self.whatsapp_to = lookup("WHATSAPP_TO").or(self.whatsapp_to.take());
        self.discord_webhook_url = lookup("DISCORD_WEBHOOK_URL").or(self.discord_webhook_url.take());
        if let Some(v) = lookup("PORT") {
            self.port = parse_or_keep("PORT", &v, self.port);
        }

        Ok(())
    }

    /// Check the values the pipeline relies on
    pub fn validate(&self) -> AgendaResult<()> {
        self.tz()?;
        if !(1..=MAX_EVENT_DURATION_MIN).contains(&self.default_event_duration_min) {
            return Err(config_error(&format!(
                "DEFAULT_EVENT_DURATION_MIN must be between 1 and {}",
                MAX_EVENT_DURATION_MIN
            )));
        }
        if self.gmail_max_results == 0 {
            return Err(config_error("GMAIL_MAX_RESULTS must be at least 1"));
        }
        if self.calendar_id.trim().is_empty() {
            return Err(config_error("GOOGLE_CALENDAR_ID must not be empty"));
        }
        Ok(())
    }

    /// Parsed display timezone
    pub fn tz(&self) -> AgendaResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Names of WhatsApp settings that are not set
    pub fn missing_whatsapp_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.twilio_account_sid) {
            missing.push("TWILIO_ACCOUNT_SID");
        }
        if is_blank(&self.twilio_auth_token) {
            missing.push("TWILIO_AUTH_TOKEN");
        }
        if is_blank(&self.whatsapp_from) {
            missing.push("WHATSAPP_FROM");
        }
        if is_blank(&self.whatsapp_to) {
            missing.push("WHATSAPP_TO");
        }
        missing
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            gmail_query: self.gmail_query.clone(),
            gmail_max_results: self.gmail_max_results,
            timezone: self.timezone.clone(),
            default_event_duration: self.default_event_duration_min,
            calendar_id: self.calendar_id.clone(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn parse_or_keep<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: &str, current: T) -> T {
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid value for {}: {:?}, using {}", key, raw, current);
            current
        }
    }
}
