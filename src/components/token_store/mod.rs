mod file;
mod redis_store;

pub use file::FileTokenStore;
pub use redis_store::RedisTokenStore;

use crate::error::AgendaResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Seconds before expiry at which a token already counts as expired
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth credential persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl StoredToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now.timestamp()
    }
}

/// Somewhere a [`StoredToken`] can be kept
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    async fn load(&self) -> AgendaResult<Option<StoredToken>>;

    async fn save(&self, token: &StoredToken) -> AgendaResult<()>;
}

/// Process-local store, used by tests and one-shot tools
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<StoredToken>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> AgendaResult<Option<StoredToken>> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &StoredToken) -> AgendaResult<()> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }
}
