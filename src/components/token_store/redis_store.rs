use super::{StoredToken, TokenStore};
use crate::error::{token_store_error, AgendaResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};

/// Redis key the token lives under
pub const TOKEN_KEY: &str = "google_oauth_token";

/// Keeps the token as JSON in Redis
#[derive(Clone)]
pub struct RedisTokenStore {
    client: RedisClient,
    key: String,
}

impl RedisTokenStore {
    pub fn new(redis_url: &str) -> AgendaResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| token_store_error(&format!("Failed to create Redis client: {}", e)))?;
        Ok(Self {
            client,
            key: TOKEN_KEY.to_string(),
        })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    async fn connection(&self) -> AgendaResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| token_store_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn load(&self) -> AgendaResult<Option<StoredToken>> {
        let mut conn = self.connection().await?;

        let token_json: Option<String> = conn
            .get(&self.key)
            .await
            .map_err(|e| token_store_error(&format!("Failed to read token from Redis: {}", e)))?;

        token_json
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| token_store_error(&format!("Failed to parse token JSON: {}", e)))
            })
            .transpose()
    }

    async fn save(&self, token: &StoredToken) -> AgendaResult<()> {
        let mut conn = self.connection().await?;
        let token_json = serde_json::to_string(token)?;

        () = conn
            .set(&self.key, token_json)
            .await
            .map_err(|e| token_store_error(&format!("Failed to save token to Redis: {}", e)))?;

        Ok(())
    }
}
