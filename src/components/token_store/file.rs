use super::{StoredToken, TokenStore};
use crate::error::{token_store_error, AgendaResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keeps the token as a JSON document on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> AgendaResult<Option<StoredToken>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No token file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(token_store_error(&format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let token = serde_json::from_str(&contents).map_err(|e| {
            token_store_error(&format!("Failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(Some(token))
    }

    async fn save(&self, token: &StoredToken) -> AgendaResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            token_store_error(&format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!("Saved token to {}", self.path.display());
        Ok(())
    }
}
