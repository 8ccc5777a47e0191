use crate::components::notifier;
use crate::components::provider::{http_client, GoogleServiceProvider};
use crate::components::token_store::{FileTokenStore, RedisTokenStore, TokenStore};
use crate::config::{Config, TokenStoreKind};
use crate::error::{AgendaResult, Error};
use crate::workflow::WorkflowOrchestrator;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => {
            info!(
                timezone = %config.timezone,
                calendar = %config.calendar_id,
                token_store = ?config.token_store,
                "Configuration loaded"
            );
            Ok(Arc::new(config))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Token store selected by the configuration
pub fn token_store(config: &Config) -> AgendaResult<Arc<dyn TokenStore>> {
    Ok(match config.token_store {
        TokenStoreKind::File => Arc::new(FileTokenStore::new(config.token_file.clone())),
        TokenStoreKind::Redis => Arc::new(RedisTokenStore::new(&config.redis_url)?),
    })
}

/// Wire the Google services, token actor and notifier into an orchestrator
pub fn build_orchestrator(config: Arc<Config>) -> AgendaResult<WorkflowOrchestrator> {
    let client = http_client(&config)?;
    let store = token_store(&config)?;
    let provider = GoogleServiceProvider::from_config(&config, client.clone(), store);
    let notifier = notifier::from_config(&config, client);

    WorkflowOrchestrator::new(config, Arc::new(provider), notifier)
}
