use agendabot::api::{router, AppState};
use agendabot::error::Error;
use agendabot::{shutdown, startup};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    let config = startup::load_config()?;
    let port = config.port;
    let orchestrator = Arc::new(startup::build_orchestrator(config)?);

    let app = router(AppState::new(orchestrator))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", listener.local_addr().map_err(Error::from)?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
