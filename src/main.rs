use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use places_chat_backend::{build_router, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("places_chat_backend=info,tower_http=info")),
        )
        .init();

    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        model = %config.ollama_model,
        default_location = %config.default_location,
        max_results = config.max_results,
        "configuration loaded"
    );

    let state = AppState::new(config)?;
    state.rate_limiter.spawn_pruner(Duration::from_secs(60));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Backend server running on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
