pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod osm;
pub mod pipeline;
pub mod query_parser;
pub mod rate_limit;

use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute)?;
        Ok(Self {
            config: Arc::new(config),
            rate_limiter,
        })
    }
}

pub async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "ok",
        "service": "places-chat-backend"
    })))
}

pub fn build_router(state: AppState) -> Router {
    let chat_routes = Router::new()
        .route("/chat", post(api::chat::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ));

    Router::new()
        .route("/", get(api::home::index))
        .route("/api/health", get(health_check))
        .merge(chat_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
