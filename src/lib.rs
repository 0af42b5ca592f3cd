pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod security;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::security::events::SecurityEventRecorder;
use crate::security::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub rate_limiter: Arc<RateLimiter>,
    pub security_events: SecurityEventRecorder,
    pub webhook_secret: Option<String>,
    pub default_commission_rate: BigDecimal,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: &Config) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit_max_requests,
                Duration::from_secs(config.rate_limit_window_secs),
            )),
            security_events: SecurityEventRecorder::new(db.clone()),
            webhook_secret: config.webhook_secret.clone(),
            default_commission_rate: config.default_commission_rate.clone(),
            start_time: std::time::Instant::now(),
            db,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    // Webhooks come from provider infrastructure, not browsers; the
    // permissive CORS layer exists so provider dashboards can probe the
    // endpoint and OPTIONS preflights get an empty 200.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhooks/payments", post(handlers::webhook::payment_callback))
        .route("/transactions/:reference", get(handlers::transactions::get_transaction))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
