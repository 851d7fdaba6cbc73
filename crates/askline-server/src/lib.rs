//! Askline server library logic.

pub mod api;
pub mod api_auth;
pub mod api_questions;
pub mod api_ws;
pub mod config;
pub mod middleware;

use askline_db::DbPool;
use askline_identity::TokenSigner;
use askline_live::{Broadcaster, ChannelRegistry};
use askline_suggest::Suggester;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Fan-out to connected WebSocket clients.
    pub broadcaster: Broadcaster,
    /// Candidate-answer generator.
    pub suggester: Suggester,
    /// Issues and checks bearer tokens.
    pub tokens: TokenSigner,
    /// Whether `POST /signup` creates admin accounts.
    pub signup_grants_admin: bool,
}

impl AppState {
    /// Builds the state for `pool` from the loaded configuration.
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let ttl = Duration::from_secs(config.auth.token_ttl_secs);
        let tokens = if config.auth.token_secret.is_empty() {
            tracing::warn!("auth.token_secret not set; tokens will not survive a restart");
            TokenSigner::random(ttl)
        } else {
            TokenSigner::from_passphrase(&config.auth.token_secret, ttl)
        };

        Self {
            pool,
            broadcaster: Broadcaster::new(ChannelRegistry::new()),
            suggester: Suggester::new(config.suggester.to_suggester_config()),
            tokens,
            signup_grants_admin: config.auth.signup_grants_admin,
        }
    }

    /// The live channel set.
    pub fn registry(&self) -> &ChannelRegistry {
        self.broadcaster.registry()
    }
}

/// Maximum request body size (64 KiB).
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.registry().len().await,
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(api_auth::signup_handler))
        .route("/token", post(api_auth::token_handler))
        .route(
            "/questions",
            post(api_questions::create_question_handler)
                .get(api_questions::list_questions_handler),
        )
        .route(
            "/questions/{questionId}",
            get(api_questions::get_question_handler),
        )
        .route(
            "/questions/{questionId}/answers",
            post(api_questions::create_answer_handler),
        )
        .route(
            "/questions/{questionId}/status",
            put(api_questions::update_status_handler),
        )
        .route(
            "/questions/{questionId}/suggestions",
            get(api_questions::suggestions_handler),
        )
        .route("/ws", get(api_ws::ws_handler))
        .layer(axum::middleware::from_fn(middleware::identity_middleware))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
