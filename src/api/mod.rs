//! JSON HTTP API over the assistant backend.

pub mod admin;
pub mod chat;
pub mod error;
pub mod identity;
pub mod knowledge;
pub mod learning;
pub mod market;
pub mod profile;
pub mod sandbox;
pub mod training;

use crate::TradePilot;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<TradePilot>,
}

pub fn router(app: Arc<TradePilot>) -> Router {
    let state = AppState { app };

    Router::new()
        .route("/health", get(health))
        // Market data
        .route("/api/market/quotes", get(market::quotes))
        .route("/api/market/quote/:symbol", get(market::quote))
        .route("/api/market/historical/:symbol", get(market::historical))
        .route("/api/market/news", get(market::news))
        .route("/api/market/search", get(market::search))
        .route("/api/market/indicators/:symbol", get(market::indicators))
        .route("/api/market/status", get(market::status))
        .route("/api/market/stream", get(market::stream))
        // Assistant
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/sessions", get(chat::learning_sessions))
        .route("/api/ai/generate", post(chat::generate))
        .route("/api/ai/insights", get(chat::recent_insights).post(chat::add_insight))
        .route("/api/assistants", get(chat::assistants))
        // Knowledge base
        .route(
            "/api/knowledge/profile",
            get(knowledge::get_profile).put(knowledge::update_profile),
        )
        .route(
            "/api/knowledge/patterns",
            get(knowledge::patterns).post(knowledge::add_pattern),
        )
        .route("/api/knowledge/patterns/:id", patch(knowledge::update_pattern))
        .route("/api/knowledge/memory", get(knowledge::memory).post(knowledge::add_memory))
        .route(
            "/api/knowledge/insights",
            get(knowledge::insights).put(knowledge::update_insight),
        )
        .route(
            "/api/knowledge/market-insights",
            get(knowledge::market_insights).post(knowledge::add_market_insight),
        )
        .route(
            "/api/knowledge/preferences",
            get(knowledge::preferences).put(knowledge::set_preference),
        )
        .route("/api/knowledge/recommendations", get(knowledge::recommendations))
        .route("/api/knowledge/analytics", get(knowledge::analytics))
        .route("/api/knowledge/search", get(knowledge::search))
        // Learning
        .route("/api/learning/concepts", get(learning::concepts))
        .route("/api/learning/concepts/:id", get(learning::concept))
        .route("/api/learning/concepts/:id/start", post(learning::start))
        .route("/api/learning/concepts/:id/complete", post(learning::complete))
        .route("/api/learning/concepts/:id/quiz", post(learning::quiz))
        .route("/api/learning/paths", get(learning::paths))
        .route("/api/learning/paths/:id", get(learning::path))
        .route("/api/learning/recommendations", get(learning::recommendations))
        .route("/api/learning/progress", get(learning::progress))
        // Sandbox workspace
        .route("/api/sandbox", get(sandbox::get).patch(sandbox::patch))
        .route("/api/sandbox/sync", post(sandbox::sync))
        // Practice trading
        .route("/api/training/scenarios", get(training::scenarios))
        .route("/api/training/session", get(training::session))
        .route("/api/training/start", post(training::start))
        .route("/api/training/pause", post(training::pause))
        .route("/api/training/resume", post(training::resume))
        .route("/api/training/reset", post(training::reset))
        .route("/api/training/trade", post(training::trade))
        .route("/api/training/hint", get(training::hint))
        .route("/api/training/performance", get(training::performance))
        // Accounts
        .route(
            "/api/profile",
            get(profile::get).put(profile::update).post(profile::create),
        )
        .route("/api/profile/assistant", put(profile::select_assistant))
        .route("/api/profile/onboarding", post(profile::onboarding))
        // Admin
        .route("/api/admin/setup", post(admin::setup))
        .route("/api/admin/me", get(admin::me))
        .route("/api/admin/users", get(admin::users))
        .route(
            "/api/admin/assistant-configs",
            get(admin::configs).post(admin::create_config),
        )
        .route(
            "/api/admin/assistant-configs/:id",
            put(admin::update_config).delete(admin::delete_config),
        )
        .route("/api/admin/analytics", get(admin::analytics))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn serve(app: Arc<TradePilot>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router(app)).await
}
