//! API Routes
//!
//! This module organizes all HTTP endpoints for the service:
//! - `/api/recommendations` - AI recommendation generation and history
//! - `/api/recommendations/rate-limit` - Gemini quota usage
//! - `/api/health` - Health checks

pub mod extract;
pub mod health;
pub mod recommendations;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(recommendations::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &origins)
}
