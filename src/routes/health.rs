use axum::{Router, routing::get, Json};
use crate::models::HealthResponse;

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
