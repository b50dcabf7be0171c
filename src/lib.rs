// SkillSync AI - recommendation service with a quota-aware Gemini call governor

pub mod config;
pub mod governor;  // Outbound call pacing for the Gemini API
pub mod llm;
pub mod middleware;
pub mod models;
pub mod recommendations;
pub mod routes;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use governor::{GovernorError, RateGovernor, RateLimits};
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
