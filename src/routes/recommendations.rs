//! Recommendation API Routes
//!
//! - GET  /api/recommendations - List a user's recommendations
//! - GET  /api/recommendations/{id} - Fetch one recommendation
//! - POST /api/recommendations/learning-path - Learning path for one skill
//! - POST /api/recommendations/weekly-schedule - Weekly study schedule
//! - POST /api/recommendations/skill-gap-analysis - Skill gap analysis
//! - GET  /api/recommendations/rate-limit - Current Gemini usage

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;
use super::extract::{AppJson, AppPath, AppQuery};
use crate::governor::RateLimitStatus;
use crate::models::{
    AppState, GeneratedContent, LearningPathRequest, PortfolioRequest, Recommendation, UserQuery,
};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommendations", get(list_recommendations))
        .route("/api/recommendations/rate-limit", get(rate_limit_status))
        .route("/api/recommendations/{id}", get(get_recommendation))
        .route("/api/recommendations/learning-path", post(generate_learning_path))
        .route("/api/recommendations/weekly-schedule", post(generate_weekly_schedule))
        .route("/api/recommendations/skill-gap-analysis", post(generate_skill_gap_analysis))
        .with_state(state)
}

async fn list_recommendations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state.recommendations.list_recommendations(&query.user_id).await?;
    Ok(Json(recommendations))
}

async fn get_recommendation(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<UserQuery>,
) -> AppResult<Json<Recommendation>> {
    let recommendation = state.recommendations.get_recommendation(id, &query.user_id).await?;
    Ok(Json(recommendation))
}

async fn generate_learning_path(
    State(state): State<AppState>,
    AppJson(request): AppJson<LearningPathRequest>,
) -> AppResult<Json<GeneratedContent>> {
    info!(skill_id = request.skill.id, "Learning path requested");
    let content = state
        .recommendations
        .generate_learning_path(&request.user_id, &request.skill)
        .await?;
    Ok(Json(GeneratedContent { content }))
}

async fn generate_weekly_schedule(
    State(state): State<AppState>,
    AppJson(request): AppJson<PortfolioRequest>,
) -> AppResult<Json<GeneratedContent>> {
    let content = state
        .recommendations
        .generate_weekly_schedule(&request.user_id, &request.skills)
        .await?;
    Ok(Json(GeneratedContent { content }))
}

async fn generate_skill_gap_analysis(
    State(state): State<AppState>,
    AppJson(request): AppJson<PortfolioRequest>,
) -> AppResult<Json<GeneratedContent>> {
    let content = state
        .recommendations
        .generate_skill_gap_analysis(&request.user_id, &request.skills)
        .await?;
    Ok(Json(GeneratedContent { content }))
}

async fn rate_limit_status(State(state): State<AppState>) -> Json<RateLimitStatus> {
    Json(state.governor.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::governor::{RateGovernor, RateLimits};
    use crate::llm::provider::testing::ScriptedAdapter;
    use crate::llm::LLM;
    use crate::recommendations::{InMemoryRecommendationStore, RecommendationService};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(per_day: usize) -> Router {
        let config = Config::from_lookup(|key| {
            (key == "GEMINI_API_KEY").then(|| "test-key".to_string())
        })
        .unwrap();
        let governor = Arc::new(RateGovernor::new(RateLimits {
            per_minute: 100,
            per_day,
            min_spacing: Duration::ZERO,
        }));
        let llm = Arc::new(LLM::new(
            Box::new(ScriptedAdapter::replying("## Plan")),
            governor.clone(),
            Duration::from_secs(90),
        ));
        let recommendations = Arc::new(RecommendationService::new(
            llm,
            Arc::new(InMemoryRecommendationStore::new()),
            "gemini-1.5-flash",
        ));
        router(AppState {
            config,
            governor,
            recommendations,
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn learning_path_body(level: i32) -> Value {
        json!({
            "user_id": "alice",
            "skill": {"id": 3, "name": "Rust", "proficiency_level": level}
        })
    }

    #[tokio::test]
    async fn test_learning_path_then_listing() {
        let app = app(10);

        let response = app
            .clone()
            .oneshot(post_json("/api/recommendations/learning-path", learning_path_body(2)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["content"], "## Plan");

        let response = app
            .clone()
            .oneshot(get_request("/api/recommendations?user_id=alice"))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed[0]["title"], "Learning Path: Rust");
        assert_eq!(listed[0]["kind"], "learning_path");

        let id = listed[0]["id"].as_str().unwrap().to_string();
        let response = app
            .oneshot(get_request(&format!("/api/recommendations/{}?user_id=alice", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_status_reports_usage() {
        let app = app(10);
        app.clone()
            .oneshot(post_json("/api/recommendations/learning-path", learning_path_body(2)))
            .await
            .unwrap();

        let response = app.oneshot(get_request("/api/recommendations/rate-limit")).await.unwrap();
        let status = body_json(response).await;

        assert_eq!(status["requests_last_minute"], 1);
        assert_eq!(status["requests_last_day"], 1);
        assert_eq!(status["max_per_day"], 10);
    }

    #[tokio::test]
    async fn test_daily_quota_returns_too_many_requests() {
        let app = app(1);
        app.clone()
            .oneshot(post_json("/api/recommendations/learning-path", learning_path_body(2)))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/api/recommendations/learning-path", learning_path_body(2)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert!(body["details"].as_str().unwrap().contains("try again tomorrow"));
    }

    #[tokio::test]
    async fn test_invalid_skill_is_bad_request() {
        let response = app(10)
            .oneshot(post_json("/api/recommendations/learning-path", learning_path_body(0)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schedule_without_skills() {
        let response = app(10)
            .oneshot(post_json(
                "/api/recommendations/weekly-schedule",
                json!({"user_id": "alice", "skills": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["content"],
            crate::recommendations::NO_ACTIVE_SKILLS_SCHEDULE
        );
    }

    #[tokio::test]
    async fn test_unknown_recommendation_is_not_found() {
        let uri = format!("/api/recommendations/{}?user_id=alice", Uuid::new_v4());
        let response = app(10).oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skill_gap_analysis_is_generated_and_listed() {
        let app = app(10);
        let body = json!({
            "user_id": "alice",
            "skills": [
                {"id": 1, "name": "Rust", "category": "Backend", "proficiency_level": 2},
                {"id": 2, "name": "Perl", "proficiency_level": 1, "is_active": false}
            ]
        });

        let response = app
            .clone()
            .oneshot(post_json("/api/recommendations/skill-gap-analysis", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["content"], "## Plan");

        let response = app
            .oneshot(get_request("/api/recommendations?user_id=alice"))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["title"], "Skill Gap Analysis");
        assert_eq!(listed[0]["kind"], "skill_gap_analysis");
    }

    async fn assert_json_bad_request(response: axum::response::Response) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert!(!body["details"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_is_json_bad_request() {
        let response = app(10)
            .oneshot(get_request("/api/recommendations/not-a-uuid?user_id=alice"))
            .await
            .unwrap();
        assert_json_bad_request(response).await;
    }

    #[tokio::test]
    async fn test_missing_user_id_is_json_bad_request() {
        let response = app(10)
            .oneshot(get_request("/api/recommendations"))
            .await
            .unwrap();
        assert_json_bad_request(response).await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/recommendations/learning-path")
            .header("content-type", "application/json")
            .body(Body::from("{\"user_id\": \"alice\", \"skill\":"))
            .unwrap();

        let response = app(10).oneshot(request).await.unwrap();
        assert_json_bad_request(response).await;
    }
}
