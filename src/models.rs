use std::sync::Arc;
use validator::Validate;
use crate::config::Config;
use crate::governor::RateGovernor;
use crate::recommendations::RecommendationService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub governor: Arc<RateGovernor>,
    pub recommendations: Arc<RecommendationService>,
}

// Skill data arrives from the skill-tracking API as snapshots; this service
// does not own skill persistence.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Validate)]
pub struct SkillSnapshot {
    pub id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// 1-5 scale
    #[validate(range(min = 1, max = 5))]
    pub proficiency_level: i32,
    #[serde(default = "default_target_level")]
    #[validate(range(min = 1, max = 5))]
    pub target_level: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub activities: Vec<ActivitySummary>,
}

impl SkillSnapshot {
    pub fn gap(&self) -> i32 {
        self.target_level - self.proficiency_level
    }
}

fn default_target_level() -> i32 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActivitySummary {
    pub title: String,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    LearningPath,
    WeeklySchedule,
    SkillGapAnalysis,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub kind: RecommendationKind,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
    pub related_skill_ids: Vec<i64>,
}

// API request/response types

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LearningPathRequest {
    pub user_id: String,
    pub skill: SkillSnapshot,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PortfolioRequest {
    pub user_id: String,
    #[serde(default)]
    pub skills: Vec<SkillSnapshot>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeneratedContent {
    pub content: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
