//! AI recommendation service
//!
//! Turns skill snapshots into prompts, sends them through the governed LLM
//! client and keeps the generated content in a [`RecommendationStore`].

pub mod prompts;
pub mod store;

pub use store::{InMemoryRecommendationStore, RecommendationStore};

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;
use crate::llm::LLM;
use crate::models::{Recommendation, RecommendationKind, SkillSnapshot};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

/// Most recommendations returned by a listing
const LIST_LIMIT: usize = 20;

pub const NO_ACTIVE_SKILLS_SCHEDULE: &str =
    "You don't have any active skills yet. Add some skills to get a personalized schedule!";
pub const NO_SKILLS_GAP_ANALYSIS: &str =
    "You don't have any skills tracked yet. Add some skills to get a gap analysis!";

pub struct RecommendationService {
    llm: Arc<LLM>,
    store: Arc<dyn RecommendationStore>,
    model: String,
}

impl RecommendationService {
    pub fn new(llm: Arc<LLM>, store: Arc<dyn RecommendationStore>, model: impl Into<String>) -> Self {
        Self {
            llm,
            store,
            model: model.into(),
        }
    }

    pub async fn generate_learning_path(&self, user_id: &str, skill: &SkillSnapshot) -> AppResult<String> {
        skill.validate()?;

        let content = self.generate(prompts::learning_path(skill)).await?;
        self.save(
            user_id,
            format!("Learning Path: {}", skill.name),
            &content,
            RecommendationKind::LearningPath,
            vec![skill.id],
        )
        .await?;

        info!(skill_id = skill.id, "Generated learning path");
        Ok(content)
    }

    pub async fn generate_weekly_schedule(&self, user_id: &str, skills: &[SkillSnapshot]) -> AppResult<String> {
        let active = active_skills(skills)?;
        if active.is_empty() {
            return Ok(NO_ACTIVE_SKILLS_SCHEDULE.to_string());
        }

        let content = self.generate(prompts::weekly_schedule(&active)).await?;
        self.save(
            user_id,
            "Weekly Study Schedule".to_string(),
            &content,
            RecommendationKind::WeeklySchedule,
            active.iter().map(|s| s.id).collect(),
        )
        .await?;

        info!(user_id, "Generated weekly schedule");
        Ok(content)
    }

    pub async fn generate_skill_gap_analysis(&self, user_id: &str, skills: &[SkillSnapshot]) -> AppResult<String> {
        let active = active_skills(skills)?;
        if active.is_empty() {
            return Ok(NO_SKILLS_GAP_ANALYSIS.to_string());
        }

        let content = self.generate(prompts::skill_gap_analysis(&active)).await?;
        self.save(
            user_id,
            "Skill Gap Analysis".to_string(),
            &content,
            RecommendationKind::SkillGapAnalysis,
            Vec::new(),
        )
        .await?;

        info!(user_id, "Generated skill gap analysis");
        Ok(content)
    }

    pub async fn list_recommendations(&self, user_id: &str) -> AppResult<Vec<Recommendation>> {
        self.store.list_active(user_id, LIST_LIMIT).await
    }

    pub async fn get_recommendation(&self, id: Uuid, user_id: &str) -> AppResult<Recommendation> {
        self.store
            .get(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recommendation not found".to_string()))
    }

    async fn generate(&self, prompt: String) -> AppResult<String> {
        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
            system_instruction: Some(prompts::SYSTEM_INSTRUCTION.to_string()),
        };
        Ok(self.llm.create_chat_completion(&request).await?.content)
    }

    async fn save(
        &self,
        user_id: &str,
        title: String,
        content: &str,
        kind: RecommendationKind,
        related_skill_ids: Vec<i64>,
    ) -> AppResult<()> {
        self.store
            .insert(Recommendation {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                title,
                content: content.to_string(),
                kind,
                generated_at: Utc::now(),
                is_active: true,
                related_skill_ids,
            })
            .await
    }
}

/// Active skills, each validated
fn active_skills(skills: &[SkillSnapshot]) -> AppResult<Vec<SkillSnapshot>> {
    let mut active = Vec::new();
    for skill in skills.iter().filter(|s| s.is_active) {
        skill.validate()?;
        active.push(skill.clone());
    }
    Ok(active)
}
