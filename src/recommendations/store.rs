use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::models::Recommendation;
use crate::types::AppResult;

/// Where generated recommendations are kept
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn insert(&self, recommendation: Recommendation) -> AppResult<()>;

    /// Active recommendations for a user, newest first
    async fn list_active(&self, user_id: &str, limit: usize) -> AppResult<Vec<Recommendation>>;

    async fn get(&self, id: Uuid, user_id: &str) -> AppResult<Option<Recommendation>>;
}

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    items: RwLock<Vec<Recommendation>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn insert(&self, recommendation: Recommendation) -> AppResult<()> {
        self.items.write().await.push(recommendation);
        Ok(())
    }

    async fn list_active(&self, user_id: &str, limit: usize) -> AppResult<Vec<Recommendation>> {
        let items = self.items.read().await;
        let mut found: Vec<Recommendation> = items
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        found.truncate(limit);
        Ok(found)
    }

    async fn get(&self, id: Uuid, user_id: &str) -> AppResult<Option<Recommendation>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecommendationKind;
    use chrono::{Duration, Utc};

    fn recommendation(user_id: &str, minutes_ago: i64, is_active: bool) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: format!("Generated {} minutes ago", minutes_ago),
            content: "content".to_string(),
            kind: RecommendationKind::WeeklySchedule,
            generated_at: Utc::now() - Duration::minutes(minutes_ago),
            is_active,
            related_skill_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped() {
        let store = InMemoryRecommendationStore::new();
        store.insert(recommendation("alice", 30, true)).await.unwrap();
        store.insert(recommendation("alice", 5, true)).await.unwrap();
        store.insert(recommendation("alice", 1, false)).await.unwrap();
        store.insert(recommendation("bob", 2, true)).await.unwrap();

        let listed = store.list_active("alice", 20).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Generated 5 minutes ago", "Generated 30 minutes ago"]);

        assert_eq!(store.list_active("alice", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_requires_owner() {
        let store = InMemoryRecommendationStore::new();
        let rec = recommendation("alice", 0, true);
        let id = rec.id;
        store.insert(rec).await.unwrap();

        assert!(store.get(id, "alice").await.unwrap().is_some());
        assert!(store.get(id, "bob").await.unwrap().is_none());
    }
}
