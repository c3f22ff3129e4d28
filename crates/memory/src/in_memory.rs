//! In-memory store — useful for testing and runs that want recall without
//! persistence.

use async_trait::async_trait;
use ironloom_core::error::MemoryError;
use ironloom_core::memory::{MemoryEntry, MemoryScope, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps entries in a Vec, ranked by keyword relevance.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn query(
        &self,
        query: &str,
        scope: MemoryScope,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.entries.read().await;
        let query_lower = query.to_lowercase();

        let mut scored: Vec<(f32, MemoryEntry)> = entries
            .iter()
            .filter(|e| match scope.workflow_id() {
                Some(id) => e.workflow_id == id,
                None => true,
            })
            .filter(|e| {
                e.content.to_lowercase().contains(&query_lower)
                    || e.agent_id.to_lowercase().contains(&query_lower)
            })
            .map(|e| {
                // Simple keyword relevance score
                let occurrences = e.content.to_lowercase().matches(&query_lower).count();
                let score = occurrences as f32 / (e.content.len() as f32 / 100.0).max(1.0);
                (score, e.clone())
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, e)| e).collect())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(agent_id: &str, workflow_id: &str, content: &str) -> MemoryEntry {
        MemoryEntry {
            agent_id: agent_id.into(),
            workflow_id: workflow_id.into(),
            step: 0,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_and_query_by_keyword() {
        let store = InMemoryStore::new();
        store
            .save(entry("a", "wf-1", "Rust is great for systems programming"))
            .await
            .unwrap();
        store
            .save(entry("b", "wf-1", "Python is great for scripting"))
            .await
            .unwrap();

        let results = store
            .query("rust", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("Rust"));
    }

    #[tokio::test]
    async fn agent_id_matches_too() {
        let store = InMemoryStore::new();
        store
            .save(entry("researcher", "wf-1", "collected sources"))
            .await
            .unwrap();

        let results = store
            .query("researcher", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn workflow_scope_filters() {
        let store = InMemoryStore::new();
        store.save(entry("a", "wf-1", "shared topic")).await.unwrap();
        store.save(entry("a", "wf-2", "shared topic")).await.unwrap();

        let scoped = store
            .query("topic", MemoryScope::Workflow("wf-1".into()), 10)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].workflow_id, "wf-1");

        let all = store
            .query("topic", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn limit_is_honored() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .save(entry("a", "wf-1", &format!("note {i} about agents")))
                .await
                .unwrap();
        }

        let results = store
            .query("agents", MemoryScope::AllWorkflows, 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryStore::new();
        store.save(entry("a", "wf-1", "something")).await.unwrap();
        store.clear().await.unwrap();

        let results = store
            .query("something", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
