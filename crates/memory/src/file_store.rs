//! File-based store — one JSON file of entries per workflow.
//!
//! Each workflow's history lives at `{storage_dir}/{workflow_id}.json` as a
//! pretty-printed array, so runs are human-inspectable with nothing but an
//! editor. Missing files read as empty stores, not errors.

use async_trait::async_trait;
use ironloom_core::error::MemoryError;
use ironloom_core::memory::{MemoryEntry, MemoryScope, MemoryStore};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        let storage_dir = storage_dir.into();
        debug!(dir = %storage_dir.display(), "File memory store configured");
        Self { storage_dir }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn workflow_path(&self, workflow_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{workflow_id}.json"))
    }

    fn ensure_storage_dir(&self) -> Result<(), MemoryError> {
        std::fs::create_dir_all(&self.storage_dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create storage directory: {e}"))
        })
    }

    /// Load one workflow's entries. A missing file is an empty history; an
    /// unreadable one is skipped with a warning rather than failing the run.
    fn load_entries(&self, path: &Path) -> Vec<MemoryEntry> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping corrupted memory file");
                Vec::new()
            }
        }
    }

    fn write_entries(&self, path: &Path, entries: &[MemoryEntry]) -> Result<(), MemoryError> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize entries: {e}")))?;
        std::fs::write(path, content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }

    /// Entries visible to a scope, in stored (chronological) order.
    fn entries_in_scope(&self, scope: &MemoryScope) -> Result<Vec<MemoryEntry>, MemoryError> {
        match scope.workflow_id() {
            Some(id) => Ok(self.load_entries(&self.workflow_path(id))),
            None => {
                let dir = match std::fs::read_dir(&self.storage_dir) {
                    Ok(dir) => dir,
                    Err(_) => return Ok(Vec::new()),
                };

                let mut all = Vec::new();
                for entry in dir.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        all.extend(self.load_entries(&path));
                    }
                }
                all.sort_by_key(|e| e.timestamp);
                Ok(all)
            }
        }
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        self.ensure_storage_dir()?;
        let path = self.workflow_path(&entry.workflow_id);
        let mut entries = self.load_entries(&path);
        entries.push(entry);
        self.write_entries(&path, &entries)
    }

    async fn query(
        &self,
        query: &str,
        scope: MemoryScope,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.entries_in_scope(&scope)?;
        let query_lower = query.to_lowercase();

        let filtered: Vec<MemoryEntry> = entries
            .into_iter()
            .filter(|e| {
                e.content.to_lowercase().contains(&query_lower)
                    || e.agent_id.to_lowercase().contains(&query_lower)
            })
            .collect();

        // Most recent entries up to limit, newest first.
        let skip = filtered.len().saturating_sub(limit);
        let mut recent: Vec<MemoryEntry> = filtered.into_iter().skip(skip).collect();
        recent.reverse();
        Ok(recent)
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        let dir = match std::fs::read_dir(&self.storage_dir) {
            Ok(dir) => dir,
            Err(_) => return Ok(()),
        };

        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path).map_err(|e| {
                    MemoryError::Storage(format!("Failed to remove memory file: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(agent_id: &str, workflow_id: &str, content: &str, age_secs: i64) -> MemoryEntry {
        MemoryEntry {
            agent_id: agent_id.into(),
            workflow_id: workflow_id.into(),
            step: 0,
            content: content.into(),
            timestamp: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn save_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .save(entry("writer", "wf-1", "Drafted the summary", 0))
            .await
            .unwrap();

        let reopened = FileStore::new(dir.path());
        let results = reopened
            .query("summary", MemoryScope::Workflow("wf-1".into()), 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].agent_id, "writer");
    }

    #[tokio::test]
    async fn query_matches_content_and_agent_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .save(entry("researcher", "wf-1", "gathered data", 0))
            .await
            .unwrap();
        store
            .save(entry("writer", "wf-1", "wrote about researchers", 0))
            .await
            .unwrap();

        let results = store
            .query("researcher", MemoryScope::Workflow("wf-1".into()), 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn returns_most_recent_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for i in 0..4 {
            store
                .save(entry("a", "wf-1", &format!("note number {i}"), 0))
                .await
                .unwrap();
        }

        let results = store
            .query("note", MemoryScope::Workflow("wf-1".into()), 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "note number 3");
        assert_eq!(results[1].content, "note number 2");
    }

    #[tokio::test]
    async fn all_workflows_scope_scans_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save(entry("a", "wf-1", "alpha topic", 20)).await.unwrap();
        store.save(entry("b", "wf-2", "beta topic", 10)).await.unwrap();

        let results = store
            .query("topic", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        // Newest first across workflows.
        assert_eq!(results[0].workflow_id, "wf-2");
    }

    #[tokio::test]
    async fn missing_directory_reads_as_empty() {
        let store = FileStore::new("/nonexistent/ironloom_test_memory");
        let results = store
            .query("anything", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn corrupted_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wf-bad.json"), "this is not json").unwrap();

        let store = FileStore::new(dir.path());
        store.save(entry("a", "wf-good", "valid note", 0)).await.unwrap();

        let results = store
            .query("note", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_all_workflow_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save(entry("a", "wf-1", "one", 0)).await.unwrap();
        store.save(entry("b", "wf-2", "two", 0)).await.unwrap();

        store.clear().await.unwrap();

        let results = store
            .query("", MemoryScope::AllWorkflows, 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
