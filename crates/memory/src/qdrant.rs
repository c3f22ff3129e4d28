//! Qdrant store binding — vector search over the REST API.
//!
//! Points carry the memory entry as payload and an embedding of the content
//! as the vector. Retrieval embeds the query text and searches the
//! collection, with a `workflow_id` payload filter unless the scope is
//! widened to all workflows.

use async_trait::async_trait;
use ironloom_core::error::MemoryError;
use ironloom_core::memory::{Embedder, MemoryEntry, MemoryScope, MemoryStore};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding::EMBEDDING_DIM;

pub struct QdrantStore {
    base_url: String,
    api_key: Option<String>,
    collection: String,
    embedder: Arc<dyn Embedder>,
    client: reqwest::Client,
}

impl QdrantStore {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        collection: impl Into<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            api_key,
            collection: collection.into(),
            embedder,
            client,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    /// Create the collection if it does not exist yet.
    ///
    /// Returns `true` when a new collection was created.
    pub async fn ensure_collection(&self) -> Result<bool, MemoryError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", self.collection),
            )
            .send()
            .await
            .map_err(|e| MemoryError::Storage(format!("Qdrant request failed: {e}")))?;

        match response.status().as_u16() {
            200 => {
                debug!(collection = %self.collection, "Collection already exists");
                Ok(false)
            }
            404 => {
                self.create_collection().await?;
                info!(collection = %self.collection, "Created collection");
                Ok(true)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(MemoryError::Storage(format!(
                    "Qdrant returned {status}: {body}"
                )))
            }
        }
    }

    async fn create_collection(&self) -> Result<(), MemoryError> {
        let body = serde_json::json!({
            "vectors": { "size": EMBEDDING_DIM, "distance": "Cosine" }
        });

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}", self.collection),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| MemoryError::Storage(format!("Qdrant request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Storage(format!(
                "Failed to create collection ({status}): {body}"
            )));
        }
        Ok(())
    }

    async fn delete_collection(&self) -> Result<(), MemoryError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/collections/{}", self.collection),
            )
            .send()
            .await
            .map_err(|e| MemoryError::Storage(format!("Qdrant request failed: {e}")))?;

        // A missing collection is already cleared.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Storage(format!(
                "Failed to delete collection ({status}): {body}"
            )));
        }
        Ok(())
    }
}

/// Upsert body for one entry.
fn point_body(id: Uuid, vector: Vec<f32>, entry: &MemoryEntry) -> serde_json::Value {
    serde_json::json!({
        "points": [{
            "id": id.to_string(),
            "vector": vector,
            "payload": {
                "agent_id": entry.agent_id,
                "workflow_id": entry.workflow_id,
                "step": entry.step,
                "content": entry.content,
                "timestamp": entry.timestamp,
            }
        }]
    })
}

/// Search body for a query vector, with a workflow filter unless the scope
/// covers all workflows.
fn search_body(vector: Vec<f32>, scope: &MemoryScope, limit: usize) -> serde_json::Value {
    let mut body = serde_json::json!({
        "vector": vector,
        "limit": limit,
        "with_payload": true,
    });

    if let Some(workflow_id) = scope.workflow_id() {
        body["filter"] = serde_json::json!({
            "must": [{ "key": "workflow_id", "match": { "value": workflow_id } }]
        });
    }

    body
}

fn entry_from_payload(payload: serde_json::Value) -> Option<MemoryEntry> {
    match serde_json::from_value(payload) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(error = %e, "Skipping point with malformed payload");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    payload: serde_json::Value,
}

#[async_trait]
impl MemoryStore for QdrantStore {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn save(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        let vector = self.embedder.embed(&entry.content).await?;
        let body = point_body(Uuid::new_v4(), vector, &entry);

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", self.collection),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| MemoryError::Storage(format!("Qdrant request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::Storage(format!(
                "Failed to upsert point ({status}): {text}"
            )));
        }

        debug!(
            agent_id = %entry.agent_id,
            workflow_id = %entry.workflow_id,
            "Saved memory point"
        );
        Ok(())
    }

    async fn query(
        &self,
        query: &str,
        scope: MemoryScope,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let vector = self.embedder.embed(query).await?;
        let body = search_body(vector, &scope, limit);

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", self.collection),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| MemoryError::QueryFailed(format!("Qdrant request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::QueryFailed(format!(
                "Search failed ({status}): {text}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::QueryFailed(format!("Failed to parse search result: {e}")))?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|point| entry_from_payload(point.payload))
            .collect())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.delete_collection().await?;
        self.create_collection().await?;
        info!(collection = %self.collection, "Cleared memory collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry() -> MemoryEntry {
        MemoryEntry {
            agent_id: "researcher".into(),
            workflow_id: "wf-1".into(),
            step: 3,
            content: "Found the answer".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn point_body_carries_entry_payload() {
        let id = Uuid::new_v4();
        let body = point_body(id, vec![0.1, 0.2], &entry());

        let point = &body["points"][0];
        assert_eq!(point["id"], id.to_string());
        assert_eq!(point["payload"]["agent_id"], "researcher");
        assert_eq!(point["payload"]["workflow_id"], "wf-1");
        assert_eq!(point["payload"]["step"], 3);
    }

    #[test]
    fn search_body_filters_by_workflow() {
        let body = search_body(vec![0.5], &MemoryScope::Workflow("wf-9".into()), 3);
        assert_eq!(body["limit"], 3);
        assert_eq!(body["with_payload"], true);
        assert_eq!(body["filter"]["must"][0]["key"], "workflow_id");
        assert_eq!(body["filter"]["must"][0]["match"]["value"], "wf-9");
    }

    #[test]
    fn all_workflows_scope_has_no_filter() {
        let body = search_body(vec![0.5], &MemoryScope::AllWorkflows, 3);
        assert!(body.get("filter").is_none());
    }

    #[test]
    fn payload_round_trips_to_entry() {
        let original = entry();
        let payload = serde_json::to_value(&original).unwrap();
        let restored = entry_from_payload(payload).unwrap();
        assert_eq!(restored.agent_id, original.agent_id);
        assert_eq!(restored.content, original.content);
    }

    #[test]
    fn malformed_payload_is_dropped() {
        let payload = serde_json::json!({"unexpected": "shape"});
        assert!(entry_from_payload(payload).is_none());
    }

    #[test]
    fn search_response_parsing() {
        let data = r#"{
            "result": [
                {"id": "a", "score": 0.9, "payload": {
                    "agent_id": "x", "workflow_id": "wf-1", "step": 1,
                    "content": "hello", "timestamp": "2026-01-01T00:00:00Z"
                }}
            ],
            "status": "ok",
            "time": 0.001
        }"#;
        let parsed: SearchResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.result.len(), 1);
        let restored = entry_from_payload(parsed.result.into_iter().next().unwrap().payload);
        assert_eq!(restored.unwrap().content, "hello");
    }
}
