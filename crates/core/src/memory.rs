//! Memory store trait and entry types.
//!
//! Agents persist step outputs as memory entries and retrieve relevant past
//! entries during prompt assembly. Stores own their relevance ordering; the
//! engine only asks for "the best `limit` entries for this query text".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// The sentinel scope value that widens retrieval across every workflow.
pub const ALL_WORKFLOWS: &str = "all-workflows";

/// One persisted unit of agent memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// The agent that produced the content.
    pub agent_id: String,

    /// The workflow execution the entry belongs to.
    pub workflow_id: String,

    /// Step ordinal within the workflow.
    pub step: u32,

    /// The remembered text.
    pub content: String,

    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
}

/// Which workflows a retrieval query may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryScope {
    /// No workflow filter: search across all workflows.
    AllWorkflows,
    /// Restrict retrieval to one workflow id.
    Workflow(String),
}

impl MemoryScope {
    /// Interpret a raw scope string, honoring the `all-workflows` sentinel.
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_WORKFLOWS {
            Self::AllWorkflows
        } else {
            Self::Workflow(raw.to_string())
        }
    }

    /// The workflow id to filter on, or `None` for the widening sentinel.
    pub fn workflow_id(&self) -> Option<&str> {
        match self {
            Self::AllWorkflows => None,
            Self::Workflow(id) => Some(id),
        }
    }
}

/// A store of workflow memories.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend's name, e.g. "qdrant" or "file".
    fn name(&self) -> &str;

    /// Persist one entry.
    async fn save(&self, entry: MemoryEntry) -> Result<(), MemoryError>;

    /// Retrieve up to `limit` entries relevant to `query`, most relevant
    /// first, restricted by `scope`.
    async fn query(
        &self,
        query: &str,
        scope: MemoryScope,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Remove every stored entry.
    async fn clear(&self) -> Result<(), MemoryError>;
}

/// Produces embedding vectors for text, for stores that rank by vector
/// similarity.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;
}
