//! Shared workflow context.
//!
//! One `WorkflowContext` exists per workflow execution. Every agent invoked
//! within that workflow sees the same context by reference: an append-only
//! message log (the authoritative execution history), a keyed output store,
//! and an optional handle to a memory store for retrieval augmentation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::memory::MemoryStore;

/// A single entry in the shared execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// The agent that produced this message
    pub agent_id: String,

    /// The text content
    pub content: String,

    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(agent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Shared state for one workflow execution.
///
/// The message log is append-only: no component ever removes or reorders
/// entries, so insertion order is the execution history. The context is owned
/// by the workflow invocation and passed by mutable reference through the
/// agent tree; it is never copied between agents.
#[derive(Default)]
pub struct WorkflowContext {
    messages: Vec<Message>,
    outputs: HashMap<String, serde_json::Value>,
    memory: Option<Arc<dyn MemoryStore>>,
}

impl WorkflowContext {
    /// Create an empty context with no memory store attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context backed by a memory store for retrieval augmentation.
    pub fn with_memory(memory: Arc<dyn MemoryStore>) -> Self {
        Self {
            messages: Vec::new(),
            outputs: HashMap::new(),
            memory: Some(memory),
        }
    }

    /// Append a message to the execution history.
    pub fn add_message(&mut self, agent_id: impl Into<String>, content: impl Into<String>) {
        self.messages.push(Message::new(agent_id, content));
    }

    /// The full execution history, in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Record a named output value.
    pub fn set_output(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.outputs.insert(key.into(), value.into());
    }

    /// Look up a previously recorded output.
    pub fn output(&self, key: &str) -> Option<&serde_json::Value> {
        self.outputs.get(key)
    }

    /// All recorded outputs.
    pub fn outputs(&self) -> &HashMap<String, serde_json::Value> {
        &self.outputs
    }

    /// The attached memory store, if one was configured.
    pub fn memory(&self) -> Option<&Arc<dyn MemoryStore>> {
        self.memory.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_insertion_order() {
        let mut ctx = WorkflowContext::new();
        ctx.add_message("researcher", "first");
        ctx.add_message("writer", "second");
        ctx.add_message("researcher", "third");

        let contents: Vec<&str> = ctx.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(ctx.last_message().map(|m| m.agent_id.as_str()), Some("researcher"));
    }

    #[test]
    fn message_ids_are_unique() {
        let mut ctx = WorkflowContext::new();
        ctx.add_message("a", "one");
        ctx.add_message("a", "two");
        assert_ne!(ctx.messages()[0].id, ctx.messages()[1].id);
    }

    #[test]
    fn outputs_round_trip() {
        let mut ctx = WorkflowContext::new();
        ctx.set_output("summary", "done");
        ctx.set_output("count", 3);

        assert_eq!(ctx.output("summary"), Some(&serde_json::json!("done")));
        assert_eq!(ctx.output("count"), Some(&serde_json::json!(3)));
        assert!(ctx.output("missing").is_none());
        assert_eq!(ctx.outputs().len(), 2);
    }

    #[test]
    fn fresh_context_has_no_memory() {
        let ctx = WorkflowContext::new();
        assert!(ctx.memory().is_none());
        assert!(ctx.messages().is_empty());
    }
}
