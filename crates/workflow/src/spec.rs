//! Declarative workflow definitions.

use std::collections::HashSet;
use std::path::Path;

use ironloom_core::AgentSpec;
use ironloom_core::error::WorkflowError;
use serde::{Deserialize, Serialize};

/// One sequential step: which agent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    pub agent: String,
}

/// A declarative workflow: agents plus an ordered step list.
///
/// ```toml
/// id = "research-pipeline"
/// name = "Research Pipeline"
/// task = "Write a briefing on Rust adoption"
///
/// [[agents]]
/// id = "researcher"
/// role = "Research specialist"
/// goal = "Collect facts with sources"
/// tools = ["web_search"]
///
/// [[steps]]
/// agent = "researcher"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub id: String,
    pub name: String,

    /// Seed task appended to the context before the first step.
    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub agents: Vec<AgentSpec>,

    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl WorkflowSpec {
    /// Parse a workflow from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, WorkflowError> {
        toml::from_str(raw).map_err(|err| WorkflowError::InvalidDefinition(err.to_string()))
    }

    /// Load and parse a workflow file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| WorkflowError::Io(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Check that the definition is executable: a non-empty id, at least one
    /// agent and step, unique top-level agent ids, and every step referencing
    /// a defined agent.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.id.trim().is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "workflow id is empty".into(),
            ));
        }
        if self.agents.is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "workflow defines no agents".into(),
            ));
        }
        if self.steps.is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "workflow defines no steps".into(),
            ));
        }

        let mut ids = HashSet::new();
        for agent in &self.agents {
            if !ids.insert(agent.id.as_str()) {
                return Err(WorkflowError::InvalidDefinition(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
        }
        for step in &self.steps {
            if !ids.contains(step.agent.as_str()) {
                return Err(WorkflowError::UnknownAgent(step.agent.clone()));
            }
        }
        Ok(())
    }

    /// Look up a top-level agent definition by id.
    pub fn agent(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.id == id)
    }
}
