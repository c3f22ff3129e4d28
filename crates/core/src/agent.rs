//! Declarative agent definitions.
//!
//! An [`AgentSpec`] is the serializable description of an agent: who it is,
//! what it pursues, which tools it may call, and which sub-agents it can
//! delegate to. The runtime that executes a spec lives in the agent crate.

use serde::{Deserialize, Serialize};

/// A declarative agent definition. Sub-agents nest recursively, so a single
/// spec describes a whole delegation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier, also used as the delegation target name.
    pub id: String,

    /// The persona the agent adopts.
    pub role: String,

    /// What the agent is trying to accomplish.
    pub goal: String,

    /// Names of tools the agent may invoke.
    #[serde(default)]
    pub tools: Vec<String>,

    /// Agents this one may delegate to.
    #[serde(default)]
    pub sub_agents: Vec<AgentSpec>,
}

impl AgentSpec {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            tools: Vec::new(),
            sub_agents: Vec::new(),
        }
    }

    /// Grant the agent access to a named tool.
    pub fn with_tool(mut self, name: impl Into<String>) -> Self {
        self.tools.push(name.into());
        self
    }

    /// Attach a sub-agent this agent may delegate to.
    pub fn with_sub_agent(mut self, sub: AgentSpec) -> Self {
        self.sub_agents.push(sub);
        self
    }

    /// Look up a direct sub-agent by id.
    pub fn sub_agent(&self, id: &str) -> Option<&AgentSpec> {
        self.sub_agents.iter().find(|a| a.id == id)
    }
}
