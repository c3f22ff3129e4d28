//! Agent runner — drives one agent invocation end to end.
//!
//! The mode is chosen per invocation: tool mode when the agent declares
//! tools and a registry is attached, delegation mode otherwise. Tool
//! results and delegation outcomes are folded back into plain text, so a
//! caller always receives a single string output.

use std::sync::Arc;

use futures::future::join_all;
use ironloom_core::{
    AgentSpec, Gateway, GenerationResponse, Result, ToolCall, ToolError, ToolRegistry,
    WorkflowContext,
};
use tracing::{debug, info, warn};

use crate::delegation::parse_delegation;
use crate::prompt::{DelegateSummary, PromptBuilder};

/// Upper bound on generation attempts per tool-mode invocation.
const MAX_TOOL_ITERATIONS: u32 = 5;

/// Returned when the tool loop exhausts its budget without a usable response.
const NO_RESPONSE_FALLBACK: &str = "No response generated";

/// A runnable agent: an [`AgentSpec`] bound to a gateway and, optionally, a
/// tool registry. Sub-agents are materialized recursively with the same
/// bindings.
pub struct Agent {
    id: String,
    role: String,
    goal: String,
    tools: Vec<String>,
    sub_agents: Vec<Agent>,
    gateway: Arc<dyn Gateway>,
    registry: Option<Arc<ToolRegistry>>,
}

impl Agent {
    /// Materialize a spec and its whole sub-agent tree.
    pub fn from_spec(
        spec: &AgentSpec,
        gateway: Arc<dyn Gateway>,
        registry: Option<Arc<ToolRegistry>>,
    ) -> Self {
        let sub_agents = spec
            .sub_agents
            .iter()
            .map(|sub| Agent::from_spec(sub, gateway.clone(), registry.clone()))
            .collect();
        Self {
            id: spec.id.clone(),
            role: spec.role.clone(),
            goal: spec.goal.clone(),
            tools: spec.tools.clone(),
            sub_agents,
            gateway,
            registry,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Agents this one may delegate to.
    pub fn sub_agents(&self) -> &[Agent] {
        &self.sub_agents
    }

    /// Run one invocation against the shared context.
    pub async fn run(&self, context: &mut WorkflowContext) -> Result<String> {
        info!(agent = %self.id, role = %self.role, "Agent run started");
        if !self.tools.is_empty() {
            if let Some(registry) = self.registry.as_deref() {
                return self.run_with_tools(registry, context).await;
            }
        }
        self.run_with_delegation(context).await
    }

    async fn build_prompt(&self, context: &WorkflowContext) -> String {
        let delegates = self
            .sub_agents
            .iter()
            .map(|sub| DelegateSummary {
                id: &sub.id,
                role: &sub.role,
                goal: &sub.goal,
            })
            .collect();
        PromptBuilder::new(&self.id, &self.role, &self.goal)
            .tools(&self.tools)
            .delegates(delegates)
            .build(context)
            .await
    }

    /// Tool mode: generate with tool definitions until the provider answers
    /// in text, requests tool calls, or the iteration budget runs out.
    ///
    /// The prompt is built once; every iteration resends it unchanged.
    async fn run_with_tools(
        &self,
        registry: &ToolRegistry,
        context: &WorkflowContext,
    ) -> Result<String> {
        let prompt = self.build_prompt(context).await;
        let definitions = registry.definitions_for(&self.tools);

        if definitions.is_empty() {
            debug!(agent = %self.id, "Declared tools have no registered handlers, generating without them");
            return Ok(self.gateway.generate(&prompt).await?);
        }

        let mut iterations = 0;
        while iterations < MAX_TOOL_ITERATIONS {
            iterations += 1;
            debug!(agent = %self.id, iteration = iterations, "Tool-mode generation");

            match self.gateway.generate_with_tools(&prompt, &definitions).await? {
                GenerationResponse::Text(text) => return Ok(text),
                GenerationResponse::ToolCalls(calls) if !calls.is_empty() => {
                    info!(agent = %self.id, count = calls.len(), "Executing requested tool calls");
                    return Ok(self.process_tool_calls(registry, &calls).await);
                }
                GenerationResponse::ToolCalls(_) => {
                    warn!(agent = %self.id, iteration = iterations, "Provider returned an empty tool-call batch");
                }
            }
        }

        warn!(agent = %self.id, "Tool-mode iteration budget exhausted");
        Ok(NO_RESPONSE_FALLBACK.to_string())
    }

    /// Execute every requested call and fold the results into one report.
    /// Sections appear in request order regardless of completion order.
    async fn process_tool_calls(&self, registry: &ToolRegistry, calls: &[ToolCall]) -> String {
        let results = join_all(calls.iter().map(|call| self.execute_tool(registry, call))).await;

        let sections: Vec<String> = calls
            .iter()
            .zip(results)
            .map(|(call, result)| {
                format!(
                    "Tool: {}\nArguments: {}\nResult: {}",
                    call.name, call.arguments, result
                )
            })
            .collect();

        format!("Tool execution results:\n{}", sections.join("\n---\n"))
    }

    /// Run one tool call, rendering failures as inline error text so a
    /// single bad call never poisons the batch.
    async fn execute_tool(&self, registry: &ToolRegistry, call: &ToolCall) -> String {
        debug!(agent = %self.id, tool = %call.name, args = %call.arguments, "Executing tool");
        match registry.execute(call).await {
            Ok(value) => value.to_string(),
            Err(ToolError::NotFound(name)) => format!("ERROR: Unknown tool {name}"),
            Err(err) => {
                warn!(agent = %self.id, tool = %call.name, error = %err, "Tool execution failed");
                format!("ERROR executing tool {}: {err}", call.name)
            }
        }
    }

    /// Delegation mode: generate once, and if the response carries a
    /// delegation marker, run the named sub-agent and resume with its result.
    async fn run_with_delegation(&self, context: &mut WorkflowContext) -> Result<String> {
        let prompt = self.build_prompt(context).await;
        let response = self.gateway.generate(&prompt).await?;

        let Some(delegation) = parse_delegation(&response) else {
            return Ok(response);
        };

        let Some(sub_agent) = self
            .sub_agents
            .iter()
            .find(|a| a.id == delegation.sub_agent_id)
        else {
            warn!(agent = %self.id, target = %delegation.sub_agent_id, "Delegation target not found");
            return Ok(format!(
                "ERROR: Sub-agent {} not found. Original response: {response}",
                delegation.sub_agent_id
            ));
        };

        info!(agent = %self.id, sub_agent = %sub_agent.id, task = %delegation.task, "Delegating task");

        // The sub-agent works in an isolated context seeded with the task
        // alone. It never sees the parent's history or memory handle.
        let mut sub_context = WorkflowContext::new();
        sub_context.add_message(
            &self.id,
            format!("Task delegated from parent agent: {}", delegation.task),
        );
        let sub_response = Box::pin(sub_agent.run(&mut sub_context)).await?;

        context.add_message(&sub_agent.id, sub_response.clone());

        let follow_up = format!(
            "{prompt}\n\nThe sub-agent {} has completed the delegated task with the following \
             result:\n{sub_response}\n\nNow please continue with your original task using this \
             information.",
            delegation.sub_agent_id
        );
        debug!(agent = %self.id, "Resuming after delegation");
        Ok(self.gateway.generate(&follow_up).await?)
    }
}
