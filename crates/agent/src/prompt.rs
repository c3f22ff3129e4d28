//! Prompt assembly.
//!
//! Every generation call starts from one flat prompt: the agent's persona,
//! optional delegation and tool sections, retrieved memories, and the shared
//! execution history. Section order is fixed so the delegation parser always
//! sees the same layout.

use chrono::SecondsFormat;
use ironloom_core::{MemoryScope, Message, WorkflowContext};
use tracing::{debug, warn};

/// How many memories are folded into a prompt at most.
const RECALL_LIMIT: usize = 3;

/// How much of the last message feeds the recall query.
const RECALL_SNIPPET_CHARS: usize = 200;

/// What the prompt needs to know about one delegation target.
pub(crate) struct DelegateSummary<'a> {
    pub id: &'a str,
    pub role: &'a str,
    pub goal: &'a str,
}

/// Assembles the flat prompt for one generation call.
pub(crate) struct PromptBuilder<'a> {
    agent_id: &'a str,
    role: &'a str,
    goal: &'a str,
    tools: &'a [String],
    delegates: Vec<DelegateSummary<'a>>,
}

impl<'a> PromptBuilder<'a> {
    pub(crate) fn new(agent_id: &'a str, role: &'a str, goal: &'a str) -> Self {
        Self {
            agent_id,
            role,
            goal,
            tools: &[],
            delegates: Vec::new(),
        }
    }

    pub(crate) fn tools(mut self, tools: &'a [String]) -> Self {
        self.tools = tools;
        self
    }

    pub(crate) fn delegates(mut self, delegates: Vec<DelegateSummary<'a>>) -> Self {
        self.delegates = delegates;
        self
    }

    /// Build the full prompt for the given context.
    ///
    /// Memory retrieval happens here when the context carries a store; a
    /// failed retrieval degrades to a prompt without the memory section.
    pub(crate) async fn build(&self, context: &WorkflowContext) -> String {
        let delegation_section = self.delegation_section();
        let tools_section = self.tools_section();
        let memory_section = self.memory_section(context).await;
        let history = render_history(context.messages());

        format!(
            "You are an AI agent with the following role: {}\n\n\
             Your goal is: {}{}{}\n\n\
             {}\n\n\
             Current context:\n\
             {}\n\n\
             Do not ask questions. Complete the task independently and return a final answer.",
            self.role, self.goal, delegation_section, tools_section, memory_section, history
        )
    }

    fn delegation_section(&self) -> String {
        if self.delegates.is_empty() {
            return String::new();
        }
        let listing: Vec<String> = self
            .delegates
            .iter()
            .map(|d| format!("  - {}: {} (Goal: {})", d.id, d.role, d.goal))
            .collect();
        format!(
            "\n\nAvailable sub-agents you can delegate to:\n{}\n\n\
             If you need to delegate part of your task to a sub-agent, respond with: \
             DELEGATE_TO:<sub_agent_id>:<task_description_for_sub_agent>",
            listing.join("\n")
        )
    }

    fn tools_section(&self) -> String {
        if self.tools.is_empty() {
            return String::new();
        }
        let listing: Vec<String> = self.tools.iter().map(|t| format!("  - {t}")).collect();
        format!(
            "\n\n[INTERNET ACCESS AVAILABLE]\nAvailable tools:\n{}\n\n\
             You can use web_search to gather current information from the internet.",
            listing.join("\n")
        )
    }

    async fn memory_section(&self, context: &WorkflowContext) -> String {
        let Some(memory) = context.memory() else {
            return String::new();
        };

        let snippet: String = context
            .last_message()
            .map(|m| m.content.chars().take(RECALL_SNIPPET_CHARS).collect())
            .unwrap_or_default();
        let query = format!("Role: {}, Goal: {}. Context: {snippet}", self.role, self.goal);

        debug!(agent = %self.agent_id, "Querying memory for relevant context");
        let entries = match memory
            .query(&query, MemoryScope::AllWorkflows, RECALL_LIMIT)
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                warn!(agent = %self.agent_id, error = %err, "Memory query failed, continuing without recall");
                return String::new();
            }
        };
        if entries.is_empty() {
            return String::new();
        }

        debug!(agent = %self.agent_id, count = entries.len(), "Injecting memories into prompt");
        let rendered: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "Memory {} (from Agent {} at {}): {}",
                    i + 1,
                    entry.agent_id,
                    entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                    entry.content
                )
            })
            .collect();

        format!(
            "\n### Relevant Past Memories\n\
             The following information was retrieved from your long-term memory and may be \
             relevant to your current task:\n\n{}\n",
            rendered.join("\n\n")
        )
    }
}

/// One line per message, oldest first.
fn render_history(messages: &[Message]) -> String {
    let lines: Vec<String> = messages
        .iter()
        .map(|m| {
            format!(
                "[{}] Agent {}: {}",
                m.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                m.agent_id,
                m.content
            )
        })
        .collect();
    lines.join("\n")
}
