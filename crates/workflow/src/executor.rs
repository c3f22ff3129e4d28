//! Sequential workflow execution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use ironloom_agent::Agent;
use ironloom_core::error::WorkflowError;
use ironloom_core::memory::{MemoryEntry, MemoryStore};
use ironloom_core::{Gateway, Result, ToolRegistry, WorkflowContext};
use tracing::{info, warn};

use crate::spec::WorkflowSpec;

/// The outcome of one executed step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub agent_id: String,
    pub output: String,
}

/// The report returned by a completed workflow execution.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub workflow_id: String,
    pub steps: Vec<StepOutput>,
    pub duration: Duration,
}

impl WorkflowRun {
    /// The last step's output, which is the workflow's overall result.
    pub fn final_output(&self) -> Option<&str> {
        self.steps.last().map(|step| step.output.as_str())
    }
}

/// Runs workflow steps in order against one shared context.
pub struct WorkflowExecutor {
    gateway: Arc<dyn Gateway>,
    registry: Option<Arc<ToolRegistry>>,
    memory: Option<Arc<dyn MemoryStore>>,
}

impl WorkflowExecutor {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            registry: None,
            memory: None,
        }
    }

    /// Attach a tool registry shared by every agent in the workflow.
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attach a memory store for recall and step persistence.
    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Execute every step of the workflow in order.
    ///
    /// The context is shared across steps: each agent sees the accumulated
    /// history, and each step's output is appended for the agents after it.
    pub async fn execute(&self, spec: &WorkflowSpec) -> Result<WorkflowRun> {
        spec.validate()?;

        let started = Instant::now();
        info!(workflow = %spec.id, name = %spec.name, steps = spec.steps.len(), "Workflow started");

        let agents: Vec<Agent> = spec
            .agents
            .iter()
            .map(|agent| Agent::from_spec(agent, self.gateway.clone(), self.registry.clone()))
            .collect();

        let mut context = match &self.memory {
            Some(memory) => WorkflowContext::with_memory(memory.clone()),
            None => WorkflowContext::new(),
        };
        if let Some(task) = &spec.task {
            context.add_message("user", task.clone());
        }

        let mut steps = Vec::with_capacity(spec.steps.len());
        for (index, step) in spec.steps.iter().enumerate() {
            let ordinal = (index + 1) as u32;
            let agent = agents
                .iter()
                .find(|a| a.id() == step.agent)
                .ok_or_else(|| WorkflowError::UnknownAgent(step.agent.clone()))?;

            info!(workflow = %spec.id, step = ordinal, agent = %agent.id(), "Running step");
            let output = agent.run(&mut context).await?;

            context.add_message(agent.id(), output.clone());
            context.set_output(agent.id(), output.clone());
            self.persist_step(spec, ordinal, agent.id(), &output).await;

            steps.push(StepOutput {
                agent_id: agent.id().to_string(),
                output,
            });
        }

        let duration = started.elapsed();
        info!(
            workflow = %spec.id,
            steps = steps.len(),
            duration_ms = duration.as_millis() as u64,
            "Workflow finished"
        );

        Ok(WorkflowRun {
            workflow_id: spec.id.clone(),
            steps,
            duration,
        })
    }

    /// Save a step's output to long-term memory. Failures are logged and
    /// swallowed so persistence never fails a workflow.
    async fn persist_step(&self, spec: &WorkflowSpec, ordinal: u32, agent_id: &str, output: &str) {
        let Some(memory) = &self.memory else {
            return;
        };

        let entry = MemoryEntry {
            agent_id: agent_id.to_string(),
            workflow_id: spec.id.clone(),
            step: ordinal,
            content: output.to_string(),
            timestamp: Utc::now(),
        };
        if let Err(err) = memory.save(entry).await {
            warn!(workflow = %spec.id, agent = %agent_id, error = %err, "Failed to save step output to memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ironloom_core::error::{GenerationError, MemoryError};
    use ironloom_core::memory::MemoryScope;
    use ironloom_core::{Error, GenerationResponse, ToolDefinition};
    use ironloom_memory::InMemoryStore;
    use std::sync::Mutex;

    /// Returns queued text responses and records every prompt.
    struct ScriptedGateway {
        script: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn text(lines: &[&str]) -> Self {
            Self {
                script: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut script = self.script.lock().unwrap();
            assert!(!script.is_empty(), "gateway script exhausted");
            Ok(script.remove(0))
        }

        async fn generate_with_tools(
            &self,
            prompt: &str,
            _tools: &[ToolDefinition],
        ) -> std::result::Result<GenerationResponse, GenerationError> {
            self.generate(prompt).await.map(GenerationResponse::Text)
        }
    }

    /// Accepts queries, rejects saves.
    struct RejectingSaveStore;

    #[async_trait]
    impl MemoryStore for RejectingSaveStore {
        fn name(&self) -> &str {
            "rejecting"
        }
        async fn save(&self, _entry: MemoryEntry) -> std::result::Result<(), MemoryError> {
            Err(MemoryError::Storage("disk full".into()))
        }
        async fn query(
            &self,
            _query: &str,
            _scope: MemoryScope,
            _limit: usize,
        ) -> std::result::Result<Vec<MemoryEntry>, MemoryError> {
            Ok(vec![])
        }
        async fn clear(&self) -> std::result::Result<(), MemoryError> {
            Ok(())
        }
    }

    fn two_step_spec() -> WorkflowSpec {
        WorkflowSpec::from_toml_str(
            r#"
id = "wf-report"
name = "Report"
task = "Summarize Rust adoption"

[[agents]]
id = "researcher"
role = "Researcher"
goal = "Collect facts"

[[agents]]
id = "writer"
role = "Writer"
goal = "Write prose"

[[steps]]
agent = "researcher"

[[steps]]
agent = "writer"
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn runs_steps_in_order_and_reports_outputs() {
        let gateway = Arc::new(ScriptedGateway::text(&[
            "Adoption grew 20 percent.",
            "Report: adoption grew 20 percent.",
        ]));
        let executor = WorkflowExecutor::new(gateway.clone());

        let run = executor.execute(&two_step_spec()).await.unwrap();

        assert_eq!(run.workflow_id, "wf-report");
        assert_eq!(run.steps.len(), 2);
        assert_eq!(run.steps[0].agent_id, "researcher");
        assert_eq!(run.steps[0].output, "Adoption grew 20 percent.");
        assert_eq!(run.steps[1].agent_id, "writer");
        assert_eq!(run.final_output(), Some("Report: adoption grew 20 percent."));
    }

    #[tokio::test]
    async fn later_steps_see_earlier_outputs_and_the_seed_task() {
        let gateway = Arc::new(ScriptedGateway::text(&[
            "Adoption grew 20 percent.",
            "Report ready.",
        ]));
        let executor = WorkflowExecutor::new(gateway.clone());

        executor.execute(&two_step_spec()).await.unwrap();

        let first_prompt = gateway.prompt(0);
        assert!(first_prompt.contains("Agent user: Summarize Rust adoption"));

        let second_prompt = gateway.prompt(1);
        assert!(second_prompt.contains("Agent user: Summarize Rust adoption"));
        assert!(second_prompt.contains("Agent researcher: Adoption grew 20 percent."));
    }

    #[tokio::test]
    async fn step_outputs_are_persisted_to_memory() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::text(&[
            "Adoption grew 20 percent.",
            "Report ready.",
        ]));
        let executor = WorkflowExecutor::new(gateway).with_memory(store.clone());

        executor.execute(&two_step_spec()).await.unwrap();

        let entries = store
            .query(
                "adoption grew",
                MemoryScope::Workflow("wf-report".into()),
                10,
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].agent_id, "researcher");
        assert_eq!(entries[0].step, 1);
        assert_eq!(entries[0].workflow_id, "wf-report");
    }

    #[tokio::test]
    async fn memory_save_failures_do_not_fail_the_workflow() {
        let gateway = Arc::new(ScriptedGateway::text(&["Facts.", "Prose."]));
        let executor = WorkflowExecutor::new(gateway).with_memory(Arc::new(RejectingSaveStore));

        let run = executor.execute(&two_step_spec()).await.unwrap();
        assert_eq!(run.steps.len(), 2);
    }

    #[tokio::test]
    async fn invalid_spec_fails_before_any_generation() {
        let gateway = Arc::new(ScriptedGateway::text(&[]));
        let executor = WorkflowExecutor::new(gateway.clone());

        let mut spec = two_step_spec();
        spec.steps[1].agent = "phantom".into();

        let err = executor.execute(&spec).await.unwrap_err();
        match err {
            Error::Workflow(WorkflowError::UnknownAgent(id)) => assert_eq!(id, "phantom"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(gateway.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_failures_propagate_with_partial_progress_discarded() {
        struct FailingGateway;

        #[async_trait]
        impl Gateway for FailingGateway {
            fn name(&self) -> &str {
                "failing"
            }
            async fn generate(
                &self,
                _prompt: &str,
            ) -> std::result::Result<String, GenerationError> {
                Err(GenerationError::ServerError("upstream 503".into()))
            }
            async fn generate_with_tools(
                &self,
                _prompt: &str,
                _tools: &[ToolDefinition],
            ) -> std::result::Result<GenerationResponse, GenerationError> {
                Err(GenerationError::ServerError("upstream 503".into()))
            }
        }

        let executor = WorkflowExecutor::new(Arc::new(FailingGateway));
        let err = executor.execute(&two_step_spec()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
