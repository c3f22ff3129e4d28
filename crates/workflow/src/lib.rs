//! Workflow engine — declarative agent pipelines executed step by step.
//!
//! A [`WorkflowSpec`] is loaded from TOML: agent definitions (with nested
//! sub-agents and tool grants) plus an ordered step list referencing agent
//! ids. The [`WorkflowExecutor`] materializes the agents, seeds a shared
//! context with the optional initial task, and runs the steps sequentially.
//! Every step's output is appended to the context, recorded under the agent's
//! id, and persisted to long-term memory when a store is configured.

pub mod executor;
pub mod spec;

pub use executor::{StepOutput, WorkflowExecutor, WorkflowRun};
pub use spec::{StepSpec, WorkflowSpec};
