//! The agent runtime — the execution engine behind every workflow step.
//!
//! An [`Agent`] is built from a declarative `AgentSpec` and runs in one of
//! two modes, chosen per invocation:
//!
//! 1. **Tool mode** — when the agent declares tools and a registry is
//!    attached, the gateway is called with tool definitions. Requested tool
//!    invocations are executed and their results become the agent's output.
//! 2. **Delegation mode** — otherwise, the agent generates plain text and may
//!    hand part of its task to a sub-agent by emitting a `DELEGATE_TO:`
//!    marker. The sub-agent runs in an isolated context, and the parent
//!    resumes with the sub-agent's result folded into a follow-up prompt.
//!
//! Either way, the agent reads and appends to a shared `WorkflowContext`,
//! which is the single source of truth for execution history.

mod delegation;
mod prompt;
pub mod runner;

pub use runner::Agent;
