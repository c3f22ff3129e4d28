//! Core abstractions for the ironloom agent engine.
//!
//! This crate defines the framework-free contracts everything else builds on:
//! errors, the gateway trait for language model backends, the tool trait and
//! registry, the memory store trait, workflow context, and declarative agent
//! definitions. It deliberately carries no provider, no storage backend, and
//! no runtime; those live in the dedicated crates.

pub mod agent;
pub mod context;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod tool;

pub use agent::AgentSpec;
pub use context::{Message, WorkflowContext};
pub use error::{Error, GenerationError, MemoryError, Result, ToolError, WorkflowError};
pub use gateway::{Gateway, GenerationResponse, ToolCall, ToolDefinition};
pub use memory::{Embedder, MemoryEntry, MemoryScope, MemoryStore, ALL_WORKFLOWS};
pub use tool::{Tool, ToolRegistry};
