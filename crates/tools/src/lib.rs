//! Built-in tools for ironloom agents.
//!
//! All tools implement the `ironloom_core::Tool` trait and register into a
//! `ToolRegistry`. Agents reference tools by name; only the named subset is
//! ever offered to the model.

use ironloom_config::ToolsConfig;
use ironloom_core::ToolRegistry;

pub mod file_system;
pub mod web_search;

pub use file_system::FileSystemTool;
pub use web_search::WebSearchTool;

/// The standard registry: web search plus the sandboxed file system.
pub fn default_registry(config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(config.max_search_results)));
    registry.register(Box::new(FileSystemTool::new(&config.output_root)));
    registry
}
