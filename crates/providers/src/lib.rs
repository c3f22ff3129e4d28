//! LLM gateway implementations for ironloom.
//!
//! All gateways implement the `ironloom_core::Gateway` trait.
//! The factory selects the correct binding based on configuration.

pub mod factory;
pub mod gemini;
pub mod openai_compat;

pub use factory::from_config;
pub use gemini::GeminiGateway;
pub use openai_compat::OpenAiCompatGateway;
