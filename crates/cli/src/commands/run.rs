//! `ironloom run` — Execute a workflow definition.

use std::path::Path;
use std::sync::Arc;

use ironloom_config::AppConfig;
use ironloom_workflow::{WorkflowExecutor, WorkflowSpec};

pub async fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if config.provider.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable for your provider:");
        eprintln!("    GROQ_API_KEY      (groq, the default)");
        eprintln!("    OPENAI_API_KEY    (with LLM_PROVIDER=openai)");
        eprintln!("    GEMINI_API_KEY    (with LLM_PROVIDER=gemini)");
        eprintln!("    IRONLOOM_API_KEY  (any provider)");
        eprintln!();
        eprintln!("  Or add api_key under [provider] in ironloom.toml.");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let spec = WorkflowSpec::load(path)?;
    let gateway = ironloom_providers::from_config(&config.provider)?;
    let memory = ironloom_memory::from_config(&config.memory)?;
    let registry = Arc::new(ironloom_tools::default_registry(&config.tools));

    let mut executor = WorkflowExecutor::new(gateway).with_registry(registry);
    if let Some(store) = memory {
        executor = executor.with_memory(store);
    }

    println!("🚀 Running workflow: {} ({})", spec.name, spec.id);
    println!(
        "   Provider: {}   Memory: {}   Steps: {}",
        config.provider.name,
        config.memory.backend,
        spec.steps.len()
    );
    println!();

    let report = executor.execute(&spec).await?;

    for (i, step) in report.steps.iter().enumerate() {
        println!("{:-<72}", "");
        println!("Step {} — {}", i + 1, step.agent_id);
        println!("{:-<72}", "");
        println!("{}", step.output);
        println!();
    }

    println!(
        "✅ Workflow '{}' finished in {:.1}s",
        report.workflow_id,
        report.duration.as_secs_f64()
    );

    Ok(())
}
