//! `ironloom query` — Search long-term memory.

use ironloom_config::AppConfig;
use ironloom_core::{MemoryScope, MemoryStore};

pub async fn run(text: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(store) = ironloom_memory::from_config(&config.memory)? else {
        println!("Memory is disabled (backend = \"none\"). Nothing to search.");
        return Ok(());
    };

    println!("🔍 Searching memories for: \"{text}\"");
    println!();

    let entries = store.query(text, MemoryScope::AllWorkflows, limit).await?;
    if entries.is_empty() {
        println!("   No matching memories found.");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {:>2}. [{} / {} / step {}] {}",
            i + 1,
            entry.workflow_id,
            entry.agent_id,
            entry.step,
            entry.timestamp.to_rfc3339(),
        );
        println!("      {}", snippet(&entry.content, 100));
    }

    Ok(())
}

/// Flatten and truncate memory content for one-line display.
fn snippet(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push('…');
    out
}
