//! `ironloom memory` — Memory store management.

use std::sync::Arc;

use ironloom_config::AppConfig;
use ironloom_core::MemoryStore;
use ironloom_memory::{HashEmbedder, QdrantStore};

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.memory.backend != "qdrant" {
        println!(
            "Memory backend is \"{}\" — only the qdrant backend needs initialization.",
            config.memory.backend
        );
        return Ok(());
    }

    let store = QdrantStore::new(
        &config.memory.qdrant_url,
        config.memory.qdrant_api_key.clone(),
        &config.memory.collection,
        Arc::new(HashEmbedder::default()),
    );

    if store.ensure_collection().await? {
        println!("✅ Created collection '{}'.", store.collection());
    } else {
        println!("✅ Collection '{}' already exists.", store.collection());
    }

    Ok(())
}

pub async fn clear(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This will delete ALL stored memories permanently.");
        println!("   Run with --confirm to proceed:");
        println!("   ironloom memory clear --confirm");
        return Ok(());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(store) = ironloom_memory::from_config(&config.memory)? else {
        println!("Memory is disabled (backend = \"none\"). Nothing to clear.");
        return Ok(());
    };

    store.clear().await?;
    println!("🗑️  Cleared all memories from the {} backend.", store.name());

    Ok(())
}
