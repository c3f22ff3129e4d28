//! Memory backends for ironloom.
//!
//! All backends implement the `ironloom_core::MemoryStore` trait. The
//! factory selects one from configuration; "none" disables memory entirely
//! and workflows run without recall.

use std::sync::Arc;

use ironloom_config::MemoryConfig;
use ironloom_core::{MemoryStore, Result};

pub mod embedding;
pub mod file_store;
pub mod in_memory;
pub mod qdrant;

pub use embedding::{HashEmbedder, EMBEDDING_DIM};
pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use qdrant::QdrantStore;

/// Build the configured memory store, or `None` when memory is disabled.
pub fn from_config(config: &MemoryConfig) -> Result<Option<Arc<dyn MemoryStore>>> {
    match config.backend.as_str() {
        "none" => Ok(None),
        "memory" => Ok(Some(Arc::new(InMemoryStore::new()))),
        "file" => Ok(Some(Arc::new(FileStore::new(&config.storage_dir)))),
        "qdrant" => Ok(Some(Arc::new(QdrantStore::new(
            &config.qdrant_url,
            config.qdrant_api_key.clone(),
            &config.collection,
            Arc::new(HashEmbedder::default()),
        )))),
        other => Err(ironloom_core::Error::Config {
            message: format!("Unknown memory backend: {other}"),
        }),
    }
}
