//! Upstream transport seam
//!
//! The gateway talks to the upstream memory API only through the
//! [`MemoryTransport`] trait, so orchestration logic can be exercised against
//! a stub while production uses the reqwest-backed [`HttpTransport`].

mod http;

pub use http::HttpTransport;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The operation set the upstream memory API actually provides
///
/// Note what is absent: no pagination, no filtering, no batch delete, no
/// state changes, no access logs. The gateway synthesizes all of those.
#[async_trait]
pub trait MemoryTransport: Send + Sync {
    /// List all memories for an identity
    async fn list_memories(&self, user_id: &str) -> Result<Value>;

    /// Search memories for an identity
    async fn search_memories(&self, query: &str, user_id: &str) -> Result<Value>;

    /// Create one memory from a text payload
    async fn create_memory(&self, user_id: &str, text: &str) -> Result<()>;

    /// Fetch one memory by id
    async fn get_memory(&self, memory_id: &str) -> Result<Value>;

    /// Replace the content of one memory
    async fn update_memory(&self, memory_id: &str, content: &str) -> Result<()>;

    /// Delete one memory (the only removal primitive the upstream has)
    async fn delete_memory(&self, memory_id: &str) -> Result<()>;
}

/// The creation envelope the upstream expects: a single user message
pub(crate) fn create_envelope(user_id: &str, text: &str) -> Value {
    serde_json::json!({
        "messages": [
            {
                "role": "user",
                "content": text,
            }
        ],
        "user_id": user_id,
    })
}
