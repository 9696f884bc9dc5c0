//! Canonical record model
//!
//! Everything downstream of the normalization boundary operates on these
//! types only; raw upstream payload shapes never escape `normalize`.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Application identity used when the upstream carries none.
///
/// The upstream has no multi-application concept, so every record that does
/// not name its own source is attributed to this single synthetic application.
pub const SYNTHETIC_APP: &str = "memory-api";

/// Identifier of the synthetic application in app listings
pub const SYNTHETIC_APP_ID: &str = "memory-api-default";

/// Per-record state as the UI understands it
///
/// The upstream only models existence. `Deleted` and `Archived` map to a real
/// upstream delete; `Active` and `Paused` are authoritative locally only and
/// revert to `Active` on the next full refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryState {
    /// Normal, visible record (default)
    #[default]
    Active,

    /// Locally hidden, still present upstream
    Paused,

    /// Archived locally; deleted upstream
    Archived,

    /// Deleted locally and upstream
    Deleted,
}

impl MemoryState {
    /// States whose transition must also delete the record upstream
    pub fn requires_upstream_delete(&self) -> bool {
        matches!(self, MemoryState::Deleted | MemoryState::Archived)
    }
}

impl fmt::Display for MemoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryState::Active => "active",
            MemoryState::Paused => "paused",
            MemoryState::Archived => "archived",
            MemoryState::Deleted => "deleted",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MemoryState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemoryState::Active),
            "paused" => Ok(MemoryState::Paused),
            "archived" => Ok(MemoryState::Archived),
            "deleted" => Ok(MemoryState::Deleted),
            other => Err(Error::Validation(format!(
                "unknown memory state: {}",
                other
            ))),
        }
    }
}

/// The normalized memory entry used by all downstream logic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Record identifier, never empty (synthesized when upstream omits one)
    pub id: String,

    /// Memory content
    pub text: String,

    /// Creation instant, epoch milliseconds
    pub created_at: i64,

    /// Record state (see [`MemoryState`] for which values the upstream knows)
    pub state: MemoryState,

    /// Opaque upstream metadata, passed through untouched
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Category names; empty after normalization, populated only locally
    #[serde(default)]
    pub categories: BTreeSet<String>,

    /// Originating application, defaults to [`SYNTHETIC_APP`]
    pub source_app: String,
}

/// Application listing entry
///
/// The upstream has no application registry; listings always contain exactly
/// the synthetic application with counts derived client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    /// Application identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether the application is active (always true for the synthetic app)
    pub is_active: bool,

    /// Creation instant, epoch milliseconds
    pub created_at: i64,

    /// Last update instant, epoch milliseconds
    pub updated_at: i64,

    /// Number of memories attributed to this application
    pub memories_count: usize,

    /// Number of memory accesses attributed to this application
    pub memories_accessed_count: usize,
}

/// Aggregate statistics derived client-side from a full listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total number of memories for the queried identity
    pub total_memories: usize,

    /// Total number of applications (always 1, the synthetic app)
    pub total_apps: usize,

    /// Application listing
    pub apps: Vec<AppInfo>,
}

/// A single access-log entry as the UI expects it
///
/// The upstream cannot produce these; the gateway yields an empty list
/// unconditionally. The shape exists so the consumer-facing contract is typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Log entry identifier
    pub id: String,

    /// Application that performed the access
    pub app_name: String,

    /// Access instant, epoch milliseconds
    pub accessed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default_is_active() {
        assert_eq!(MemoryState::default(), MemoryState::Active);
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            MemoryState::Active,
            MemoryState::Paused,
            MemoryState::Archived,
            MemoryState::Deleted,
        ] {
            let parsed: MemoryState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_state_parse_unknown() {
        let result = "suspended".parse::<MemoryState>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("suspended"));
    }

    #[test]
    fn test_upstream_delete_bifurcation() {
        assert!(MemoryState::Deleted.requires_upstream_delete());
        assert!(MemoryState::Archived.requires_upstream_delete());
        assert!(!MemoryState::Active.requires_upstream_delete());
        assert!(!MemoryState::Paused.requires_upstream_delete());
    }

    #[test]
    fn test_state_serde_lowercase() {
        let json = serde_json::to_string(&MemoryState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let back: MemoryState = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(back, MemoryState::Archived);
    }

    #[test]
    fn test_record_serde_defaults() {
        let json = r#"{
            "id": "m-1",
            "text": "remember this",
            "created_at": 1700000000000,
            "state": "active",
            "source_app": "memory-api"
        }"#;
        let record: CanonicalRecord = serde_json::from_str(json).unwrap();
        assert!(record.metadata.is_empty());
        assert!(record.categories.is_empty());
    }
}
