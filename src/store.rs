//! Shared canonical record set
//!
//! Holds the last delivered page of canonical records. Mutation is by
//! whole-set replacement only: every write computes a new vector and swaps it
//! in, so each change is a single visible update and any snapshot is
//! consistent. Overlapping writers race freely; the last completion wins.

use crate::record::{CanonicalRecord, MemoryState};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, ordered store of canonical records
#[derive(Clone, Default)]
pub struct CanonicalStore {
    records: Arc<RwLock<Vec<CanonicalRecord>>>,
}

impl CanonicalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace the entire record set
    pub async fn replace(&self, records: Vec<CanonicalRecord>) {
        *self.records.write().await = records;
    }

    /// Snapshot the current record set in order
    pub async fn snapshot(&self) -> Vec<CanonicalRecord> {
        self.records.read().await.clone()
    }

    /// Look up a record by id
    pub async fn find(&self, id: &str) -> Option<CanonicalRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Remove the given ids in one visible update
    pub async fn remove_ids(&self, ids: &[String]) {
        let mut guard = self.records.write().await;
        let next: Vec<CanonicalRecord> = guard
            .iter()
            .filter(|r| !ids.contains(&r.id))
            .cloned()
            .collect();
        *guard = next;
    }

    /// Set the state of the given ids in one visible update
    pub async fn set_state(&self, ids: &[String], state: MemoryState) {
        let mut guard = self.records.write().await;
        let next: Vec<CanonicalRecord> = guard
            .iter()
            .map(|r| {
                if ids.contains(&r.id) {
                    let mut updated = r.clone();
                    updated.state = state;
                    updated
                } else {
                    r.clone()
                }
            })
            .collect();
        *guard = next;
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
