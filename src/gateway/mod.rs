//! Memory gateway
//!
//! Orchestrates upstream calls through the [`MemoryTransport`] seam, runs
//! responses through normalization and the query engine, and maintains the
//! shared canonical record set. Each public operation is one logical
//! round-trip with no retry; batch delete is the single exception and fans
//! out one delete per id concurrently.
//!
//! The caller's identity is explicit on every operation that needs one;
//! the gateway holds no ambient user state.

use crate::error::{Error, Result};
use crate::normalize::normalize_body;
use crate::query::{run_query, QueryOptions, QueryPage};
use crate::record::{
    AccessLogEntry, AppInfo, CanonicalRecord, MemoryState, MemoryStats, SYNTHETIC_APP,
    SYNTHETIC_APP_ID,
};
use crate::store::CanonicalStore;
use crate::upstream::MemoryTransport;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Longest text prefix used as the related-lookup search query
const RELATED_QUERY_CHARS: usize = 100;

/// Maximum number of related records returned
const RELATED_LIMIT: usize = 5;

/// Gateway over the upstream memory API
pub struct MemoryGateway {
    transport: Arc<dyn MemoryTransport>,
    store: CanonicalStore,
}

impl MemoryGateway {
    /// Create a gateway over a transport with a fresh canonical set
    pub fn new(transport: Arc<dyn MemoryTransport>) -> Self {
        Self {
            transport,
            store: CanonicalStore::new(),
        }
    }

    /// The shared canonical record set
    pub fn store(&self) -> &CanonicalStore {
        &self.store
    }

    /// Fetch memories: search when a non-empty query is supplied, list
    /// otherwise (the two upstream paths are mutually exclusive). The
    /// delivered page replaces the canonical set.
    pub async fn fetch_memories(
        &self,
        user_id: &str,
        query: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<QueryPage> {
        let user_id = validated_user(user_id)?;

        let outcome = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => self.transport.search_memories(q, user_id).await,
            None => self.transport.list_memories(user_id).await,
        };

        let body = match outcome {
            Ok(body) => body,
            Err(err) if err.is_absorbable() => {
                self.store.replace(Vec::new()).await;
                return Ok(QueryPage::empty());
            }
            Err(err) => return Err(err),
        };

        let records = normalize_body(&body);
        tracing::debug!("normalized {} memories for {}", records.len(), user_id);

        let page = run_query(&records, opts);
        self.store.replace(page.records.clone()).await;
        Ok(page)
    }

    /// Fetch one memory by id; an unrecognized body yields `None`
    pub async fn fetch_memory(&self, memory_id: &str) -> Result<Option<CanonicalRecord>> {
        let memory_id = validated_id(memory_id)?;

        let body = match self.transport.get_memory(memory_id).await {
            Ok(body) => body,
            Err(err) if err.is_absorbable() => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(normalize_body(&body).into_iter().next())
    }

    /// Access logs for a memory
    ///
    /// The upstream has no access-log capability; this always yields an
    /// empty list so the consumer contract stays uniform.
    pub async fn fetch_access_logs(
        &self,
        memory_id: &str,
        _page: usize,
        _page_size: usize,
    ) -> Result<Vec<AccessLogEntry>> {
        tracing::debug!("access logs requested for {}; upstream has none", memory_id);
        Ok(Vec::new())
    }

    /// Related memories, synthesized as a search on the source record's
    /// leading text; the source itself is excluded and results are capped.
    /// A source record absent from the canonical set yields an empty list.
    pub async fn fetch_related(
        &self,
        user_id: &str,
        memory_id: &str,
    ) -> Result<Vec<CanonicalRecord>> {
        let user_id = validated_user(user_id)?;
        let memory_id = validated_id(memory_id)?;

        let Some(source) = self.store.find(memory_id).await else {
            tracing::debug!("related lookup for {} skipped: not in canonical set", memory_id);
            return Ok(Vec::new());
        };

        let query: String = source.text.chars().take(RELATED_QUERY_CHARS).collect();
        let body = match self.transport.search_memories(&query, user_id).await {
            Ok(body) => body,
            Err(err) if err.is_absorbable() => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        Ok(normalize_body(&body)
            .into_iter()
            .filter(|r| r.id != memory_id)
            .take(RELATED_LIMIT)
            .collect())
    }

    /// Create one memory from a text payload
    pub async fn create_memory(&self, user_id: &str, text: &str) -> Result<()> {
        let user_id = validated_user(user_id)?;
        self.transport.create_memory(user_id, text).await
    }

    /// Replace the content of one memory
    pub async fn update_memory(&self, memory_id: &str, content: &str) -> Result<()> {
        let memory_id = validated_id(memory_id)?;
        self.transport.update_memory(memory_id, content).await
    }

    /// Delete memories in one batch
    ///
    /// All per-id deletes are issued concurrently. Only if every one succeeds
    /// are the ids removed locally, in a single visible update. On any
    /// failure the canonical set is left untouched even though some upstream
    /// deletes may have succeeded; the resulting divergence heals on the next
    /// refetch.
    pub async fn delete_memories(&self, memory_ids: &[String]) -> Result<()> {
        if memory_ids.is_empty() {
            return Ok(());
        }
        self.delete_upstream(memory_ids).await?;
        self.store.remove_ids(memory_ids).await;
        Ok(())
    }

    /// Change the state of memories
    ///
    /// `deleted` and `archived` are the only states the upstream can express,
    /// and only as deletion: those targets issue real deletes and remove the
    /// records locally. Every other target mutates the local state field
    /// only, with zero network calls, and reverts to `active` on the next
    /// full refetch.
    pub async fn update_memory_state(
        &self,
        memory_ids: &[String],
        state: MemoryState,
    ) -> Result<()> {
        if memory_ids.is_empty() {
            return Ok(());
        }

        if state.requires_upstream_delete() {
            self.delete_upstream(memory_ids).await?;
            self.store.remove_ids(memory_ids).await;
        } else {
            tracing::debug!(
                "state {} for {} ids is local-only; upstream cannot express it",
                state,
                memory_ids.len()
            );
            self.store.set_state(memory_ids, state).await;
        }
        Ok(())
    }

    /// Aggregate statistics, derived client-side from a full listing
    pub async fn fetch_stats(&self, user_id: &str) -> Result<MemoryStats> {
        let user_id = validated_user(user_id)?;

        let total = match self.transport.list_memories(user_id).await {
            Ok(body) => normalize_body(&body).len(),
            Err(err) if err.is_absorbable() => 0,
            Err(err) => return Err(err),
        };

        Ok(MemoryStats {
            total_memories: total,
            total_apps: 1,
            apps: vec![synthetic_app(total)],
        })
    }

    /// Application listing: always exactly the synthetic application, with
    /// its count taken from the canonical set
    pub async fn list_apps(&self) -> Result<Vec<AppInfo>> {
        Ok(vec![synthetic_app(self.store.len().await)])
    }

    /// Accepted and ignored: the upstream has no application registry to
    /// update
    pub async fn update_app(&self, app_id: &str, _is_active: bool) -> Result<()> {
        tracing::debug!("app update for {} ignored; upstream has no apps", app_id);
        Ok(())
    }

    /// Category names present in the canonical set
    ///
    /// The upstream has no category concept, so this is empty until local
    /// collaborators attach categories to records.
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for record in self.store.snapshot().await {
            names.extend(record.categories);
        }
        Ok(names.into_iter().collect())
    }

    /// Fan out one delete per id, join on all of them, surface the first
    /// failure as the single aggregated result
    async fn delete_upstream(&self, memory_ids: &[String]) -> Result<()> {
        let results = futures::future::join_all(
            memory_ids.iter().map(|id| self.transport.delete_memory(id)),
        )
        .await;

        for result in results {
            result?;
        }
        Ok(())
    }
}

fn validated_user(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "user identity must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn validated_id(memory_id: &str) -> Result<&str> {
    if memory_id.is_empty() {
        return Err(Error::Validation("memory id must not be empty".to_string()));
    }
    Ok(memory_id)
}

fn synthetic_app(memories_count: usize) -> AppInfo {
    let now = Utc::now().timestamp_millis();
    AppInfo {
        id: SYNTHETIC_APP_ID.to_string(),
        name: SYNTHETIC_APP.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
        memories_count,
        memories_accessed_count: 0,
    }
}
