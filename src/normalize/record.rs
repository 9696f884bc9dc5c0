//! Record normalization
//!
//! Resolves each upstream response body into a closed [`UpstreamBody`]
//! variant exactly once, then maps raw items to canonical records. Items are
//! mapped independently: one malformed item cannot fail the batch, it just
//! degrades to a best-effort record. Only a wholly unrecognized body drops
//! everything, and that path warns instead of erroring.

use super::timestamp::normalize_timestamp;
use crate::record::{CanonicalRecord, MemoryState, SYNTHETIC_APP};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Closed classification of upstream response bodies, resolved once at the
/// boundary
#[derive(Debug)]
pub enum UpstreamBody<'a> {
    /// Body is a bare JSON array of items
    Array(&'a [Value]),

    /// Body wraps the items in a `results` field
    Results(&'a [Value]),

    /// Body is itself a single item (carries an identifier field)
    Single(&'a Value),

    /// Anything else; normalizes to no records
    Unknown,
}

impl<'a> UpstreamBody<'a> {
    /// Detect the body shape, first match wins
    pub fn detect(body: &'a Value) -> Self {
        if let Value::Array(items) = body {
            return UpstreamBody::Array(items);
        }
        if let Some(Value::Array(items)) = body.get("results") {
            return UpstreamBody::Results(items);
        }
        if body.get("id").is_some() || body.get("memory_id").is_some() {
            return UpstreamBody::Single(body);
        }
        UpstreamBody::Unknown
    }
}

/// Normalize one upstream response body into an ordered record sequence
pub fn normalize_body(body: &Value) -> Vec<CanonicalRecord> {
    match UpstreamBody::detect(body) {
        UpstreamBody::Array(items) | UpstreamBody::Results(items) => {
            items.iter().map(normalize_item).collect()
        }
        UpstreamBody::Single(item) => vec![normalize_item(item)],
        UpstreamBody::Unknown => {
            tracing::warn!("unrecognized upstream response shape, yielding no records");
            Vec::new()
        }
    }
}

/// Map one raw upstream item to a canonical record; never fails
pub fn normalize_item(item: &Value) -> CanonicalRecord {
    let id = identifier(item).unwrap_or_else(|| synthetic_id(item));
    let text = first_string(item, &["memory", "content", "text"]).unwrap_or_default();

    let metadata = match item.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    let source_app = metadata
        .get("source_app")
        .and_then(Value::as_str)
        .or_else(|| metadata.get("app_name").and_then(Value::as_str))
        .unwrap_or(SYNTHETIC_APP)
        .to_string();

    CanonicalRecord {
        id,
        text,
        created_at: normalize_timestamp(item.get("created_at")),
        state: MemoryState::Active,
        metadata,
        categories: BTreeSet::new(),
        source_app,
    }
}

/// Upstream identifiers arrive as strings or numbers under either field name
fn identifier(item: &Value) -> Option<String> {
    for field in ["id", "memory_id"] {
        match item.get(field) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn first_string(item: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| item.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Stable fallback identifier derived from the raw item content
fn synthetic_id(item: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(item.to_string().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("mem-{}", hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_body() {
        let body = json!([
            {"id": "a", "memory": "first"},
            {"id": "b", "memory": "second"},
        ]);
        let records = normalize_body(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].text, "first");
        assert_eq!(records[1].id, "b");
    }

    #[test]
    fn test_results_wrapper_body() {
        let body = json!({
            "results": [
                {"id": "a", "memory": "first"},
                {"id": "b", "memory": "second"},
                {"id": "c", "memory": "third"},
            ],
            "relations": []
        });
        let records = normalize_body(&body);
        assert_eq!(records.len(), 3);
        // Order preserved
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_item_body() {
        let body = json!({"id": "only", "memory": "just one"});
        let records = normalize_body(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "only");
    }

    #[test]
    fn test_single_item_by_memory_id() {
        let body = json!({"memory_id": "alt", "content": "alt field names"});
        let records = normalize_body(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "alt");
        assert_eq!(records[0].text, "alt field names");
    }

    #[test]
    fn test_unknown_body_yields_empty() {
        let records = normalize_body(&json!({"foo": 1}));
        assert!(records.is_empty());

        let records = normalize_body(&json!("just a string"));
        assert!(records.is_empty());

        let records = normalize_body(&json!(42));
        assert!(records.is_empty());
    }

    #[test]
    fn test_text_field_precedence() {
        let item = json!({"id": "x", "memory": "m", "content": "c", "text": "t"});
        assert_eq!(normalize_item(&item).text, "m");

        let item = json!({"id": "x", "content": "c", "text": "t"});
        assert_eq!(normalize_item(&item).text, "c");

        let item = json!({"id": "x", "text": "t"});
        assert_eq!(normalize_item(&item).text, "t");

        let item = json!({"id": "x"});
        assert_eq!(normalize_item(&item).text, "");
    }

    #[test]
    fn test_numeric_identifier() {
        let item = json!({"id": 42, "memory": "numbered"});
        assert_eq!(normalize_item(&item).id, "42");
    }

    #[test]
    fn test_malformed_item_best_effort() {
        let body = json!([{"id": "good", "memory": "fine"}, "not an object"]);
        let records = normalize_body(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "good");
        // Malformed item still yields a record with synthesized id and empty text
        assert!(records[1].id.starts_with("mem-"));
        assert!(records[1].text.is_empty());
    }

    #[test]
    fn test_synthetic_id_is_stable() {
        let item = json!({"memory": "no identifier here"});
        let a = normalize_item(&item).id;
        let b = normalize_item(&item).id;
        assert_eq!(a, b);
        assert!(a.starts_with("mem-"));
        assert!(!a.is_empty());
    }

    #[test]
    fn test_source_app_from_metadata() {
        let item = json!({"id": "x", "metadata": {"source_app": "notebook"}});
        assert_eq!(normalize_item(&item).source_app, "notebook");

        let item = json!({"id": "x", "metadata": {"app_name": "browser"}});
        assert_eq!(normalize_item(&item).source_app, "browser");

        // source_app wins over app_name
        let item = json!({"id": "x", "metadata": {"source_app": "a", "app_name": "b"}});
        assert_eq!(normalize_item(&item).source_app, "a");

        let item = json!({"id": "x"});
        assert_eq!(normalize_item(&item).source_app, SYNTHETIC_APP);
    }

    #[test]
    fn test_metadata_passthrough() {
        let item = json!({"id": "x", "metadata": {"score": 0.93, "tag": "work"}});
        let record = normalize_item(&item);
        assert_eq!(record.metadata.get("score"), Some(&json!(0.93)));
        assert_eq!(record.metadata.get("tag"), Some(&json!("work")));
    }

    #[test]
    fn test_created_at_seconds_scaled() {
        let item = json!({"id": "x", "created_at": 1_700_000_000});
        assert_eq!(normalize_item(&item).created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_defaults() {
        let record = normalize_item(&json!({"id": "x"}));
        assert_eq!(record.state, MemoryState::Active);
        assert!(record.categories.is_empty());
        assert!(record.metadata.is_empty());
        assert!(record.created_at > 0);
    }
}
