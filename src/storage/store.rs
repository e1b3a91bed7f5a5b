use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by a ledger store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("selector queries are not supported by this store")]
    QueryUnsupported,

    #[error("store rejected selector: {0}")]
    SelectorRejected(String),

    #[error("event emission failed: {0}")]
    EventFailed(String),
}

/// One historical write to a key, as exposed by the store's version log.
/// `value: None` is the tombstone left by a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub tx_id: String,
    pub value: Option<Vec<u8>>,
    pub timestamp: DateTime<Utc>,
}

/// A named event recorded on the store's notification channel for external
/// subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub name: String,
    pub payload: Vec<u8>,
    pub emitted_at: DateTime<Utc>,
}

/// An attribute-equality selector for the store's rich-query facility,
/// always scoped by the `docType` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector(Map<String, Value>);

impl Selector {
    pub fn for_kind(kind: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("docType".to_string(), Value::String(kind.to_string()));
        Self(fields)
    }

    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

pub type KeyValueIter<'a> = Box<dyn Iterator<Item = Result<(String, Vec<u8>), StoreError>> + 'a>;
pub type VersionIter<'a> = Box<dyn Iterator<Item = Result<VersionEntry, StoreError>> + 'a>;

/// The narrow capability set the entity service requires of a ledger
/// platform: keyed state, lexicographic range scans, a per-key version log,
/// selector queries, and an event channel.
///
/// Isolation and conflict detection across concurrent invocations are the
/// store's concern; the service assumes serializable read-then-write
/// semantics within one call. Iterators are owned values and release their
/// underlying resources when dropped, on every exit path.
pub trait LedgerStore {
    /// Current live value at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` at `key`, appending a version to the key's history.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove the live value at `key`, appending a tombstone version.
    /// History for the key is retained.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Live entries with `start <= key < end` in lexicographic key order.
    /// An empty bound is unbounded on that side.
    fn scan_range(&self, start: &str, end: &str) -> Result<KeyValueIter<'_>, StoreError>;

    /// Version log for `key`, oldest first. Empty when the key has never
    /// existed.
    fn history(&self, key: &str) -> Result<VersionIter<'_>, StoreError>;

    /// Live entries matching every field of `selector`, in the store's
    /// result order.
    fn query(&self, selector: &Selector) -> Result<KeyValueIter<'_>, StoreError>;

    /// Record a named event for external subscribers.
    fn emit_event(&mut self, name: &str, payload: &[u8]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_includes_discriminator() {
        let selector = Selector::for_kind("Account").field("accountOwner", "Ana".into());
        assert_eq!(selector.fields().len(), 2);
        assert_eq!(selector.fields()["docType"], "Account");
        assert_eq!(selector.fields()["accountOwner"], "Ana");
    }
}
