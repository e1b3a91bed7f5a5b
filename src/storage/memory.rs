use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::store::{
    KeyValueIter, LedgerStore, Notification, Selector, StoreError, VersionEntry, VersionIter,
};

/// In-memory versioned key-value store.
///
/// Stand-in for the external ledger platform: every write appends to a
/// per-key version log, deletes leave tombstones, and selector queries scan
/// the live JSON documents. Snapshots serialize to a JSON file so the CLI
/// can carry state between invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    live: BTreeMap<String, Vec<u8>>,
    versions: BTreeMap<String, Vec<VersionEntry>>,
    notifications: Vec<Notification>,

    // Failure injection for exercising platform error paths.
    #[serde(skip)]
    fail_notifications: bool,
    #[serde(skip)]
    reject_selectors: bool,
    #[serde(skip)]
    fail_iteration: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose event channel is down: every emission fails.
    pub fn with_failing_notifications(mut self) -> Self {
        self.fail_notifications = true;
        self
    }

    /// A store without rich-query support: every selector is rejected.
    pub fn with_rejected_selectors(mut self) -> Self {
        self.reject_selectors = true;
        self
    }

    /// A store whose range and history iterators fail mid-stream: they
    /// yield their real entries, then an error instead of ending.
    pub fn with_failing_iteration(mut self) -> Self {
        self.fail_iteration = true;
        self
    }

    fn iteration_error() -> StoreError {
        StoreError::Backend(anyhow!("iterator failed mid-stream"))
    }

    /// Load a snapshot from `path`, or start empty if the file does not
    /// exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read ledger snapshot {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("ledger snapshot {} is not valid", path.display()))
    }

    /// Write a snapshot of the whole store to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self).context("failed to serialize ledger snapshot")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write ledger snapshot {}", path.display()))?;
        Ok(())
    }

    /// Every notification emitted so far, oldest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn next_tx(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn append_version(&mut self, key: &str, value: Option<Vec<u8>>) {
        let entry = VersionEntry {
            tx_id: self.next_tx(),
            value,
            timestamp: Utc::now(),
        };
        self.versions.entry(key.to_string()).or_default().push(entry);
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.live.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.live.insert(key.to_string(), value.to_vec());
        self.append_version(key, Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.live.remove(key);
        self.append_version(key, None);
        Ok(())
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<KeyValueIter<'_>, StoreError> {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };
        let iter = self
            .live
            .range((lower, upper))
            .map(|(key, value)| Ok((key.clone(), value.clone())));
        if self.fail_iteration {
            return Ok(Box::new(
                iter.chain(std::iter::once(Err(Self::iteration_error()))),
            ));
        }
        Ok(Box::new(iter))
    }

    fn history(&self, key: &str) -> Result<VersionIter<'_>, StoreError> {
        let iter = self
            .versions
            .get(key)
            .into_iter()
            .flatten()
            .map(|entry| Ok(entry.clone()));
        if self.fail_iteration {
            return Ok(Box::new(
                iter.chain(std::iter::once(Err(Self::iteration_error()))),
            ));
        }
        Ok(Box::new(iter))
    }

    fn query(&self, selector: &Selector) -> Result<KeyValueIter<'_>, StoreError> {
        if self.reject_selectors {
            return Err(StoreError::QueryUnsupported);
        }

        // Equality match on every selector field. Values that are not JSON
        // documents are not indexed and never match.
        let mut matches = Vec::new();
        for (key, value) in &self.live {
            let Ok(document) = serde_json::from_slice::<Value>(value) else {
                continue;
            };
            let matched = selector
                .fields()
                .iter()
                .all(|(field, expected)| document.get(field) == Some(expected));
            if matched {
                matches.push(Ok((key.clone(), value.clone())));
            }
        }
        Ok(Box::new(matches.into_iter()))
    }

    fn emit_event(&mut self, name: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.fail_notifications {
            return Err(StoreError::EventFailed(
                "notification channel unavailable".to_string(),
            ));
        }
        self.notifications.push(Notification {
            name: name.to_string(),
            payload: payload.to_vec(),
            emitted_at: Utc::now(),
        });
        Ok(())
    }
}
