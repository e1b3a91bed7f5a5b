use std::marker::PhantomData;

use serde_json::Value;
use serde_json::value::RawValue;
use tracing::{debug, info};

use crate::domain::{HistoryEntry, Record, decode, encode, parse_id, storage_key};
use crate::storage::{KeyValueIter, LedgerStore, Selector, StoreError};

use super::AppError;

/// Explicit per-service configuration, injected at construction instead of
/// living in process-global state.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Restrict `get_all` to this record type's key prefix. `false`
    /// reproduces the historical whole-store scan, which leaks foreign
    /// record types when several share one store.
    pub scoped_scan: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { scoped_scan: true }
    }
}

const SEED_BALANCE: i64 = 1000;
const SEED_OWNERS: [&str; 5] = ["Alice", "Bruno", "Carla", "Diego", "Elena"];

/// Ledger service for one record type over one store namespace.
///
/// Every operation is a single synchronous validate → read/scan → mutate →
/// notify sequence; isolation between concurrent invocations is the store's
/// concern. Exactly one notification is emitted per successful operation
/// and none on a failed one. A failed emission fails the call even though
/// the mutation has already been written (see [`AppError::NotifyFailed`]).
pub struct EntityService<R: Record, S: LedgerStore> {
    store: S,
    config: ServiceConfig,
    _record: PhantomData<R>,
}

impl<R: Record, S: LedgerStore> EntityService<R, S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    pub fn with_config(store: S, config: ServiceConfig) -> Self {
        Self {
            store,
            config,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Seed the ledger with five starter records, ids 1 through 5.
    pub fn init(&mut self) -> Result<(), AppError> {
        debug!(kind = R::KIND, "seeding starter records");

        for (i, owner) in SEED_OWNERS.iter().enumerate() {
            let id = (i + 1) as u64;
            let key = storage_key::<R>(id);
            if self.store.get(&key)?.is_some() {
                return Err(AppError::AlreadyExists { kind: R::KIND, id });
            }
            let record = R::new(id, SEED_BALANCE, (*owner).to_string());
            self.store.put(&key, &encode(&record)?)?;
        }

        info!(kind = R::KIND, count = SEED_OWNERS.len(), "ledger seeded");
        self.notify("initialized", SEED_OWNERS.len().to_string().as_bytes())
    }

    /// Create a new record. Fails if the id already holds a live value.
    pub fn create(&mut self, id: &str, balance: &str, owner: &str) -> Result<(), AppError> {
        let id = parse_record_id(id)?;
        let balance: i64 = balance
            .parse()
            .map_err(|_| AppError::InvalidArgument("balance must be a numeric string".into()))?;
        if owner.is_empty() {
            return Err(AppError::InvalidArgument(
                "owner must be a non-empty string".into(),
            ));
        }

        let key = storage_key::<R>(id);
        if self.store.get(&key)?.is_some() {
            return Err(AppError::AlreadyExists { kind: R::KIND, id });
        }

        let record = R::new(id, balance, owner.to_string());
        self.store.put(&key, &encode(&record)?)?;

        info!(kind = R::KIND, id, "record created");
        self.notify("created", key.as_bytes())
    }

    /// Stored bytes for `id`, exactly as last written. Historical encodings
    /// are returned verbatim rather than re-normalized.
    pub fn read(&mut self, id: &str) -> Result<Vec<u8>, AppError> {
        let id = parse_record_id(id)?;
        let key = storage_key::<R>(id);
        let bytes = self
            .store
            .get(&key)?
            .ok_or(AppError::NotFound { kind: R::KIND, id })?;

        self.notify("read", key.as_bytes())?;
        Ok(bytes)
    }

    /// Every live record in store iteration order, as a JSON array of the
    /// raw stored documents.
    pub fn get_all(&mut self) -> Result<Vec<u8>, AppError> {
        let (start, end) = if self.config.scoped_scan {
            prefix_bounds(R::KEY_PREFIX)
        } else {
            (String::new(), String::new())
        };

        let iter = self.store.scan_range(&start, &end)?;
        let rows = collect_raw_documents(iter)?;
        let payload = serde_json::to_vec(&rows)?;

        debug!(kind = R::KIND, count = rows.len(), "scanned live records");
        self.notify("listed", rows.len().to_string().as_bytes())?;
        Ok(payload)
    }

    /// Selector query on the record type's owner attribute.
    pub fn query_by_owner(&mut self, owner: &str) -> Result<Vec<u8>, AppError> {
        if owner.is_empty() {
            return Err(AppError::InvalidArgument(
                "owner must be a non-empty string".into(),
            ));
        }
        self.query_by_attribute(R::OWNER_ATTRIBUTE, Value::String(owner.to_string()))
    }

    /// Run `{docType: <kind>, <attribute>: <value>}` through the store's
    /// rich-query facility and serialize the matches in result order.
    pub fn query_by_attribute(
        &mut self,
        attribute: &str,
        value: Value,
    ) -> Result<Vec<u8>, AppError> {
        if attribute.is_empty() {
            return Err(AppError::InvalidArgument(
                "attribute name must be a non-empty string".into(),
            ));
        }

        let selector = Selector::for_kind(R::KIND).field(attribute, value);
        let iter = match self.store.query(&selector) {
            Ok(iter) => iter,
            Err(err @ (StoreError::QueryUnsupported | StoreError::SelectorRejected(_))) => {
                return Err(AppError::QueryFailed(err.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let rows = collect_raw_documents(iter)?;
        let payload = serde_json::to_vec(&rows)?;

        debug!(kind = R::KIND, attribute, count = rows.len(), "selector query done");
        self.notify("queried", rows.len().to_string().as_bytes())?;
        Ok(payload)
    }

    /// Overwrite a record with a full serialized replacement.
    ///
    /// The id is recovered from the document itself, and the input bytes
    /// are stored as given. There is deliberately no existence check:
    /// update can redefine a live record or resurrect a deleted one.
    pub fn update(&mut self, record_json: &str) -> Result<(), AppError> {
        if record_json.is_empty() {
            return Err(AppError::InvalidArgument(
                "record body must be a non-empty string".into(),
            ));
        }

        let record: R = serde_json::from_str(record_json)?;
        if record.kind() != R::KIND {
            return Err(AppError::MalformedRecord(format!(
                "docType must be {:?}, got {:?}",
                R::KIND,
                record.kind()
            )));
        }
        if record.id() == 0 {
            return Err(AppError::MalformedRecord("record id must be positive".into()));
        }

        let key = storage_key::<R>(record.id());
        self.store.put(&key, record_json.as_bytes())?;

        info!(kind = R::KIND, id = record.id(), "record updated");
        self.notify("updated", key.as_bytes())
    }

    /// Remove the live record at `id`. History for the key is retained by
    /// the store, and the id becomes available for re-creation.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let id = parse_record_id(id)?;
        let key = storage_key::<R>(id);
        if self.store.get(&key)?.is_none() {
            return Err(AppError::NotFound { kind: R::KIND, id });
        }

        self.store.delete(&key)?;

        info!(kind = R::KIND, id, "record deleted");
        self.notify("deleted", key.as_bytes())
    }

    /// Reconstruct the audit trail for `id` from the store's version log,
    /// oldest first. Deletes appear as tombstone entries with an empty
    /// value. A key with zero versions has never existed.
    pub fn get_history(&mut self, id: &str) -> Result<Vec<u8>, AppError> {
        let id = parse_record_id(id)?;
        let key = storage_key::<R>(id);

        let iter = self.store.history(&key)?;
        let mut entries = Vec::new();
        for version in iter {
            // A mid-stream iterator failure aborts the call; a truncated
            // audit trail must never be returned as if complete.
            let version = version?;
            let entry = match version.value {
                Some(bytes) => {
                    // Undecodable legacy values are embedded in string form
                    // rather than failing the whole trail.
                    let value = match serde_json::from_slice::<Value>(&bytes) {
                        Ok(value) => value,
                        Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
                    };
                    HistoryEntry::written(version.tx_id, value)
                }
                None => HistoryEntry::tombstone(version.tx_id),
            };
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(AppError::NotFound { kind: R::KIND, id });
        }

        let payload = serde_json::to_vec(&entries)?;
        debug!(kind = R::KIND, id, versions = entries.len(), "history reconstructed");
        self.notify("history", key.as_bytes())?;
        Ok(payload)
    }

    /// Decode the live record at `id`.
    pub(crate) fn fetch(&self, id: u64) -> Result<R, AppError> {
        let key = storage_key::<R>(id);
        let bytes = self
            .store
            .get(&key)?
            .ok_or(AppError::NotFound { kind: R::KIND, id })?;
        Ok(decode(&bytes)?)
    }

    pub(crate) fn put_record(&mut self, record: &R) -> Result<(), AppError> {
        let key = storage_key::<R>(record.id());
        self.store.put(&key, &encode(record)?)?;
        Ok(())
    }

    /// Emit exactly one notification for a completed operation. The caller
    /// has already committed its mutation, so an emission failure fails the
    /// call while leaving the write in place.
    pub(crate) fn notify(&mut self, event: &str, payload: &[u8]) -> Result<(), AppError> {
        let name = format!("{}_{event}", R::KIND.to_lowercase());
        if let Err(err) = self.store.emit_event(&name, payload) {
            return Err(AppError::NotifyFailed {
                event: name,
                reason: err.to_string(),
            });
        }
        debug!(event = %name, "notification emitted");
        Ok(())
    }
}

/// Parse and bound-check a caller-supplied record id.
pub(crate) fn parse_record_id(text: &str) -> Result<u64, AppError> {
    match parse_id(text) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidArgument(
            "id must be a positive decimal string without leading zeros".into(),
        )),
    }
}

/// Key range covering every key with the given prefix. `char::MAX` sorts
/// after any character a record key can contain.
fn prefix_bounds(prefix: &str) -> (String, String) {
    (prefix.to_string(), format!("{prefix}{}", char::MAX))
}

/// Drain a store iterator into raw JSON documents, preserving the stored
/// bytes and the iterator's order.
fn collect_raw_documents(iter: KeyValueIter<'_>) -> Result<Vec<Box<RawValue>>, AppError> {
    let mut rows = Vec::new();
    for entry in iter {
        let (_key, value) = entry?;
        let text = String::from_utf8(value)
            .map_err(|_| AppError::MalformedRecord("stored document is not UTF-8".into()))?;
        rows.push(RawValue::from_string(text)?);
    }
    Ok(rows)
}
