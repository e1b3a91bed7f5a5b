// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use librum::application::{EntityService, ServiceConfig};
use librum::domain::{Account, Card, Record};
use librum::storage::MemoryStore;

pub type AccountService = EntityService<Account, MemoryStore>;
pub type CardService = EntityService<Card, MemoryStore>;

/// Fresh account service over an empty in-memory store.
pub fn account_service() -> AccountService {
    EntityService::new(MemoryStore::new())
}

/// Fresh card service over an empty in-memory store.
pub fn card_service() -> CardService {
    EntityService::new(MemoryStore::new())
}

/// Account service over an existing store (e.g. one shared with cards).
pub fn account_service_on(store: MemoryStore) -> AccountService {
    EntityService::new(store)
}

/// Account service configured with the historical whole-store scan.
pub fn unscoped_account_service(store: MemoryStore) -> AccountService {
    EntityService::with_config(store, ServiceConfig { scoped_scan: false })
}

/// Owned argument list for `invoke` calls.
pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Decode a serialized payload into a JSON value.
pub fn json(payload: &[u8]) -> serde_json::Value {
    serde_json::from_slice(payload).unwrap()
}

/// Names of the notifications a service has emitted so far, oldest first.
pub fn event_names<R: Record>(service: &EntityService<R, MemoryStore>) -> Vec<String> {
    service
        .store()
        .notifications()
        .iter()
        .map(|n| n.name.clone())
        .collect()
}
