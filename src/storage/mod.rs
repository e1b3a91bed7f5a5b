mod memory;
mod store;

pub use memory::MemoryStore;
pub use store::{
    KeyValueIter, LedgerStore, Notification, Selector, StoreError, VersionEntry, VersionIter,
};
