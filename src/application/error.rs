use thiserror::Error;

use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: u64 },

    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: u64 },

    /// A record failed to serialize or deserialize.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("insufficient funds in {kind} {id}: balance {balance}, required {required}")]
    InsufficientFunds {
        kind: &'static str,
        id: u64,
        balance: i64,
        required: i64,
    },

    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Event emission failed after the operation's mutation was already
    /// written. The mutation stays committed; only the notification is lost.
    #[error("notification {event} failed after commit: {reason}")]
    NotifyFailed { event: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedRecord(err.to_string())
    }
}
