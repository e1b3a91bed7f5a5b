use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a key's reconstructed audit trail.
///
/// Serializes as `{"TxID": ..., "Value": ..., "IsDeleted": ...}`, the shape
/// downstream auditors consume. A delete is represented by an empty `Value`
/// object with `IsDeleted: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "TxID")]
    pub tx_id: String,
    #[serde(rename = "Value")]
    pub value: Value,
    #[serde(rename = "IsDeleted")]
    pub is_deleted: bool,
}

impl HistoryEntry {
    /// Entry for a version that wrote a record value.
    pub fn written(tx_id: String, value: Value) -> Self {
        Self {
            tx_id,
            value,
            is_deleted: false,
        }
    }

    /// Entry for a version that deleted the key.
    pub fn tombstone(tx_id: String) -> Self {
        Self {
            tx_id,
            value: Value::Object(Map::new()),
            is_deleted: true,
        }
    }
}
