use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed ledger record keyed by a numeric identifier.
///
/// Accounts and cards share one shape (id, balance, owner) and differ only
/// in their discriminator, key prefix, and JSON field names. The service
/// layer is generic over this trait instead of repeating the CRUD code per
/// record type.
pub trait Record: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug {
    /// Discriminator stored in the `docType` field and matched by selector
    /// queries. Always the record type's name.
    const KIND: &'static str;

    /// Fixed storage key prefix. Prefixes must not collide across record
    /// types sharing one store.
    const KEY_PREFIX: &'static str;

    /// JSON field name of the owner attribute, used by owner queries.
    const OWNER_ATTRIBUTE: &'static str;

    fn new(id: u64, balance: i64, owner: String) -> Self;
    fn id(&self) -> u64;
    fn balance(&self) -> i64;
    fn set_balance(&mut self, balance: i64);
    fn owner(&self) -> &str;

    /// The discriminator as actually carried by this value, which for a
    /// well-formed record equals [`Record::KIND`].
    fn kind(&self) -> &str;
}

/// Storage key for a record id: the type's prefix followed by the decimal
/// form of the id. Pure, and collision-free across types with disjoint
/// prefixes.
pub fn storage_key<R: Record>(id: u64) -> String {
    format!("{}{}", R::KEY_PREFIX, id)
}

/// Parse a caller-supplied record id.
///
/// Accepts exactly the canonical decimal form: digits only, no sign, no
/// leading zeros. Anything looser would alias a second key onto an existing
/// record ("07" vs "7").
pub fn parse_id(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if text.len() > 1 && text.starts_with('0') {
        return None;
    }
    text.parse().ok()
}

/// Serialize a record to its stored JSON document.
pub fn encode<R: Record>(record: &R) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(record)
}

/// Deserialize a stored JSON document back into a record. Fails when the
/// bytes are missing fields or carry wrong-typed ones.
pub fn decode<R: Record>(bytes: &[u8]) -> serde_json::Result<R> {
    serde_json::from_slice(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "docType")]
    pub doc_type: String,
    #[serde(rename = "accountNumber")]
    pub number: u64,
    #[serde(rename = "accountBalance")]
    pub balance: i64,
    #[serde(rename = "accountOwner")]
    pub owner: String,
}

impl Record for Account {
    const KIND: &'static str = "Account";
    const KEY_PREFIX: &'static str = "ACC";
    const OWNER_ATTRIBUTE: &'static str = "accountOwner";

    fn new(id: u64, balance: i64, owner: String) -> Self {
        Self {
            doc_type: Self::KIND.to_string(),
            number: id,
            balance,
            owner,
        }
    }

    fn id(&self) -> u64 {
        self.number
    }

    fn balance(&self) -> i64 {
        self.balance
    }

    fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn kind(&self) -> &str {
        &self.doc_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "docType")]
    pub doc_type: String,
    #[serde(rename = "cardNumber")]
    pub number: u64,
    #[serde(rename = "cardBalance")]
    pub balance: i64,
    #[serde(rename = "cardOwner")]
    pub owner: String,
}

impl Record for Card {
    const KIND: &'static str = "Card";
    const KEY_PREFIX: &'static str = "CRD";
    const OWNER_ATTRIBUTE: &'static str = "cardOwner";

    fn new(id: u64, balance: i64, owner: String) -> Self {
        Self {
            doc_type: Self::KIND.to_string(),
            number: id,
            balance,
            owner,
        }
    }

    fn id(&self) -> u64 {
        self.number
    }

    fn balance(&self) -> i64 {
        self.balance
    }

    fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn kind(&self) -> &str {
        &self.doc_type
    }
}
