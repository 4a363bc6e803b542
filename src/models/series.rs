use serde::{Deserialize, Serialize};

/// One catalog entry returned by series search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stable series identifier, used in formulas
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Outcome of reading the API key from the host store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredKey {
    pub key: Option<String>,
    /// false when the host offers no persistent store at all
    pub supported: bool,
}

impl StoredKey {
    pub fn unsupported() -> Self {
        Self { key: None, supported: false }
    }

    pub fn supported(key: Option<String>) -> Self {
        Self { key, supported: true }
    }
}

/// One data point of a series as served by the data endpoint.
///
/// `date` is left untyped: the API sends ISO strings, spreadsheet hosts send serials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: serde_json::Value,
    pub value: serde_json::Value,
}
