//! Game metadata carried inside bundles.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed contents of a bundle's `header.json`.
///
/// The schema belongs to the host application, so the value is kept as
/// arbitrary JSON. Only well-formedness is checked when reading bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameHeader(Value);

impl GameHeader {
    /// Wrap an already-parsed JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse header bytes. Fails only if the bytes are not well-formed JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self)
    }

    /// Look up a top-level field. Returns `None` for non-object headers.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The `title` field, if present and a string.
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for GameHeader {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
