//! Record Module
//!
//! A recipe is an opaque JSON document. Only `title` is typed; every other
//! field is carried through untouched, in the order it arrived.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document
///
/// ```text
/// { "title": "Chocolate Cake", "serves": 8, "steps": [...] }
///    └─ typed ─────────────┘   └─ fields (pass-through) ──┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Display title, mirrored into the index on every write
    pub title: String,

    /// Everything else in the document
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Map::new(),
        }
    }

    /// Add a pass-through field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a pass-through field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Parse a record from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serialize to compact JSON bytes
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
