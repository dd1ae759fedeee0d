//! Index (de)serialization
//!
//! The index is a flat JSON object, identifier → title. A `BTreeMap` keeps
//! the persisted output stable across writes.

use std::collections::BTreeMap;

use crate::error::{RecipeError, Result};

/// Identifier → title
pub type Index = BTreeMap<String, String>;

/// Name of the index file inside the data directory
pub const INDEX_FILENAME: &str = "index.json";

/// Extension of every record file
pub const RECORD_EXTENSION: &str = "json";

/// Parse index bytes
///
/// Anything that is not a JSON object of string values is corruption,
/// including valid JSON of the wrong shape (`[]`, `{"a": 1}`).
pub fn decode_index(bytes: &[u8]) -> Result<Index> {
    serde_json::from_slice(bytes).map_err(RecipeError::CorruptIndex)
}

/// Serialize the index as compact JSON
pub fn encode_index(index: &Index) -> Result<Vec<u8>> {
    serde_json::to_vec(index).map_err(RecipeError::Serialization)
}
