//! Identifier grammar
//!
//! An identifier doubles as a filename stem, so it is restricted to
//! `[a-zA-Z0-9-]{1,255}`. `index` is reserved for the index file itself.

use crate::error::{RecipeError, Result};

/// Longest identifier accepted (bytes == chars, the grammar is ASCII-only)
pub const MAX_ID_LEN: usize = 255;

/// Stem of the index file; never a record identifier
pub const RESERVED_ID: &str = "index";

/// Check an identifier against the grammar
///
/// The reserved name is matched case-insensitively because `Index.json`
/// and `index.json` are the same file on case-insensitive filesystems.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !id.eq_ignore_ascii_case(RESERVED_ID)
}

/// Like [`is_valid_id`], but as an error for `?` use
pub fn validate_id(id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(RecipeError::InvalidIdentifier(id.to_string()))
    }
}
