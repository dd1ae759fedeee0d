//! Identifier Allocator
//!
//! Turns a free-text title into an unused identifier.
//!
//! ```text
//! "Chocolate Cake!"  ──slugify──▶  "chocolate-cake"
//!                                     │ exists? yes
//!                                  "1chocolate-cake"
//!                                     │ exists? yes
//!                                  "2chocolate-cake"
//!                                     │ exists? no
//!                                     ▼
//!                                  returned (nothing persisted)
//! ```
//!
//! The probe and the caller's subsequent write are separate steps. Another
//! writer can claim the same identifier in between; callers that need
//! in-process uniqueness must hold a lock across allocate + write.

use crate::error::{RecipeError, Result};
use crate::storage::{is_valid_id, RecipeStore, MAX_ID_LEN};

/// Anything that can answer "is this identifier taken?"
pub trait ExistenceProbe {
    fn exists(&self, id: &str) -> bool;
}

impl ExistenceProbe for RecipeStore {
    fn exists(&self, id: &str) -> bool {
        RecipeStore::exists(self, id)
    }
}

/// Derive a base identifier from a title
///
/// - ASCII letters are lowercased
/// - everything else outside `[a-z0-9-]` is dropped
/// - the words that remain are joined with `-`
/// - the result is capped at `MAX_ID_LEN`
pub fn slugify(title: &str) -> String {
    let words: Vec<String> = title
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect();

    let mut slug = words.join("-");
    slug.truncate(MAX_ID_LEN);
    slug
}

/// The `attempt`-th candidate for a base slug
///
/// `0` is the base itself; later attempts put the counter in front and
/// re-truncate, so long slugs lose characters from the end.
pub fn candidate(base: &str, attempt: u64) -> String {
    if attempt == 0 {
        return base.to_string();
    }
    let mut id = format!("{}{}", attempt, base);
    // ASCII only, so byte truncation is a char truncation
    id.truncate(MAX_ID_LEN);
    id
}

/// Find the first unused identifier for `title`
///
/// Candidates the grammar rejects (the reserved `index`) are skipped as
/// if taken. Fails with `InvalidIdentifier` when the title has no usable characters.
pub fn allocate<P: ExistenceProbe + ?Sized>(probe: &P, title: &str) -> Result<String> {
    let base = slugify(title);
    if base.is_empty() {
        return Err(RecipeError::InvalidIdentifier(title.to_string()));
    }

    let mut attempt = 0u64;
    loop {
        let id = candidate(&base, attempt);
        if is_valid_id(&id) && !probe.exists(&id) {
            if attempt > 0 {
                tracing::debug!("Allocated {} after {} collisions", id, attempt);
            }
            return Ok(id);
        }
        attempt += 1;
    }
}
