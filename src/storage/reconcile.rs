//! Reconciliation report
//!
//! Result of comparing the index against the record files actually present.

use std::fmt;

/// Divergence between the index and the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Record files on disk with no index entry (sorted)
    pub unindexed: Vec<String>,

    /// Index entries whose record file is gone (sorted)
    pub missing: Vec<String>,

    /// Record files that could not be read or parsed during a repair (sorted)
    pub unreadable: Vec<String>,
}

impl ReconcileReport {
    /// True when index keys and record files match exactly
    pub fn is_consistent(&self) -> bool {
        self.unindexed.is_empty() && self.missing.is_empty()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unindexed, {} missing, {} unreadable",
            self.unindexed.len(),
            self.missing.len(),
            self.unreadable.len()
        )
    }
}
