//! Storage Module
//!
//! File-per-record persistence with a denormalized title index.
//!
//! ## Responsibilities
//! - Own the data directory and everything the engine writes into it
//! - Enforce the identifier grammar before any path is built
//! - Keep `index.json` in step with the record files on disk
//! - Detect (and optionally repair) divergence between the two
//!
//! ## On-disk Layout
//! ```text
//! {data_dir}/
//! ├── index.json            { "chocolate-cake": "Chocolate Cake!", ... }
//! ├── chocolate-cake.json   { "title": "Chocolate Cake!", ... }
//! └── 1chocolate-cake.json  { "title": "Chocolate Cake!", ... }
//! ```
//!
//! ## Write Path
//! ```text
//! set_item(id, record)
//!   ├─ validate id            (no I/O)
//!   ├─ write {id}.json        ── interleaving point
//!   ├─ update cached index
//!   └─ write index.json       ── interleaving point
//! ```
//! The two writes are independent. A failure between them leaves a record
//! without an index entry until `reconcile`/`repair` notices it.

mod id;
mod index;
mod reconcile;
mod store;

pub use id::{is_valid_id, validate_id, MAX_ID_LEN, RESERVED_ID};
pub use index::{decode_index, encode_index, Index, INDEX_FILENAME, RECORD_EXTENSION};
pub use reconcile::ReconcileReport;
pub use store::RecipeStore;
