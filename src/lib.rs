//! # RecipeBox
//!
//! A file-backed recipe store with:
//! - One JSON file per record, named by its identifier
//! - A denormalized `index.json` of identifier → title
//! - Title-derived identifiers with collision probing
//! - Index/record reconciliation for crash leftovers
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │         (list / read / create / update / delete)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Allocator  │─exists──▶│ RecipeStore │
//!   │ (slug + n)  │          │  (RwLock)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                        index.json + {id}.json
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod allocator;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RecipeError, Result};
pub use config::{Config, ReconcileMode};
pub use engine::Engine;
pub use record::Record;
pub use storage::RecipeStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RecipeBox
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
