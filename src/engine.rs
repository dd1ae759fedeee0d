//! Engine Module
//!
//! Request-level operations on top of the storage engine.
//!
//! ## Responsibilities
//! - Map list/read/create/update/delete onto `RecipeStore` calls
//! - Drive the identifier allocator for creates
//! - Pick the response status for each outcome
//!
//! | request | storage calls                          | success     |
//! |---------|----------------------------------------|-------------|
//! | list    | `get_index`                            | 200 + index |
//! | read    | `get_item`                             | 200 + body  |
//! | create  | `allocate` → `set_item`                | 201 + id    |
//! | update  | `exists` guard → `set_item`            | 204         |
//! | delete  | `remove_item`                          | 204         |

use std::sync::Arc;

use parking_lot::Mutex;

use crate::allocator;
use crate::config::Config;
use crate::error::{RecipeError, Result};
use crate::protocol::{Command, Response, Status};
use crate::record::Record;
use crate::storage::{validate_id, Index, RecipeStore};

/// Request handler shared by every connection
///
/// ## Concurrency
/// Reads and updates go straight to the store. Creates hold `create_lock`
/// across allocate + write so two creates in this process can never be
/// handed the same identifier. Writers in other processes are not covered.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The storage engine, shared by handle
    store: Arc<RecipeStore>,

    /// Serializes allocate + set_item for creates
    create_lock: Mutex<()>,
}

impl Engine {
    /// Open the store described by `config` and wrap it
    pub fn open(config: Config) -> Result<Self> {
        let store = RecipeStore::open(&config)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Wrap an already-initialized store
    pub fn with_store(config: Config, store: Arc<RecipeStore>) -> Self {
        Self {
            config,
            store,
            create_lock: Mutex::new(()),
        }
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers. Failures are returned as
    /// errors; `Response::from_error` turns them into client responses.
    pub fn execute(&self, command: Command) -> Result<Response> {
        match command {
            Command::List => Response::json(Status::Ok, &self.list()?),
            Command::Read { id } => Response::json(Status::Ok, &self.read(&id)?),
            Command::Create { record } => {
                let id = self.create(&record)?;
                Ok(Response::created(&id))
            }
            Command::Update { id, record } => {
                self.update(&id, &record)?;
                Ok(Response::no_content())
            }
            Command::Delete { id } => {
                self.delete(&id)?;
                Ok(Response::no_content())
            }
            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),
        }
    }

    /// Full index, read from disk
    pub fn list(&self) -> Result<Index> {
        self.store.get_index()
    }

    /// One record
    pub fn read(&self, id: &str) -> Result<Record> {
        self.store.get_item(id)
    }

    /// Store `record` under a fresh identifier derived from its title
    pub fn create(&self, record: &Record) -> Result<String> {
        let _guard = self.create_lock.lock();

        let id = allocator::allocate(self.store.as_ref(), &record.title)?;
        self.store.set_item(&id, record)?;

        tracing::info!("Created record {} ({:?})", id, record.title);
        Ok(id)
    }

    /// Replace the record under `id`; it must already exist
    ///
    /// The existence check and the write are separate steps. A delete that
    /// lands in between runs to completion first (`set_item` and
    /// `remove_item` are serialized by the store), so this call recreates
    /// both the record file and its index entry.
    pub fn update(&self, id: &str, record: &Record) -> Result<()> {
        validate_id(id)?;
        if !self.store.exists(id) {
            return Err(RecipeError::NotFound(id.to_string()));
        }

        self.store.set_item(id, record)?;
        tracing::debug!("Updated record {}", id);
        Ok(())
    }

    /// Remove the record under `id`
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.remove_item(id)?;
        tracing::debug!("Deleted record {}", id);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the underlying store
    pub fn store(&self) -> &Arc<RecipeStore> {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
