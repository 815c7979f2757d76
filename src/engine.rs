//! Synchronous key-value API.
//!
//! [`KvStorage`] is an explicitly constructed engine: build it, bind it to
//! a [`StoreConfig`] once with [`KvStorage::init`], then share it by
//! reference (or `Arc`). Every operation blocks the calling thread on
//! SQLite I/O and on the handle lock.

use rusqlite::Transaction;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::merge::merge_documents;
use crate::storage::batch::{remove_keys, MAX_SQL_KEYS};
use crate::storage::codec::{get_item, list_keys, set_item};
use crate::storage::supplier::ConnectionSupplier;
use crate::storage::transaction::run_in_transaction;

/// Key-value engine over a single SQLite handle.
#[derive(Debug, Default)]
pub struct KvStorage {
    supplier: OnceLock<ConnectionSupplier>,
}

impl KvStorage {
    /// Create an engine that is not yet bound to a store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine already bound to `config`.
    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        let storage = Self::new();
        storage.init(config)?;
        Ok(storage)
    }

    /// Bind the engine to a store. Allowed once.
    pub fn init(&self, config: StoreConfig) -> StorageResult<()> {
        let path = config.db_path();
        self.supplier
            .set(ConnectionSupplier::new(config))
            .map_err(|_| StorageError::AlreadyInitialized)?;
        tracing::info!(path = %path.display(), "Storage initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.supplier.get().is_some()
    }

    pub fn config(&self) -> Option<&StoreConfig> {
        self.supplier.get().map(ConnectionSupplier::config)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.supplier.get().map(ConnectionSupplier::db_path)
    }

    fn supplier(&self) -> StorageResult<&ConnectionSupplier> {
        self.supplier.get().ok_or(StorageError::NotInitialized)
    }

    /// Value stored under `key`, or `None` if absent.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let supplier = self.supplier()?;
        validate_key(key)?;
        supplier.with_connection(|conn| Ok(get_item(conn, key)?))
    }

    /// Store `value` under `key`, overwriting any previous value.
    #[tracing::instrument(skip(self, value))]
    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let supplier = self.supplier()?;
        validate_key(key)?;
        supplier.with_connection(|conn| ensure_written(set_item(conn, key, value)?, key))
    }

    /// Deep-merge the JSON object `value` into the object stored at `key`.
    ///
    /// With no existing value, `value` is stored verbatim. Otherwise both
    /// sides must be JSON objects. Read, merge and write share one
    /// transaction, so a failed merge leaves the stored value untouched.
    #[tracing::instrument(skip(self, value))]
    pub fn merge(&self, key: &str, value: &str) -> StorageResult<()> {
        let supplier = self.supplier()?;
        validate_key(key)?;
        supplier.with_connection(|conn| {
            run_in_transaction(conn, |tx| {
                let merged = match get_item(tx, key)? {
                    None => value.to_owned(),
                    Some(existing) => merge_documents(&existing, value)?,
                };
                ensure_written(set_item(tx, key, &merged)?, key)
            })
        })
    }

    /// Remove `keys` atomically, returning how many rows were deleted.
    #[tracing::instrument(skip_all, fields(keys = keys.len()))]
    pub fn remove<S: AsRef<str>>(&self, keys: &[S]) -> StorageResult<usize> {
        let supplier = self.supplier()?;
        for key in keys {
            validate_key(key.as_ref())?;
        }
        if keys.is_empty() {
            return Ok(0);
        }
        supplier.with_connection(|conn| remove_keys(conn, keys, MAX_SQL_KEYS))
    }

    /// Every stored key, in no particular order.
    pub fn list_keys(&self) -> StorageResult<Vec<String>> {
        self.supplier()?
            .with_connection(|conn| Ok(list_keys(conn)?))
    }

    /// Delete every record, returning the number removed.
    #[tracing::instrument(skip(self))]
    pub fn clear(&self) -> StorageResult<usize> {
        let deleted = self.supplier()?.clear()?;
        tracing::info!(deleted, "Storage cleared");
        Ok(deleted)
    }

    /// Clear and close the store, deleting it if clearing fails.
    #[tracing::instrument(skip(self))]
    pub fn clear_and_close(&self) -> StorageResult<()> {
        self.supplier()?.clear_and_close()
    }

    /// Release the handle. The next operation reopens it.
    pub fn close(&self) -> StorageResult<()> {
        self.supplier()?.close();
        Ok(())
    }

    /// Run `op` inside one transaction on the shared handle.
    ///
    /// `op` commits when it returns `Ok` and rolls back otherwise.
    pub fn run_in_transaction<R, F>(&self, op: F) -> StorageResult<R>
    where
        F: FnOnce(&Transaction<'_>) -> StorageResult<R>,
    {
        self.supplier()?
            .with_connection(|conn| run_in_transaction(conn, op))
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".into()));
    }
    Ok(())
}

fn ensure_written(written: bool, key: &str) -> StorageResult<()> {
    if written {
        Ok(())
    } else {
        Err(StorageError::WriteRejected(format!("no row written for key {key}")))
    }
}
