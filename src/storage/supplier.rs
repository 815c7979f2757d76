//! Connection supplier: owns the single SQLite handle.
//!
//! The handle sits behind one mutex, so open, close, clear and every
//! statement are serialized. It is opened lazily on first use and reopened
//! through the [`RecoveryPolicy`] whenever it is missing or stale.

use rusqlite::{Connection, OpenFlags};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::storage::codec::delete_all;
use crate::storage::recovery::{RecoveryAction, RecoveryPolicy};
use crate::storage::schema::{apply_pragmas, initialize_schema, SchemaInit};

/// Suffixes of the files SQLite keeps next to the main store file.
const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Owner of the process-wide connection handle.
pub struct ConnectionSupplier {
    config: StoreConfig,
    db_path: PathBuf,
    policy: RecoveryPolicy,
    conn: Mutex<Option<Connection>>,
    destructive_recoveries: AtomicUsize,
}

impl ConnectionSupplier {
    /// Create a supplier with the standard recovery ladder. Nothing is
    /// opened until the first operation.
    pub fn new(config: StoreConfig) -> Self {
        let policy = RecoveryPolicy::standard(config.retry_backoff());
        Self::with_policy(config, policy)
    }

    pub fn with_policy(config: StoreConfig, policy: RecoveryPolicy) -> Self {
        let db_path = config.db_path();
        Self {
            config,
            db_path,
            policy,
            conn: Mutex::new(None),
            destructive_recoveries: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// How many times the store was deleted to get it open again.
    pub fn destructive_recoveries(&self) -> usize {
        self.destructive_recoveries.load(Ordering::Relaxed)
    }

    /// Whether a handle is currently held.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` against the open handle, opening it first if needed.
    ///
    /// A held handle counts as usable as long as the store file still
    /// exists on disk; otherwise it is closed and reopened. The handle lock
    /// is held for the whole call.
    pub fn with_connection<R, F>(&self, f: F) -> StorageResult<R>
    where
        F: FnOnce(&mut Connection) -> StorageResult<R>,
    {
        let mut slot = self.lock();
        let conn = self.ensure_open(&mut slot)?;
        f(conn)
    }

    /// Delete all records, returning how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        self.with_connection(|conn| Ok(delete_all(conn)?))
    }

    /// Clear and close; fall back to deleting the store if clearing fails.
    ///
    /// Fails with [`StorageError::StorageCorrupt`] only when the store
    /// can neither be cleared nor deleted.
    pub fn clear_and_close(&self) -> StorageResult<()> {
        let mut slot = self.lock();

        let cleared = self
            .ensure_open(&mut slot)
            .and_then(|conn| Ok(delete_all(conn)?));

        match cleared {
            Ok(deleted) => {
                close_slot(&mut slot);
                tracing::info!(deleted, path = %self.db_path.display(), "Store cleared and closed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Clearing store failed, deleting it instead");
                close_slot(&mut slot);
                match delete_store_files(&self.db_path) {
                    Ok(()) => Ok(()),
                    Err(io_err) => {
                        tracing::error!(
                            error = %io_err,
                            path = %self.db_path.display(),
                            "Clearing and deleting store failed"
                        );
                        Err(StorageError::StorageCorrupt {
                            path: self.db_path.clone(),
                        })
                    }
                }
            }
        }
    }

    /// Release the handle if one is open. Safe to call repeatedly.
    pub fn close(&self) {
        let mut slot = self.lock();
        close_slot(&mut slot);
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        // A panic inside a transaction rolls it back on unwind, so the
        // connection behind a poisoned lock is still consistent.
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Connection lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn ensure_open<'a>(&self, slot: &'a mut Option<Connection>) -> StorageResult<&'a mut Connection> {
        let conn = match slot.take() {
            Some(conn) if self.db_path.exists() => conn,
            stale => {
                if let Some(conn) = stale {
                    tracing::warn!(path = %self.db_path.display(), "Store file vanished, reopening");
                    close_connection(conn);
                }
                self.open_with_recovery()?
            }
        };
        Ok(slot.insert(conn))
    }

    fn open_with_recovery(&self) -> StorageResult<Connection> {
        self.policy
            .run(|action| {
                if action == RecoveryAction::DeleteAndReopen {
                    self.destructive_recoveries.fetch_add(1, Ordering::Relaxed);
                    if let Err(err) = delete_store_files(&self.db_path) {
                        tracing::warn!(error = %err, path = %self.db_path.display(), "Failed to delete store");
                    }
                }
                open_store(&self.config, &self.db_path)
            })
            .map_err(StorageError::StorageUnavailable)
    }
}

impl std::fmt::Debug for ConnectionSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSupplier")
            .field("db_path", &self.db_path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Open the store file, apply pragmas and bring the schema up to date.
fn open_store(config: &StoreConfig, db_path: &Path) -> rusqlite::Result<Connection> {
    if let Err(err) = std::fs::create_dir_all(&config.data_dir) {
        tracing::warn!(error = %err, dir = %config.data_dir.display(), "Failed to create data directory");
    }

    let mut conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    apply_pragmas(&conn, config.busy_timeout(), config.max_size_bytes)?;

    match initialize_schema(&mut conn)? {
        SchemaInit::Created => tracing::info!(path = %db_path.display(), "Created store"),
        SchemaInit::Current => tracing::debug!(path = %db_path.display(), "Opened store"),
        SchemaInit::Reset { from } => tracing::info!(
            path = %db_path.display(),
            from,
            "Schema version changed, store wiped"
        ),
    }
    Ok(conn)
}

fn close_slot(slot: &mut Option<Connection>) {
    if let Some(conn) = slot.take() {
        close_connection(conn);
    }
}

fn close_connection(conn: Connection) {
    if let Err((_, err)) = conn.close() {
        tracing::warn!(error = %err, "Closing connection failed");
    }
}

/// Remove the store file and its sidecars. Missing files are not an error.
fn delete_store_files(db_path: &Path) -> io::Result<()> {
    remove_if_exists(db_path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = db_path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_exists(Path::new(&sidecar))?;
    }
    tracing::info!(path = %db_path.display(), "Deleted store");
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
