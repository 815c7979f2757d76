//! Chunked batch deletes.
//!
//! SQLite caps the number of bound parameters per statement, so a large
//! key list is split into chunks of at most [`MAX_SQL_KEYS`] keys. Every
//! chunk becomes one `DELETE ... WHERE key IN (?, ...)`, and all chunks run
//! in a single transaction.

use rusqlite::{params_from_iter, Connection};

use crate::error::StorageResult;
use crate::storage::schema::{KEY_COLUMN, TABLE_NAME};
use crate::storage::transaction::run_in_transaction;

/// Maximum keys bound in a single statement.
pub const MAX_SQL_KEYS: usize = 999;

/// Number of chunks needed for `key_count` keys.
pub fn chunk_count(key_count: usize, max_chunk: usize) -> usize {
    key_count.div_ceil(max_chunk.max(1))
}

/// Split `keys` into order-preserving chunks of at most `max_chunk` keys.
pub fn key_chunks<S>(keys: &[S], max_chunk: usize) -> std::slice::Chunks<'_, S> {
    keys.chunks(max_chunk.max(1))
}

/// Build the filter `key IN (?, ?, ..., ?)` with `count` placeholders.
pub fn build_key_selection(count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!("{KEY_COLUMN} IN ({placeholders})")
}

/// Delete `keys` atomically, returning the number of rows removed.
pub fn remove_keys<S: AsRef<str>>(
    conn: &mut Connection,
    keys: &[S],
    max_chunk: usize,
) -> StorageResult<usize> {
    run_in_transaction(conn, |tx| {
        let mut deleted = 0;
        for chunk in key_chunks(keys, max_chunk) {
            let sql = format!(
                "DELETE FROM {TABLE_NAME} WHERE {}",
                build_key_selection(chunk.len())
            );
            deleted += tx.execute(&sql, params_from_iter(chunk.iter().map(AsRef::as_ref)))?;
        }
        tracing::debug!(
            keys = keys.len(),
            chunks = chunk_count(keys.len(), max_chunk),
            deleted,
            "Batch delete committed"
        );
        Ok(deleted)
    })
}
