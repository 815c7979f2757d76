//! Row codec: point lookups, upserts and key scans.
//!
//! All functions take a plain `&Connection`, so they run the same on the
//! bare handle and inside a `Transaction` (which derefs to one).

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::error::{StorageError, StorageResult};
use crate::storage::schema::{KEY_COLUMN, TABLE_NAME, VALUE_COLUMN};

/// Return the value stored under `key`, or `None` if there is no such row.
pub fn get_item(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    let sql = format!("SELECT {VALUE_COLUMN} FROM {TABLE_NAME} WHERE {KEY_COLUMN} = ?1");
    conn.query_row(&sql, [key], |row| row.get(0)).optional()
}

/// Upsert `value` under `key`, replacing any existing row.
///
/// Returns whether SQLite reported the row as written. Size-cap and
/// oversized-value failures come back as [`StorageError::WriteRejected`].
pub fn set_item(conn: &Connection, key: &str, value: &str) -> StorageResult<bool> {
    let sql = format!(
        "INSERT OR REPLACE INTO {TABLE_NAME} ({KEY_COLUMN}, {VALUE_COLUMN}) VALUES (?1, ?2)"
    );
    let changed = conn
        .execute(&sql, params![key, value])
        .map_err(map_write_error)?;
    Ok(changed == 1)
}

/// All keys in engine scan order. Callers must not rely on the order.
pub fn list_keys(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("SELECT {KEY_COLUMN} FROM {TABLE_NAME}"))?;
    let keys = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}

/// Delete every row, returning how many were removed.
pub fn delete_all(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute(&format!("DELETE FROM {TABLE_NAME}"), [])
}

/// Classify an engine error raised by a write.
pub fn map_write_error(err: rusqlite::Error) -> StorageError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull | ErrorCode::TooBig) => StorageError::WriteRejected(err.to_string()),
        _ => StorageError::Database(err),
    }
}
