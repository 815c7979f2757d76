//! Schema definitions and connection setup.
//!
//! The store is one two-column table. Its version lives in SQLite's
//! `user_version` header field; any mismatch drops and recreates the table.

use rusqlite::Connection;

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "kvstorage.db";

/// Table holding every record.
pub const TABLE_NAME: &str = "catalystLocalStorage";

pub const KEY_COLUMN: &str = "key";
pub const VALUE_COLUMN: &str = "value";

/// Expected schema version. Bumping it wipes existing data on next open.
pub const SCHEMA_VERSION: i64 = 1;

fn create_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (\n    {KEY_COLUMN} TEXT PRIMARY KEY,\n    {VALUE_COLUMN} TEXT NOT NULL\n)"
    )
}

fn drop_table_sql() -> String {
    format!("DROP TABLE IF EXISTS {TABLE_NAME}")
}

/// What `initialize_schema` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaInit {
    /// Fresh store, table created.
    Created,
    /// Stored version matched.
    Current,
    /// Stored version differed; the table was dropped and recreated.
    Reset { from: i64 },
}

/// Apply connection pragmas: WAL journal, busy timeout and the size cap.
///
/// This is the first statement run against a freshly opened file, so a
/// file that is not a database fails here.
pub fn apply_pragmas(
    conn: &Connection,
    busy_timeout: std::time::Duration,
    max_size_bytes: u64,
) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    apply_size_cap(conn, max_size_bytes)?;
    Ok(())
}

/// Cap the store at `max_size_bytes` via `max_page_count`.
///
/// Returns the page limit SQLite actually applied; it never goes below the
/// current page count.
pub fn apply_size_cap(conn: &Connection, max_size_bytes: u64) -> rusqlite::Result<i64> {
    let page_size: i64 = conn.pragma_query_value(None, "page_size", |row| row.get(0))?;
    let max_bytes = i64::try_from(max_size_bytes).unwrap_or(i64::MAX);
    let max_pages = (max_bytes / page_size.max(1)).max(1);
    conn.pragma_update_and_check(None, "max_page_count", max_pages, |row| row.get(0))
}

/// Read the stored schema version.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Create the table, or drop and recreate it on a version mismatch.
pub fn initialize_schema(conn: &mut Connection) -> rusqlite::Result<SchemaInit> {
    let stored = schema_version(conn)?;
    let tx = conn.transaction()?;

    let outcome = if stored == SCHEMA_VERSION {
        SchemaInit::Current
    } else if stored == 0 {
        SchemaInit::Created
    } else {
        tx.execute(&drop_table_sql(), [])?;
        SchemaInit::Reset { from: stored }
    };

    tx.execute(&create_table_sql(), [])?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(outcome)
}
