//! Transaction envelope for multi-statement operations.

use rusqlite::{Connection, DropBehavior, Transaction, TransactionBehavior};

use crate::error::StorageResult;
use crate::storage::codec::map_write_error;

/// Run `op` inside a transaction.
///
/// Commits only if `op` returns `Ok`. An `Err` rolls back and is returned
/// unchanged; a panic unwinds through the transaction guard, which also
/// rolls back. The transaction is ended exactly once on every path.
///
/// The write lock is taken up front (`BEGIN IMMEDIATE`), so a read inside
/// `op` can never be invalidated by another writer before `op` writes.
pub fn run_in_transaction<R, F>(conn: &mut Connection, op: F) -> StorageResult<R>
where
    F: FnOnce(&Transaction<'_>) -> StorageResult<R>,
{
    let mut tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.set_drop_behavior(DropBehavior::Rollback);

    match op(&tx) {
        Ok(value) => {
            tx.commit().map_err(map_write_error)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            } else {
                tracing::debug!(error = %err, "Transaction rolled back");
            }
            Err(err)
        }
    }
}
