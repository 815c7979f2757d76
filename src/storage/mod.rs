//! SQLite storage layer for Kvlite.
//!
//! Provides:
//! - Schema initialization and destructive version upgrades
//! - A single lazily opened connection with corruption recovery
//! - Row codec for point lookups and upserts
//! - Transaction envelope and chunked batch deletes

pub mod batch;
pub mod codec;
pub mod recovery;
pub mod schema;
pub mod supplier;
pub mod transaction;

pub use recovery::{RecoveryAction, RecoveryPolicy};
pub use supplier::ConnectionSupplier;
