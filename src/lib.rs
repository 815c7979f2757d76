//! Kvlite: a lightweight key-value store on top of embedded SQLite.
//!
//! Values are opaque strings (usually JSON text) addressed by a non-empty
//! string key. Writes are upserts, `merge` deep-merges JSON objects, and
//! batch removal is chunked to stay under SQLite's parameter limit.
//!
//! # Architecture
//!
//! - **Single handle**: one SQLite connection behind one lock, opened lazily
//! - **Self-healing**: a store that cannot be opened is deleted and recreated
//! - **Transactional**: multi-statement operations commit or roll back as a unit
//! - **Async-friendly**: every operation can run on Tokio's blocking pool
//!
//! # Modules
//!
//! - [`client`]: Async façade dispatching onto worker threads
//! - [`config`]: CLI and environment configuration
//! - [`engine`]: Synchronous [`KvStorage`] API
//! - [`error`]: Error taxonomy
//! - [`merge`]: Recursive JSON object merge
//! - [`observability`]: Tracing setup
//! - [`storage`]: SQLite persistence layer

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::schema::SCHEMA_VERSION is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes  // r#""# is fine for SQL
)]

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod observability;
pub mod storage;

pub use client::AsyncKvStorage;
pub use config::StoreConfig;
pub use engine::KvStorage;
pub use error::{StorageError, StorageResult};
