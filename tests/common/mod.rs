//! Test utilities for Kvlite integration tests.
//!
//! Provides:
//! - Temporary store directories
//! - Engine constructors bound to them

#![allow(dead_code)]

use kvlite::{AsyncKvStorage, KvStorage, StoreConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that manages a temporary store directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory holding the store
    pub temp_dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with a temporary directory.
    pub fn new() -> Self {
        kvlite::observability::tracing::init_test_tracing();
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    /// Store config rooted in the fixture directory, with a fast backoff.
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            retry_backoff_ms: 1,
            ..StoreConfig::with_data_dir(self.temp_dir.path())
        }
    }

    /// Path of the store file.
    pub fn db_path(&self) -> PathBuf {
        self.config().db_path()
    }

    /// Synchronous engine bound to the fixture directory.
    pub fn storage(&self) -> KvStorage {
        KvStorage::open(self.config()).expect("failed to open storage")
    }

    /// Async engine bound to the fixture directory.
    pub fn async_storage(&self) -> AsyncKvStorage {
        AsyncKvStorage::open(self.config()).expect("failed to open storage")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.temp_dir.path().exists());
        assert!(fixture.db_path().ends_with("kvstorage.db"));
    }
}
