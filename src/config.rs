//! Configuration for the key-value store.
//!
//! Supports:
//! - CLI arguments via clap (flattened into `kvlitectl`)
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::schema::STORE_FILE_NAME;

/// Default size cap for the store file (6 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 6 * 1024 * 1024;

/// Store location and engine limits.
#[derive(Args, Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the store file
    #[arg(short, long, env = "KVLITE_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Maximum size of the store file in bytes
    #[arg(long, env = "KVLITE_MAX_SIZE_BYTES", default_value_t = DEFAULT_MAX_SIZE_BYTES)]
    pub max_size_bytes: u64,

    /// How long to wait on a locked database before failing
    #[arg(long, env = "KVLITE_BUSY_TIMEOUT_MS", default_value_t = 5_000)]
    pub busy_timeout_ms: u64,

    /// Pause between open attempts during recovery
    #[arg(long, env = "KVLITE_RETRY_BACKOFF_MS", default_value_t = 30)]
    pub retry_backoff_ms: u64,
}

impl StoreConfig {
    /// Config rooted at `data_dir` with default limits.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Path of the physical store file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Create a test configuration with a short backoff.
    #[cfg(test)]
    pub fn test_config(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            busy_timeout_ms: 1_000,
            retry_backoff_ms: 1,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            busy_timeout_ms: 5_000,
            retry_backoff_ms: 30,
        }
    }
}
