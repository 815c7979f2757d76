//! Async façade over [`KvStorage`].
//!
//! Every call runs the synchronous operation on Tokio's blocking pool and
//! resolves with exactly one result. Calls against the shared handle are
//! serialized by its lock; nothing orders two calls issued concurrently.
//! There is no cancellation: dropping the future does not stop the work
//! already handed to the pool.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::StoreConfig;
use crate::engine::KvStorage;
use crate::error::{StorageError, StorageResult};

/// Cloneable async handle to a shared [`KvStorage`].
#[derive(Clone, Debug)]
pub struct AsyncKvStorage {
    inner: Arc<KvStorage>,
}

impl AsyncKvStorage {
    pub fn new(storage: KvStorage) -> Self {
        Self {
            inner: Arc::new(storage),
        }
    }

    /// Create an engine bound to `config` and wrap it.
    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        Ok(Self::new(KvStorage::open(config)?))
    }

    /// The underlying synchronous engine.
    pub fn storage(&self) -> &Arc<KvStorage> {
        &self.inner
    }

    /// Run `op` on a worker thread and wait for its single result.
    pub async fn run<R, F>(&self, op: F) -> StorageResult<R>
    where
        F: FnOnce(&KvStorage) -> StorageResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let storage = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&storage))
            .await
            .map_err(|e| StorageError::WorkerFailed(e.to_string()))?
    }

    /// Run `op` on a worker thread and hand its result to `on_complete`.
    ///
    /// The callback runs on a Tokio task, never inline at the call site,
    /// and is called exactly once. Must be called within a Tokio runtime.
    pub fn dispatch<R, F, C>(&self, op: F, on_complete: C) -> JoinHandle<()>
    where
        F: FnOnce(&KvStorage) -> StorageResult<R> + Send + 'static,
        R: Send + 'static,
        C: FnOnce(StorageResult<R>) + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.run(op).await;
            on_complete(result);
        })
    }

    pub async fn get(&self, key: impl Into<String>) -> StorageResult<Option<String>> {
        let key = key.into();
        self.run(move |storage| storage.get(&key)).await
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) -> StorageResult<()> {
        let (key, value) = (key.into(), value.into());
        self.run(move |storage| storage.set(&key, &value)).await
    }

    pub async fn merge(&self, key: impl Into<String>, value: impl Into<String>) -> StorageResult<()> {
        let (key, value) = (key.into(), value.into());
        self.run(move |storage| storage.merge(&key, &value)).await
    }

    pub async fn remove(&self, keys: Vec<String>) -> StorageResult<usize> {
        self.run(move |storage| storage.remove(&keys)).await
    }

    pub async fn list_keys(&self) -> StorageResult<Vec<String>> {
        self.run(KvStorage::list_keys).await
    }

    pub async fn clear(&self) -> StorageResult<usize> {
        self.run(KvStorage::clear).await
    }

    pub async fn clear_and_close(&self) -> StorageResult<()> {
        self.run(KvStorage::clear_and_close).await
    }

    pub async fn close(&self) -> StorageResult<()> {
        self.run(KvStorage::close).await
    }
}
