// MediaGit - Git for Media Files
// Copyright (C) 2025 MediaGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! In-memory mock storage backend for testing
//!
//! Provides a thread-safe, in-memory implementation of [`StorageBackend`](crate::StorageBackend)
//! using `Arc<RwLock<HashMap>>` for concurrent access.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mediagit_storage::{StorageBackend, mock::MockBackend};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = MockBackend::new();
//!
//!     // Store data
//!     storage.put("test.bin", b"hello world").await?;
//!
//!     // Retrieve data
//!     let data = storage.get("test.bin").await?;
//!     assert_eq!(data, b"hello world");
//!
//!     // Check existence
//!     assert!(storage.exists("test.bin").await?);
//!
//!     // List objects
//!     let objects = storage.list_objects("test").await?;
//!     assert_eq!(objects.len(), 1);
//!
//!     // Delete object
//!     storage.delete("test.bin").await?;
//!     assert!(!storage.exists("test.bin").await?);
//!
//!     Ok(())
//! }
//! ```

use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory mock storage backend for testing
///
/// Thread-safe implementation suitable for unit and integration tests.
/// Uses `Arc<RwLock<HashMap>>` to allow concurrent read/write operations.
///
/// # Thread Safety
///
/// This implementation is `Send + Sync` and can be safely shared across threads
/// and async tasks.
#[derive(Clone)]
pub struct MockBackend {
    store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MockBackend {
    /// Create a new empty mock storage backend
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use mediagit_storage::mock::MockBackend;
    ///
    /// let storage = MockBackend::new();
    /// ```
    pub fn new() -> Self {
        MockBackend {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a mock storage backend with initial data
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use mediagit_storage::mock::MockBackend;
    ///
    /// let mut initial_data = std::collections::HashMap::new();
    /// initial_data.insert("key1".to_string(), vec![1, 2, 3]);
    /// initial_data.insert("key2".to_string(), vec![4, 5, 6]);
    ///
    /// let storage = MockBackend::with_data(initial_data);
    /// ```
    pub fn with_data(initial_data: HashMap<String, Vec<u8>>) -> Self {
        MockBackend {
            store: Arc::new(RwLock::new(initial_data)),
        }
    }

    /// Get the current number of objects stored
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use mediagit_storage::mock::MockBackend;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let storage = MockBackend::new();
    /// assert_eq!(storage.len().await, 0);
    /// # }
    /// ```
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Check if the storage is empty
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use mediagit_storage::mock::MockBackend;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let storage = MockBackend::new();
    /// assert!(storage.is_empty().await);
    /// # }
    /// ```
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Clear all stored objects
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use mediagit_storage::mock::MockBackend;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let storage = MockBackend::new();
    /// storage.clear().await;
    /// assert!(storage.is_empty().await);
    /// # }
    /// ```
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Get a copy of all stored keys
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use mediagit_storage::mock::MockBackend;
    /// # use mediagit_storage::StorageBackend;
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let storage = MockBackend::new();
    /// storage.put("a", b"data").await?;
    /// storage.put("b", b"data").await?;
    ///
    /// let keys = storage.keys().await;
    /// assert_eq!(keys.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys().cloned().collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBackend").finish()
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        if key.is_empty() {
            return Err(anyhow::anyhow!("key cannot be empty"));
        }

        let store = self.store.read().await;
        store
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("object not found: {}", key))
    }

    async fn put(&self, key: &str, data: &[u8]) -> anyhow::Result<()> {
        if key.is_empty() {
            return Err(anyhow::anyhow!("key cannot be empty"));
        }

        let mut store = self.store.write().await;
        store.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        if key.is_empty() {
            return Err(anyhow::anyhow!("key cannot be empty"));
        }

        let store = self.store.read().await;
        Ok(store.contains_key(key))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        if key.is_empty() {
            return Err(anyhow::anyhow!("key cannot be empty"));
        }

        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let store = self.store.read().await;
        let mut results: Vec<String> = store
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        results.sort();
        Ok(results)
    }
}
