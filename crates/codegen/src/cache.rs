// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bounded, thread-safe cache of compiled artifacts.
//!
//! # Keying
//!
//! Entries are keyed by the full identity of a compile request:
//!
//! ```text
//! (ModelDigest, target_chip, model_name)  ──►  Arc<CompiledArtifact>
//! ```
//!
//! Concurrent requests with different keys never replace each other's
//! entries. When the cache is full, the least recently used entry is
//! evicted.
//!
//! The cache is an ordinary value: callers share it through an `Arc`, and
//! an analyzer invalidates it explicitly when a new model is uploaded.

use crate::{CompileError, CompiledArtifact, ModelDigest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity of a compile request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub digest: ModelDigest,
    pub target_chip: String,
    pub model_name: String,
}

impl CacheKey {
    pub fn new(digest: ModelDigest, target_chip: &str, model_name: &str) -> Self {
        Self {
            digest,
            target_chip: target_chip.to_string(),
            model_name: model_name.to_string(),
        }
    }
}

/// Cumulative cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    /// Calls to [`ArtifactCache::invalidate_all`].
    pub invalidations: u64,
}

impl CacheStats {
    /// Returns the hit ratio in `[0.0, 1.0]`; `0.0` before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Front = least recently used.
    entries: VecDeque<(CacheKey, Arc<CompiledArtifact>)>,
    stats: CacheStats,
}

/// LRU cache of [`CompiledArtifact`]s.
///
/// # Example
/// ```
/// use codegen::{ArtifactCache, CacheKey, CompiledArtifact, ModelDigest};
/// # use onnx_ir::ModelInfo;
/// # fn demo(info: &ModelInfo) -> Result<(), codegen::CompileError> {
/// let cache = ArtifactCache::new(8);
/// let key = CacheKey::new(ModelDigest::of(info)?, "ESP32", "model");
/// let artifact = cache.get_or_try_insert(key, || {
///     Ok(CompiledArtifact {
///         model_name: "model".into(),
///         source: String::new(),
///         header: String::new(),
///     })
/// })?;
/// assert_eq!(artifact.model_name, "model");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArtifactCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ArtifactCache {
    /// Creates a cache holding at most `capacity` artifacts. A capacity of
    /// zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up `key`, marking it most recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompiledArtifact>> {
        let mut inner = self.lock();
        let found = match inner.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => inner.entries.remove(pos),
            None => None,
        };
        match found {
            Some(entry) => {
                let artifact = Arc::clone(&entry.1);
                inner.entries.push_back(entry);
                inner.stats.hits += 1;
                tracing::debug!("artifact cache hit: {:?}", key);
                Some(artifact)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Inserts or replaces the entry for `key`, evicting the least
    /// recently used entry if the cache is full.
    pub fn insert(&self, key: CacheKey, artifact: Arc<CompiledArtifact>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.lock();
        inner.entries.retain(|(k, _)| k != &key);
        while inner.entries.len() >= self.capacity {
            if let Some((evicted, _)) = inner.entries.pop_front() {
                tracing::debug!("artifact cache evict: {:?}", evicted);
                inner.stats.evictions += 1;
            }
        }
        inner.entries.push_back((key, artifact));
    }

    /// Returns the cached artifact for `key`, or runs `compile` and caches
    /// its result. Errors are returned and never cached.
    ///
    /// The lock is not held while `compile` runs, so two threads missing
    /// on the same key may both compile; both get equal artifacts.
    pub fn get_or_try_insert<F>(
        &self,
        key: CacheKey,
        compile: F,
    ) -> Result<Arc<CompiledArtifact>, CompileError>
    where
        F: FnOnce() -> Result<CompiledArtifact, CompileError>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let artifact = Arc::new(compile()?);
        self.insert(key, Arc::clone(&artifact));
        Ok(artifact)
    }

    /// Drops every entry.
    pub fn invalidate_all(&self) {
        let mut inner = self.lock();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.stats.invalidations += 1;
        tracing::debug!("artifact cache invalidated ({dropped} entries dropped)");
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Every critical section leaves `Inner` consistent, so a panic on
    /// another thread does not invalidate the entries.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new(8)
    }
}
