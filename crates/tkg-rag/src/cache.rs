//! Subject cache for context retrieval
//!
//! Memoises the subject phrases extracted from a query so repeated
//! questions skip tagging and grouping. Keys are hashes of the query text.
//!
//! Author: hephaex@gmail.com

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the subject cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached queries
    pub max_capacity: u64,

    /// Time-to-live for an entry (in seconds)
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_seconds: 3600,
        }
    }
}

/// Cache of query -> subject phrases
#[derive(Clone)]
pub struct SubjectCache {
    cache: Cache<u64, Arc<Vec<String>>>,
    stats: Arc<CacheStats>,
}

impl SubjectCache {
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    pub fn with_config(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();

        Self {
            cache,
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub async fn get(&self, query: &str) -> Option<Arc<Vec<String>>> {
        let result = self.cache.get(&hash_text(query)).await;

        if result.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    pub async fn put(&self, query: &str, subjects: Vec<String>) -> Arc<Vec<String>> {
        let subjects = Arc::new(subjects);
        self.cache.insert(hash_text(query), subjects.clone()).await;
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        subjects
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStatsReport {
        self.stats.report()
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for SubjectCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Hit/miss counters
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl CacheStats {
    fn report(&self) -> CacheStatsReport {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStatsReport {
            hits,
            misses,
            writes: self.writes.load(Ordering::Relaxed),
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}

/// Serializable cache statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsReport {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    /// 0.0 - 1.0
    pub hit_rate: f64,
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
