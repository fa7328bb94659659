// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded cache of compiled regular expressions

use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Basic cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegexCacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that compiled a pattern
    pub misses: u64,
}

impl RegexCacheStats {
    /// Hit ratio as percentage
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner {
    cache: LruCache<String, Arc<Regex>>,
    stats: RegexCacheStats,
}

/// Thread-safe LRU cache of compiled patterns.
///
/// Patterns that fail to compile are not cached.
pub struct RegexCache {
    inner: Mutex<Inner>,
}

impl RegexCache {
    /// Create a cache holding up to `capacity` patterns (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(capacity),
                stats: RegexCacheStats::default(),
            }),
        }
    }

    /// Compiled regex for `pattern`, compiling and caching it on a miss
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        {
            let mut inner = self.inner.lock();
            if let Some(regex) = inner.cache.get(pattern).cloned() {
                inner.stats.hits += 1;
                return Ok(regex);
            }
            inner.stats.misses += 1;
        }

        // Compile outside the lock; a concurrent miss on the same pattern
        // compiles twice and the later put wins.
        let regex = Arc::new(Regex::new(pattern)?);
        self.inner.lock().cache.put(pattern.to_string(), Arc::clone(&regex));
        Ok(regex)
    }

    /// Number of cached patterns
    pub fn len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached patterns
    pub fn capacity(&self) -> usize {
        self.inner.lock().cache.cap().get()
    }

    /// Current statistics
    pub fn stats(&self) -> RegexCacheStats {
        self.inner.lock().stats
    }

    /// Drop all cached patterns and reset statistics
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.cache.clear();
        inner.stats = RegexCacheStats::default();
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(128)
    }
}

impl std::fmt::Debug for RegexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RegexCache")
            .field("len", &inner.cache.len())
            .field("capacity", &inner.cache.cap())
            .field("stats", &inner.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_and_eviction() {
        let cache = RegexCache::new(2);
        cache.get_or_compile(r"\d+").unwrap();
        cache.get_or_compile(r"\d+").unwrap();
        cache.get_or_compile(r"\s+").unwrap();
        cache.get_or_compile(r"[a-z]").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), RegexCacheStats { hits: 1, misses: 3 });
        assert_eq!(cache.stats().hit_ratio(), 25.0);
    }

    #[test]
    fn test_invalid_pattern_is_not_cached() {
        let cache = RegexCache::new(4);
        assert!(cache.get_or_compile("(unclosed").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        assert_eq!(RegexCache::new(0).capacity(), 1);
    }
}
