//! Per-session memoization of fully resolved documents
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::location::Location;
use serde_json::Value;
use std::collections::HashMap;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached documents
    pub total_entries: usize,
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that required a load
    pub misses: usize,
}

/// Map from canonical location to its fully resolved tree.
///
/// Entries are only ever inserted after the document's references have all
/// been rewritten, and are never invalidated while the session lives.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<Location, Value>,
    hits: usize,
    misses: usize,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved document, recording a hit or miss
    pub fn get(&mut self, location: &Location) -> Option<&Value> {
        match self.entries.get(location) {
            Some(value) => {
                self.hits += 1;
                tracing::debug!(%location, "resolution cache hit");
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up a resolved document without touching the statistics
    pub fn peek(&self, location: &Location) -> Option<&Value> {
        self.entries.get(location)
    }

    /// Store a resolved document
    pub fn insert(&mut self, location: Location, value: Value) {
        self.entries.insert(location, value);
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locations cached so far, in no particular order
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.entries.keys()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Clear all cache entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
