//! Cache service - string-keyed values with expiry
//!
//! General-purpose process cache used by the config resolver (via the
//! store's cached reads) and available to request handlers. The bootstrap
//! wires one [`MemoryCache`] into the context; [`bridge::StoreCacheBridge`]
//! adapts it to the byte-oriented contract the stores consume.

pub mod bridge;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::Result;

pub use bridge::StoreCacheBridge;

/// String-keyed cache with per-entry time-to-live
pub trait Cache: Send + Sync {
    /// Fetch the value under `key`, or `None` on miss/expiry
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for `ttl`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// In-process cache backed by a TTL map
///
/// Expired entries are dropped lazily on read; there is no background
/// sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.expires_at > now).count()
    }

    /// Whether the cache holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => true,
            }
        };

        if expired {
            self.entries.write().remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
