//! Store-cache bridge
//!
//! Store drivers cache query results through the byte-oriented
//! [`QueryCache`] contract; the process cache service speaks strings. This
//! bridge adapts one to the other so the stores reuse the already-wired
//! cache instead of maintaining a second implementation.
//!
//! Payloads must be valid UTF-8. The stores only cache JSON-encoded row
//! snapshots, which always are; arbitrary binary payloads are rejected
//! rather than silently mangled.

use std::sync::Arc;
use std::time::Duration;

use super::Cache;
use crate::store::QueryCache;
use crate::{Error, Result};

/// Adapts the string cache service to the stores' byte contract
pub struct StoreCacheBridge {
    cache: Arc<dyn Cache>,
}

impl StoreCacheBridge {
    /// Bridge over an already-initialized cache service
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }
}

impl QueryCache for StoreCacheBridge {
    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        let text = std::str::from_utf8(value)
            .map_err(|e| Error::Cache(format!("non-UTF-8 payload for key {key}: {e}")))?;
        self.cache.set(key, text, Duration::from_secs(ttl_secs))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cache.get(key)?.map(String::into_bytes))
    }
}
