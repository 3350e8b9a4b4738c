//! Storage Layer - dialect-abstracted SQL stores
//!
//! The bootstrap engine talks to storage only through the [`Store`] trait:
//! - raw queries and statements built with [`Query`]
//! - rows returned as string-keyed, string-valued maps
//! - an optional cached-read mode keyed by name and TTL, served by a
//!   [`QueryCache`] hook wired in during bootstrap
//!
//! Two dialects exist: embedded SQLite ([`SqliteStore`]) and networked MySQL
//! (`MysqlStore`, behind the `mysql` cargo feature). Dialect-specific SQL
//! rewriting lives in [`dialect`], placeholder substitution in [`template`].

pub mod dialect;
pub mod sqlite;
pub mod template;

#[cfg(feature = "mysql")]
pub mod mysql;

use std::collections::HashMap;
use std::sync::Arc;

use crate::Result;
use dialect::Dialect;

#[cfg(feature = "mysql")]
pub use self::mysql::MysqlStore;
pub use sqlite::SqliteStore;

/// A result row: column name to string-coerced value
pub type Row = HashMap<String, String>;

/// A statement to run against a [`Store`]
///
/// Carries raw SQL text plus an optional cached-read mode. Cached reads are
/// keyed by a caller-chosen name, not by the SQL text, so one key can cover a
/// whole table snapshot.
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
    cache: Option<(String, u64)>,
}

impl Query {
    /// Build a query from raw SQL text
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            cache: None,
        }
    }

    /// Serve this read through the attached query cache under `name`,
    /// refreshing after `ttl_secs`
    pub fn cached(mut self, name: &str, ttl_secs: u64) -> Self {
        self.cache = Some((name.to_string(), ttl_secs));
        self
    }

    /// The SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The cached-read mode, if any
    pub fn cache(&self) -> Option<(&str, u64)> {
        self.cache.as_ref().map(|(name, ttl)| (name.as_str(), *ttl))
    }
}

/// Byte-oriented get/set-with-expiry contract used by stores for result
/// caching
///
/// Implemented by the store-cache bridge so the store reuses the process
/// cache service instead of maintaining its own.
pub trait QueryCache: Send + Sync {
    /// Store `value` under `key` for `ttl_secs` seconds
    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()>;

    /// Fetch the bytes stored under `key`, or `None` on miss/expiry
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// A SQL store with a concrete dialect
pub trait Store: Send + Sync {
    /// The dialect this store speaks
    fn dialect(&self) -> &dyn Dialect;

    /// Run a read and return its rows
    fn query(&self, query: &Query) -> Result<Vec<Row>>;

    /// Run a statement and return the affected row count
    fn exec(&self, query: &Query) -> Result<usize>;

    /// Wire in the result cache. Called once during bootstrap, after the
    /// cache service exists; cached reads fall through to the store until
    /// then.
    fn attach_query_cache(&self, cache: Arc<dyn QueryCache>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_raw() {
        let q = Query::raw("select 1");
        assert_eq!(q.sql(), "select 1");
        assert!(q.cache().is_none());
    }

    #[test]
    fn test_query_cached() {
        let q = Query::raw("select * from config").cached("all_config", 3600);
        assert_eq!(q.cache(), Some(("all_config", 3600)));
    }
}
