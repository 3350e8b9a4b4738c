//! Service context - the process-wide aggregate of bootstrapped services
//!
//! Built exactly once during bootstrap through [`ContextBuilder`] and
//! immutable afterwards: consumers receive an `Arc<AppContext>` with getters
//! only, so the write-during-bootstrap-only contract holds by construction.
//! There is no global slot - the context is passed by injection to whatever
//! needs it (router, handlers, jobs).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::cache::Cache;
use crate::config::AppConfig;
use crate::index::SearchIndex;
use crate::store::template::apply_prefix;
use crate::store::{Query, Store};
use crate::{Error, Result};

/// Cache key for the whole config-table snapshot (one key, not
/// per-namespace)
const CONFIG_CACHE_KEY: &str = "all_config";

/// Snapshot time-to-live in seconds
const CONFIG_CACHE_TTL: u64 = 3600;

/// Aggregate of the handles bootstrap wires up
pub struct AppContext {
    config: AppConfig,
    config_file: PathBuf,
    debug: bool,
    store: Arc<dyn Store>,
    cache: Arc<dyn Cache>,
    index: Option<Arc<SearchIndex>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config_file", &self.config_file)
            .field("debug", &self.debug)
            .field("has_index", &self.index.is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// The process configuration the context was built from
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Path the configuration was loaded from
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Whether the process runs in debug mode
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// The bootstrapped store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The process cache service
    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// The full-text index, when enabled
    pub fn index(&self) -> Option<&Arc<SearchIndex>> {
        self.index.as_ref()
    }

    /// Resolve a dotted settings path against the `config` table.
    ///
    /// `"namespace"` returns the namespace's decoded JSON object;
    /// `"namespace.field"` returns the field's value coerced to a string.
    /// Only the first two segments are consulted - anything deeper is
    /// ignored. Every failure (store read, missing namespace or field,
    /// malformed JSON) degrades to `default`; settings reads never
    /// interrupt request handling.
    ///
    /// Reads go through one cached snapshot of the whole table
    /// (`all_config`, 3600 s TTL), so steady-state resolution costs no
    /// store access.
    pub fn resolve(&self, path: &str, default: &str) -> Value {
        let mut segments = path.split('.');
        let namespace = segments.next().unwrap_or_default();
        let field = segments.next();

        let query = Query::raw(apply_prefix(
            self.store.dialect(),
            "select * from __PREFIX__config",
        ))
        .cached(CONFIG_CACHE_KEY, CONFIG_CACHE_TTL);

        let rows = match self.store.query(&query) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("config read failed, defaulting {}: {}", path, e);
                return Value::String(default.to_string());
            }
        };

        let row = rows
            .iter()
            .find(|r| r.get("key").map(String::as_str) == Some(namespace));
        let Some(raw) = row.and_then(|r| r.get("value")) else {
            return Value::String(default.to_string());
        };

        let decoded: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("config payload for {} is not JSON: {}", namespace, e);
                return Value::String(default.to_string());
            }
        };

        match field {
            None => decoded,
            Some(field) => match decoded.get(field) {
                None => Value::String(default.to_string()),
                Some(Value::String(s)) => Value::String(s.clone()),
                Some(v) => Value::String(v.to_string()),
            },
        }
    }

    /// [`resolve`](Self::resolve), flattened to a plain string
    pub fn resolve_str(&self, path: &str, default: &str) -> String {
        match self.resolve(path, default) {
            Value::String(s) => s,
            v => v.to_string(),
        }
    }
}

/// Bootstrap-time assembly of an [`AppContext`]
///
/// Setters are consumed in the fixed bootstrap order; [`build`](Self::build)
/// checks that the required handles were wired.
pub struct ContextBuilder {
    config: AppConfig,
    config_file: PathBuf,
    debug: bool,
    store: Option<Arc<dyn Store>>,
    cache: Option<Arc<dyn Cache>>,
    index: Option<Arc<SearchIndex>>,
}

impl ContextBuilder {
    /// Start from a loaded configuration, capturing its backing-file path
    pub fn new(config: AppConfig, config_file: PathBuf) -> Self {
        Self {
            config,
            config_file,
            debug: false,
            store: None,
            cache: None,
            index: None,
        }
    }

    /// Set the debug flag
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Wire the store handle
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Wire the cache service
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Wire the optional full-text index
    pub fn index(mut self, index: Option<Arc<SearchIndex>>) -> Self {
        self.index = index;
        self
    }

    /// Freeze into the shared, read-only context
    pub fn build(self) -> Result<Arc<AppContext>> {
        let store = self
            .store
            .ok_or_else(|| Error::Config("context built without a store".to_string()))?;
        let cache = self
            .cache
            .ok_or_else(|| Error::Config("context built without a cache".to_string()))?;

        Ok(Arc::new(AppContext {
            config: self.config,
            config_file: self.config_file,
            debug: self.debug,
            store,
            cache,
            index: self.index,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::schema::ensure_schema;
    use crate::cache::{MemoryCache, StoreCacheBridge};
    use crate::store::SqliteStore;

    fn seeded_context() -> Arc<AppContext> {
        let store = Arc::new(SqliteStore::open_in_memory("").unwrap());
        ensure_schema(store.as_ref()).unwrap();

        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        store.attach_query_cache(Arc::new(StoreCacheBridge::new(cache.clone())));

        ContextBuilder::new(AppConfig::default(), PathBuf::from("quillbase.toml"))
            .store(store)
            .cache(cache)
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_field_returns_seeded_title() {
        let ctx = seeded_context();
        assert_eq!(
            ctx.resolve_str("basic.web_site_title", ""),
            "A Quillbase Site"
        );
    }

    #[test]
    fn test_resolve_namespace_returns_object() {
        let ctx = seeded_context();
        let basic = ctx.resolve("basic", "");

        assert!(basic.is_object());
        assert_eq!(basic["web_site_title"], "A Quillbase Site");
    }

    #[test]
    fn test_resolve_missing_falls_back() {
        let ctx = seeded_context();

        assert_eq!(ctx.resolve_str("missing.key", "fallback"), "fallback");
        assert_eq!(ctx.resolve_str("basic.no_such_field", "fallback"), "fallback");
        assert_eq!(ctx.resolve_str("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_resolve_ignores_segments_past_the_second() {
        let ctx = seeded_context();
        assert_eq!(
            ctx.resolve_str("basic.web_site_title.extra.deeper", ""),
            "A Quillbase Site"
        );
    }

    #[test]
    fn test_resolve_serves_cached_snapshot() {
        let ctx = seeded_context();
        assert_eq!(ctx.resolve_str("basic.web_site_title", ""), "A Quillbase Site");

        // direct table write is invisible until the snapshot expires
        ctx.store()
            .exec(&Query::raw(
                r#"update config set value = '{"web_site_title":"Renamed"}' where key = 'basic'"#,
            ))
            .unwrap();
        assert_eq!(ctx.resolve_str("basic.web_site_title", ""), "A Quillbase Site");
    }

    #[test]
    fn test_resolve_soft_fails_without_config_table() {
        let store = Arc::new(SqliteStore::open_in_memory("").unwrap());
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());

        let ctx = ContextBuilder::new(AppConfig::default(), PathBuf::from("quillbase.toml"))
            .store(store)
            .cache(cache)
            .build()
            .unwrap();

        assert_eq!(ctx.resolve_str("basic.web_site_title", "fallback"), "fallback");
    }

    #[test]
    fn test_build_requires_store_and_cache() {
        let builder = ContextBuilder::new(AppConfig::default(), PathBuf::from("quillbase.toml"));
        assert!(builder.build().is_err());
    }
}
