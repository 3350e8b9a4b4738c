//! Bootstrap - one-shot startup sequencing
//!
//! Runs single-threaded, strictly in order, before any request-serving
//! concurrency begins:
//!
//! 1. select and open the store dialect
//! 2. ensure the schema (fresh store) or apply migrations (existing store)
//! 3. construct the cache service and bridge it into the store's query cache
//! 4. open the full-text index when enabled
//! 5. build the immutable service context and hand it to the caller
//!
//! Any phase failure aborts startup and surfaces wrapped with the phase
//! name. Nothing here retries.

pub mod migrate;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{Cache, MemoryCache, StoreCacheBridge};
use crate::config::{AppConfig, DatabaseConfig, ensure_db_dir};
use crate::context::{AppContext, ContextBuilder};
use crate::index::SearchIndex;
use crate::store::{SqliteStore, Store};
use crate::{Error, Result};

pub use migrate::{Migration, MigrationRegistry};
pub use schema::ensure_schema;

/// Bring storage and services to a ready state and build the context.
///
/// `config_file` is the backing path the configuration was loaded from; the
/// context captures it for diagnostics.
pub fn initialize(config: AppConfig, config_file: PathBuf) -> Result<Arc<AppContext>> {
    let debug = config.server.debug;
    if debug {
        tracing::info!("quillbase running in debug mode");
    }

    let store = open_store(&config.database).map_err(Error::in_phase("store open"))?;
    tracing::info!("store opened ({} dialect)", store.dialect().name());

    let fresh = schema::ensure_schema(store.as_ref()).map_err(Error::in_phase("schema bootstrap"))?;
    if !fresh {
        migrate::MigrationRegistry::builtin()
            .apply(store.as_ref())
            .map_err(Error::in_phase("migration"))?;
    }

    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    store.attach_query_cache(Arc::new(StoreCacheBridge::new(cache.clone())));

    let index = if config.search.enable_fulltext_index {
        let index = SearchIndex::open(Path::new(&config.search.index_path))
            .map_err(Error::in_phase("index open"))?;
        Some(Arc::new(index))
    } else {
        None
    };

    ContextBuilder::new(config, config_file)
        .debug(debug)
        .store(store)
        .cache(cache)
        .index(index)
        .build()
}

/// Open the store named by `[database].driver`
fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    match config.driver.as_str() {
        "sqlite3" => {
            let path = Path::new(&config.path);
            ensure_db_dir(path)?;
            Ok(Arc::new(SqliteStore::open(path, &config.table_prefix)?))
        }
        "mysql" => open_mysql(config),
        other => Err(Error::Config(format!("unsupported database driver: {other}"))),
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    Ok(Arc::new(crate::store::MysqlStore::connect(
        &config.url,
        &config.table_prefix,
    )?))
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    Err(Error::Config(
        "this build does not include the mysql backend (enable the `mysql` cargo feature)".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &Path, fulltext: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.path = dir.join("data/app.db").to_string_lossy().into_owned();
        config.search.enable_fulltext_index = fulltext;
        config.search.index_path = dir.join("data/search.db").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_initialize_fresh_then_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), false);

        let ctx = initialize(config.clone(), PathBuf::from("quillbase.toml")).unwrap();
        assert_eq!(
            ctx.resolve_str("basic.web_site_title", ""),
            "A Quillbase Site"
        );
        assert!(ctx.index().is_none());
        drop(ctx);

        // second start against the same store: not fresh, still healthy
        let ctx = initialize(config, PathBuf::from("quillbase.toml")).unwrap();
        assert_eq!(
            ctx.resolve_str("basic.web_site_title", ""),
            "A Quillbase Site"
        );
    }

    #[test]
    fn test_initialize_with_fulltext_index() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = initialize(test_config(dir.path(), true), PathBuf::from("quillbase.toml")).unwrap();

        assert!(ctx.index().is_some());
    }

    #[test]
    fn test_unknown_driver_fails_in_store_phase() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path(), false);
        config.database.driver = "oracle".into();

        let err = initialize(config, PathBuf::from("quillbase.toml")).unwrap_err();
        assert!(matches!(err, Error::Bootstrap { phase: "store open", .. }));
    }
}
