//! Configuration loading - toml file plus defaults
//!
//! This is the process-level configuration (which store to open, where to
//! listen). Site-level settings live in the store's `config` table and are
//! read through [`crate::context::AppContext::resolve`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite3` or `mysql`
    pub driver: String,
    /// Database file path (sqlite3)
    pub path: String,
    /// Connection URL (mysql)
    pub url: String,
    /// Prefix applied to every table name; trusted, not validated
    pub table_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite3".to_string(),
            path: "data/quillbase.db".to_string(),
            url: String::new(),
            table_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enable_fulltext_index: bool,
    pub index_path: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable_fulltext_index: false,
            index_path: "data/search.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("quillbase.toml")
}

/// Load configuration, falling back to defaults when the file is absent.
/// Returns the config together with the path it was (or would have been)
/// loaded from.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(AppConfig, PathBuf)> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok((AppConfig::default(), path));
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&contents)?;
    Ok((config, path))
}

pub fn write_config(path: &Path, config: &AppConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.database.driver, "sqlite3");
        assert_eq!(config.database.table_prefix, "");
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert!(!config.search.enable_fulltext_index);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            driver = "mysql"
            url = "mysql://root@localhost:3306/quillbase"
            table_prefix = "qb_"

            [search]
            enable_fulltext_index = true
            "#,
        )
        .unwrap();

        assert_eq!(config.database.driver, "mysql");
        assert_eq!(config.database.table_prefix, "qb_");
        assert!(config.search.enable_fulltext_index);
        // untouched sections keep their defaults
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.search.index_path, "data/search.db");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quillbase.toml");

        let (config, used) = load_config(Some(&path)).unwrap();
        assert_eq!(config.database.driver, "sqlite3");
        assert_eq!(used, path);
    }

    #[test]
    fn test_write_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quillbase.toml");

        let mut config = AppConfig::default();
        config.server.debug = true;
        write_config(&path, &config, false).unwrap();

        assert!(write_config(&path, &config, false).is_err());

        let (loaded, _) = load_config(Some(&path)).unwrap();
        assert!(loaded.server.debug);
    }

    #[test]
    fn test_ensure_db_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/data/app.db");

        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }
}
