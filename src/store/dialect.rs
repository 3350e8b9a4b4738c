//! SQL dialect dispatch
//!
//! Bootstrap and migration scripts are authored once in a dialect-neutral
//! form; each dialect rewrites that text into what its engine accepts. The
//! bootstrapper and migration runner depend only on the [`Dialect`] trait,
//! never on a concrete store type.

/// Storage-engine/charset clause authored into the neutral DDL. MySQL keeps
/// it, SQLite strips it.
pub const ENGINE_CLAUSE: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci";

/// A concrete storage backend's SQL syntax rules
pub trait Dialect: Send + Sync {
    /// Dialect name, as it appears in configuration (`sqlite3`, `mysql`)
    fn name(&self) -> &'static str;

    /// The configured table-name prefix ("" when unset)
    fn table_prefix(&self) -> &str;

    /// Rewrite dialect-neutral DDL/DML text into this dialect's syntax
    fn rewrite_ddl(&self, sql: &str) -> String;
}

/// Embedded file-based dialect (SQLite)
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    prefix: String,
}

impl SqliteDialect {
    /// Create a SQLite dialect with the given table prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    /// SQLite accepts the neutral auto-increment syntax as authored; only the
    /// storage-engine/charset clause must go.
    fn rewrite_ddl(&self, sql: &str) -> String {
        sql.replace(ENGINE_CLAUSE, "")
    }
}

/// Networked relational dialect (MySQL)
#[derive(Debug, Clone)]
pub struct MysqlDialect {
    prefix: String,
}

impl MysqlDialect {
    /// Create a MySQL dialect with the given table prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    /// MySQL wants `int ... AUTO_INCREMENT` primary keys, and `key` is a
    /// reserved word that must be backtick-quoted where the config table DDL
    /// and its seed inserts use it as a bare identifier.
    fn rewrite_ddl(&self, sql: &str) -> String {
        sql.replace("integer", "int")
            .replace("AUTOINCREMENT", "AUTO_INCREMENT")
            .replacen("key text", "`key` text", 1)
            .replace("key, value", "`key`, value")
    }
}
