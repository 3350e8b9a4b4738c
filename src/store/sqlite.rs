//! SQLite storage implementation

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use super::dialect::{Dialect, SqliteDialect};
use super::{Query, QueryCache, Row, Store};
use crate::Result;

/// Embedded file-based store (SQLite dialect)
///
/// The connection sits behind a mutex so one store handle can be shared by
/// concurrent readers after bootstrap.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    dialect: SqliteDialect,
    query_cache: RwLock<Option<Arc<dyn QueryCache>>>,
}

impl SqliteStore {
    /// Open a database file (creates if it doesn't exist)
    pub fn open(path: &Path, table_prefix: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, table_prefix))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(table_prefix: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, table_prefix))
    }

    fn from_connection(conn: Connection, table_prefix: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            dialect: SqliteDialect::new(table_prefix),
            query_cache: RwLock::new(None),
        }
    }

    fn query_direct(&self, sql: &str) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                map.insert(name.clone(), value_to_string(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }
}

/// String-coerce a SQLite value the way result rows are exposed
fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

impl Store for SqliteStore {
    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn query(&self, query: &Query) -> Result<Vec<Row>> {
        if let Some((name, ttl)) = query.cache() {
            let cache = self.query_cache.read().clone();
            if let Some(cache) = cache {
                if let Ok(Some(bytes)) = cache.get(name) {
                    if let Ok(rows) = serde_json::from_slice::<Vec<Row>>(&bytes) {
                        return Ok(rows);
                    }
                }

                let rows = self.query_direct(query.sql())?;
                match serde_json::to_vec(&rows) {
                    Ok(bytes) => {
                        if let Err(e) = cache.set(name, &bytes, ttl) {
                            tracing::debug!("query cache set failed for {}: {}", name, e);
                        }
                    }
                    Err(e) => tracing::debug!("query cache encode failed for {}: {}", name, e),
                }
                return Ok(rows);
            }
        }

        self.query_direct(query.sql())
    }

    fn exec(&self, query: &Query) -> Result<usize> {
        let conn = self.conn.lock();
        let changed = conn.execute(query.sql(), [])?;
        Ok(changed)
    }

    fn attach_query_cache(&self, cache: Arc<dyn QueryCache>) {
        *self.query_cache.write() = Some(cache);
    }
}
