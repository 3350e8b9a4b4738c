//! Full-text search index
//!
//! FTS5 virtual table in its own database file, separate from the main
//! store so it works the same under either storage dialect. Opened only
//! when `search.enable_fulltext_index` is set; an open failure is fatal to
//! startup since the feature was explicitly requested.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, params};

use crate::config::ensure_db_dir;
use crate::{Error, Result};

/// Full-text index over article titles and bodies
pub struct SearchIndex {
    conn: Mutex<Connection>,
}

impl SearchIndex {
    /// Open or create the index file (parent directories included)
    pub fn open(path: &Path) -> Result<Self> {
        ensure_db_dir(path)?;
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory index (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE VIRTUAL TABLE IF NOT EXISTS article_index USING fts5(title, content)",
        )
        .map_err(|e| Error::Index(format!("creating fts5 table: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Index (or re-index) one article
    pub fn add_document(&self, article_id: i64, title: &str, content: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO article_index(rowid, title, content) VALUES (?1, ?2, ?3)",
            params![article_id, title, content],
        )?;
        Ok(())
    }

    /// Drop one article from the index
    pub fn remove_document(&self, article_id: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM article_index WHERE rowid = ?1", [article_id])?;
        Ok(())
    }

    /// Match articles against an FTS5 query, best first
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT rowid FROM article_index WHERE article_index MATCH ?1 ORDER BY rank LIMIT ?2",
        )?;

        let ids = stmt
            .query_map(params![query, limit as i64], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_search() {
        let index = SearchIndex::open_in_memory().unwrap();
        index.add_document(1, "Hello world", "first post about storage engines").unwrap();
        index.add_document(2, "Second", "nothing relevant here").unwrap();

        let hits = index.search("storage", 10).unwrap();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_reindex_replaces_document() {
        let index = SearchIndex::open_in_memory().unwrap();
        index.add_document(1, "draft", "old words").unwrap();
        index.add_document(1, "published", "new words").unwrap();

        assert!(index.search("old", 10).unwrap().is_empty());
        assert_eq!(index.search("new", 10).unwrap(), vec![1]);
    }

    #[test]
    fn test_remove_document() {
        let index = SearchIndex::open_in_memory().unwrap();
        index.add_document(1, "gone soon", "ephemeral").unwrap();
        index.remove_document(1).unwrap();

        assert!(index.search("ephemeral", 10).unwrap().is_empty());
    }

    #[test]
    fn test_index_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search/index.db");

        {
            let index = SearchIndex::open(&path).unwrap();
            index.add_document(7, "durable", "survives reopen").unwrap();
        }

        let index = SearchIndex::open(&path).unwrap();
        assert_eq!(index.search("survives", 10).unwrap(), vec![7]);
    }
}
