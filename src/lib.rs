//! # Quillbase - Self-hosted Publishing Backend
//!
//! Storage bootstrap and service wiring for a content-management backend.
//!
//! Quillbase provides:
//! - Dialect-abstracted SQL storage (embedded SQLite, networked MySQL)
//! - Idempotent schema bootstrap and probe-guarded point migrations
//! - A process-wide service context built once at startup
//! - Layered configuration resolution over JSON-encoded settings rows
//! - Optional FTS5-backed full-text search index

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod context;
pub mod index;
pub mod server;
pub mod store;

// Re-exports for convenient access
pub use context::{AppContext, ContextBuilder};
pub use store::{Query, Row, SqliteStore, Store};

/// Result type alias for Quillbase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Quillbase operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Bootstrap failed during {phase}: {source}")]
    Bootstrap {
        phase: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the name of the bootstrap phase it surfaced in
    pub fn in_phase(phase: &'static str) -> impl FnOnce(Error) -> Error {
        move |source| Error::Bootstrap {
            phase,
            source: Box::new(source),
        }
    }
}
