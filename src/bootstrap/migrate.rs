//! Migration runner - probe-guarded point patches
//!
//! Not a schema-diffing framework: each migration is a hand-authored patch
//! guarded by a probe statement that tests for the schema feature the patch
//! introduces. Running the registry on every startup is safe - once a probe
//! reports "already patched", its patch is skipped.

use crate::Result;
use crate::store::template::{apply_prefix, split_statements};
use crate::store::{Query, Store};

/// One probe-guarded patch
///
/// The probe is a read-only statement. The patch runs exactly when the
/// probe's outcome (errored or not) equals `expect_error` - e.g. a probe
/// selecting a column with `expect_error: true` applies the patch that adds
/// the column only while the column is missing.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Read-only existence/shape check, placeholder tokens allowed
    pub probe: &'static str,
    /// Probe outcome that means the patch is still needed
    pub expect_error: bool,
    /// Patch statements, split and executed like the bootstrap script
    pub patch: &'static str,
}

/// Ordered, appendable list of migrations
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    /// The registry shipped with this deployment. Currently empty; append
    /// new entries here, never reorder or remove applied ones.
    ///
    /// Example entry:
    /// `probe: "select is_draft from __PREFIX__article limit 1"`,
    /// `expect_error: true`,
    /// `patch: "alter table __PREFIX__article add column is_draft int default 0"`.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Append a migration to the end of the list
    pub fn register(&mut self, migration: Migration) {
        self.migrations.push(migration);
    }

    /// Number of registered migrations
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the registry has no migrations
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Run every still-unapplied migration in order.
    ///
    /// The first patch-statement error halts the run and surfaces; probe
    /// errors are outcome signals, never faults.
    pub fn apply(&self, store: &dyn Store) -> Result<()> {
        for migration in &self.migrations {
            let probe = apply_prefix(store.dialect(), migration.probe);
            let probe_errored = store.query(&Query::raw(probe)).is_err();
            if probe_errored != migration.expect_error {
                continue;
            }

            tracing::info!("applying migration guarded by probe: {}", migration.probe);
            let patch = apply_prefix(store.dialect(), migration.patch);
            for stmt in split_statements(&patch) {
                store.exec(&Query::raw(stmt))?;
            }
        }

        Ok(())
    }
}
