//! Statement templates and placeholder substitution
//!
//! Bootstrap and migration SQL is written once against placeholder tokens:
//! `__PREFIX__` for the configured table-name prefix and `{now}` for the
//! current unix timestamp. Substitution is centralized here so every call
//! site rewrites identically.

use super::dialect::Dialect;

/// Placeholder for the configured table-name prefix
pub const PREFIX_TOKEN: &str = "__PREFIX__";

/// Placeholder for the current unix timestamp
pub const NOW_TOKEN: &str = "{now}";

/// Substitute the dialect's table prefix for every placeholder occurrence.
///
/// An empty prefix deletes the token; a non-empty prefix replaces it with the
/// literal configured value. The prefix is a trusted deployment setting and
/// is not escaped or validated. Pure: identical inputs give byte-identical
/// output.
pub fn apply_prefix(dialect: &dyn Dialect, text: &str) -> String {
    text.replace(PREFIX_TOKEN, dialect.table_prefix())
}

/// Split a multi-statement script into individual statements.
///
/// Trims outer whitespace and semicolons, splits on `;`, and drops empty
/// fragments. Statement text must not embed literal semicolons.
pub fn split_statements(script: &str) -> Vec<&str> {
    script
        .trim_matches(|c: char| c.is_whitespace() || c == ';')
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// A dialect-neutral SQL script with an explicit substitution step
#[derive(Debug, Clone, Copy)]
pub struct StatementTemplate {
    text: &'static str,
}

impl StatementTemplate {
    /// Wrap dialect-neutral script text
    pub const fn new(text: &'static str) -> Self {
        Self { text }
    }

    /// The neutral text, before any substitution
    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Render for a dialect: rewrite dialect-specific fragments, substitute
    /// the table prefix, then stamp `{now}` with `now`.
    pub fn render(&self, dialect: &dyn Dialect, now: i64) -> String {
        let sql = dialect.rewrite_ddl(self.text);
        let sql = apply_prefix(dialect, &sql);
        sql.replace(NOW_TOKEN, &now.to_string())
    }
}
