//! Schema bootstrap - first-run DDL and seed data
//!
//! Freshness is decided by probing the `article` marker table: a failed read
//! means the store has never been bootstrapped. This is a heuristic, not a
//! version check - a store whose marker table was dropped but whose other
//! tables survive still counts as fresh.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::Result;
use crate::store::template::{StatementTemplate, apply_prefix, split_statements};
use crate::store::{Query, Store};

/// Trivial read against the marker table; failure is the fresh-store signal
const FRESHNESS_PROBE: &str = "select * from __PREFIX__article";

/// Dialect-neutral bootstrap script: four tables plus five seed rows (three
/// configuration namespaces, one default catalog, one administrator).
/// Statement text must stay free of literal semicolons.
pub const BOOTSTRAP_SCRIPT: StatementTemplate = StatementTemplate::new(
    r#"
create table __PREFIX__article(
  article_id integer PRIMARY KEY AUTOINCREMENT,
  title text,
  summary text,
  poster_url text,
  content text,
  is_draft int default 0,
  catalog_id int,
  create_time int,
  update_time int
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci;
create table __PREFIX__catalog(
  catalog_id integer PRIMARY KEY AUTOINCREMENT,
  name text,
  sequence int default 0,
  is_nav int default 0
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci;
create table __PREFIX__user(
  user_id integer PRIMARY KEY AUTOINCREMENT,
  username text,
  nickname text,
  password text,
  is_delete int default 0,
  update_time int,
  create_time int
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci;
create table __PREFIX__config(
  config_id integer PRIMARY KEY AUTOINCREMENT,
  key text,
  value text
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci;
insert into __PREFIX__config (config_id, key, value) values (1,'basic','{"key":"basic","web_site_title":"A Quillbase Site","web_site_description":"Quillbase is a self-hosted publishing backend for writers who keep their own words.","web_site_keywords":"quillbase,publishing,writing","web_site_logo":"/static/style/logo.png","web_site_icon":"/static/style/favicon.ico","web_site_copyright":"","web_site_status":"on"}');
insert into __PREFIX__config (config_id, key, value) values (2,'system','{}');
insert into __PREFIX__config (config_id, key, value) values (3,'upload','{"key":"upload","upload_file_storage":"local","upload_image_compress":"5","image_resize_width":"1024","image_mask_text":""}');
insert into __PREFIX__catalog (catalog_id, name, sequence) values (0,'Default',0);
insert into __PREFIX__user (user_id, username, nickname, password, is_delete, update_time, create_time) values (1,'root','root','2df594b9710111099edbdb7edaa43301',0,{now},{now});
"#,
);

/// Bring a store to the bootstrapped schema if it has none yet.
///
/// Returns `true` when the store was fresh and the bootstrap script ran.
/// Statements execute independently with no rollback; the first failure
/// aborts and surfaces.
pub fn ensure_schema(store: &dyn Store) -> Result<bool> {
    let probe = apply_prefix(store.dialect(), FRESHNESS_PROBE);
    if store.query(&Query::raw(probe)).is_ok() {
        return Ok(false);
    }

    tracing::info!("store is fresh, creating schema and seed rows");
    let script = BOOTSTRAP_SCRIPT.render(store.dialect(), unix_now());
    for stmt in split_statements(&script) {
        store.exec(&Query::raw(stmt))?;
    }

    Ok(true)
}

/// Current unix timestamp in seconds
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn table_names(store: &dyn Store) -> Vec<String> {
        store
            .query(&Query::raw(
                "select name from sqlite_master where type='table' and name not like 'sqlite_%' order by name",
            ))
            .unwrap()
            .into_iter()
            .map(|mut row| row.remove("name").unwrap())
            .collect()
    }

    fn count(store: &dyn Store, table: &str) -> usize {
        store
            .query(&Query::raw(format!("select * from {table}")))
            .unwrap()
            .len()
    }

    #[test]
    fn test_fresh_store_bootstraps() {
        let store = SqliteStore::open_in_memory("").unwrap();

        assert!(ensure_schema(&store).unwrap());
        assert_eq!(table_names(&store), vec!["article", "catalog", "config", "user"]);

        // exactly five seed rows: three config namespaces, one catalog, one user
        assert_eq!(count(&store, "config"), 3);
        assert_eq!(count(&store, "catalog"), 1);
        assert_eq!(count(&store, "user"), 1);
    }

    #[test]
    fn test_second_run_reports_not_fresh_and_writes_nothing() {
        let store = SqliteStore::open_in_memory("").unwrap();
        assert!(ensure_schema(&store).unwrap());

        assert!(!ensure_schema(&store).unwrap());
        assert_eq!(count(&store, "config"), 3);
        assert_eq!(count(&store, "catalog"), 1);
        assert_eq!(count(&store, "user"), 1);
    }

    #[test]
    fn test_prefixed_bootstrap_creates_prefixed_tables() {
        let store = SqliteStore::open_in_memory("blog_").unwrap();

        assert!(ensure_schema(&store).unwrap());
        assert_eq!(
            table_names(&store),
            vec!["blog_article", "blog_catalog", "blog_config", "blog_user"]
        );
    }

    #[test]
    fn test_seed_rows_have_expected_shape() {
        let store = SqliteStore::open_in_memory("").unwrap();
        ensure_schema(&store).unwrap();

        let rows = store
            .query(&Query::raw("select key, value from config order by config_id"))
            .unwrap();
        let namespaces: Vec<&str> = rows.iter().map(|r| r["key"].as_str()).collect();
        assert_eq!(namespaces, vec!["basic", "system", "upload"]);

        // every config payload is a JSON object
        for row in &rows {
            let decoded: serde_json::Value = serde_json::from_str(&row["value"]).unwrap();
            assert!(decoded.is_object());
        }

        let users = store
            .query(&Query::raw("select username, create_time from user"))
            .unwrap();
        assert_eq!(users[0]["username"], "root");
        assert!(users[0]["create_time"].parse::<i64>().unwrap() > 0);
    }
}
