use crate::storage::KeyValueStore;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::fs;
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 2;
pub const DATA_DIR_NAME: &str = ".contractdesk";

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "kv_store", "updated_at INTEGER NOT NULL DEFAULT 0")?;
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_kv_store_updated_at ON kv_store(updated_at);")
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn get_db_connection(workspace_path: &str) -> Result<Connection> {
    let db_path = Path::new(workspace_path).join(DATA_DIR_NAME).join("state.db");
    let conn = Connection::open(db_path)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// SQLite-backed [`KeyValueStore`], one row per key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, String> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| format!("DB read error: {e}"))
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), String> {
        let now = chrono::Utc::now().timestamp();
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map(|_| ())
            .map_err(|e| format!("DB write error: {e}"))
    }

    fn remove(&self, key: &str) -> std::result::Result<(), String> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(|e| format!("DB delete error: {e}"))
    }
}

/// Open (creating if needed) the store under `<workspace>/.contractdesk/`.
pub fn open_store(workspace_path: &str) -> std::result::Result<SqliteStore, String> {
    let workspace = Path::new(workspace_path);
    if !workspace.exists() {
        return Err("PATH_NOT_FOUND: Directory does not exist".to_string());
    }

    fs::create_dir_all(workspace.join(DATA_DIR_NAME))
        .map_err(|e| format!("INIT_FAILED: Could not create {DATA_DIR_NAME} directory: {e}"))?;
    let conn = get_db_connection(workspace_path).map_err(|e| format!("DB error: {e}"))?;
    Ok(SqliteStore::new(conn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_initializes_with_expected_version() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("schema init");
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn upgrades_version_one_databases_in_place() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        apply_migration_1(&conn).expect("v1 schema");
        conn.pragma_update(None, "user_version", 1).expect("set version");
        conn.execute("INSERT INTO kv_store (key, value) VALUES ('app-theme', '\"dark\"')", [])
            .expect("seed v1 row");

        initialize_schema(&conn).expect("migrate");
        let store = SqliteStore::new(conn);
        assert_eq!(store.get("app-theme").expect("get"), Some("\"dark\"".to_string()));
    }

    #[test]
    fn kv_round_trip_overwrites_and_removes() {
        let store = SqliteStore::open_in_memory().expect("store");
        store.set("api-contracts", "[]").expect("set");
        store.set("api-contracts", "[1]").expect("overwrite");
        assert_eq!(store.get("api-contracts").expect("get"), Some("[1]".to_string()));
        assert_eq!(store.keys().expect("keys"), vec!["api-contracts".to_string()]);

        store.remove("api-contracts").expect("remove");
        assert_eq!(store.get("api-contracts").expect("get"), None);
    }
}
