//! SQLite-backed durable store.
//!
//! One `kv` table; values are stored as JSON so the same `Value` enum flows
//! through both store implementations. Queries are short single-row lookups,
//! executed under an async mutex on the connection.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use tokio::sync::{broadcast, Mutex};

use super::kv::{DurableStore, Value};
use crate::error::StoreError;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<String>,
}

impl SqliteStore {
    /// Open the store at `<data_dir>/foldtrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = super::data_dir()
            .map_err(|e| StoreError::Unavailable(format!("data dir: {e}")))?
            .join("foldtrack.db");
        let conn = Connection::open(&path)
            .map_err(|source| StoreError::OpenFailed { path, source })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        let (changes, _) = broadcast::channel(64);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }
}

fn decode(key: &str, raw: &str) -> Result<Value, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::MalformedValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode(key: &str, value: &Value) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::MalformedValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl DurableStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => {
                let raw: String = row.get(0)?;
                Ok(Some(decode(key, &raw)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let raw = encode(key, &value)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, raw],
        )?;
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        if removed > 0 {
            let _ = self.changes.send(key.to_string());
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT key FROM kv WHERE key LIKE ?1 || '%' ORDER BY key")?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut map = BTreeMap::new();
        for (key, raw) in rows {
            let value = decode(&key, &raw)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_encode_decode() {
        let store = SqliteStore::open_memory().unwrap();
        store.set("counter_key", Value::Int(12)).await.unwrap();
        store
            .set("last_updated_date_key", Value::Text("2026-08-23".into()))
            .await
            .unwrap();
        store.set("first_launch_key", Value::Bool(false)).await.unwrap();

        assert_eq!(
            store.get("counter_key").await.unwrap(),
            Some(Value::Int(12))
        );
        assert_eq!(
            store.get("last_updated_date_key").await.unwrap(),
            Some(Value::Text("2026-08-23".into()))
        );
        assert_eq!(
            store.get("first_launch_key").await.unwrap(),
            Some(Value::Bool(false))
        );
    }

    #[tokio::test]
    async fn prefix_scan_orders_keys() {
        let store = SqliteStore::open_memory().unwrap();
        store.set("daily_count_2026-01-02", Value::Int(2)).await.unwrap();
        store.set("daily_count_2026-01-01", Value::Int(1)).await.unwrap();
        store.set("counter_key", Value::Int(9)).await.unwrap();

        let keys = store.keys_with_prefix("daily_count_").await.unwrap();
        assert_eq!(
            keys,
            vec!["daily_count_2026-01-01", "daily_count_2026-01-02"]
        );
    }
}
