//! The durable key-value contract and the in-memory implementation.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Capacity of the change-notification channel. Slow subscribers lag and
/// recompute from a fresh read, so losing intermediate keys is harmless.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A typed value in the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self, key: &str) -> Result<i64, StoreError> {
        match self {
            Value::Int(v) => Ok(*v),
            _ => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "integer",
            }),
        }
    }

    pub fn as_bool(&self, key: &str) -> Result<bool, StoreError> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "boolean",
            }),
        }
    }

    pub fn as_str(&self, key: &str) -> Result<&str, StoreError> {
        match self {
            Value::Text(v) => Ok(v),
            _ => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "text",
            }),
        }
    }
}

/// Abstract durable key-value store.
///
/// Individual operations are atomic; writers that need multi-key invariants
/// (read-modify-write of the fold counters) serialize above this layer.
/// Every completed `set`/`remove` pushes the changed key to subscribers.
pub trait DurableStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All keys starting with `prefix`, in lexicographic order.
    fn keys_with_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Full snapshot of the store contents.
    fn snapshot(&self) -> impl Future<Output = Result<BTreeMap<String, Value>, StoreError>> + Send;

    /// Subscribe to the names of keys as they change.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// In-memory store for tests and the simulation CLI path.
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, Value>>,
    changes: broadcast::Sender<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.write()?.insert(key.to_string(), value);
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = self.write()?.remove(key).is_some();
        if removed {
            let _ = self.changes.send(key.to_string());
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        Ok(self.read()?.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_set_remove_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", Value::Int(3)).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(Value::Int(3)));

        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prefix_scan_is_bounded() {
        let store = MemoryStore::new();
        store.set("daily_count_2026-01-01", Value::Int(1)).await.unwrap();
        store.set("daily_count_2026-01-02", Value::Int(2)).await.unwrap();
        store.set("daily_limit_key", Value::Int(50)).await.unwrap();

        let keys = store.keys_with_prefix("daily_count_").await.unwrap();
        assert_eq!(
            keys,
            vec!["daily_count_2026-01-01", "daily_count_2026-01-02"]
        );
    }

    #[tokio::test]
    async fn writes_notify_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.set("counter_key", Value::Int(1)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "counter_key");
    }

    #[tokio::test]
    async fn type_mismatch_is_an_error() {
        let store = MemoryStore::new();
        store.set("k", Value::Text("x".into())).await.unwrap();
        let v = store.get("k").await.unwrap().unwrap();
        assert!(matches!(
            v.as_i64("k"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }
}
