//! Key-value and conversation memory shared by agent runs.
//!
//! Entries may carry a time to live; an expired entry is dropped the next
//! time anything looks at it. When the store is full, storing a new key
//! evicts the oldest entry.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<f64>,
    #[serde(skip)]
    stored: Instant,
    #[serde(skip)]
    ttl: Option<Duration>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.stored) > ttl)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, MemoryEntry>,
    conversation: Vec<ChatMessage>,
}

impl Inner {
    fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .values()
            .min_by_key(|entry| entry.stored)
            .map(|entry| entry.key.clone());
        if let Some(key) = oldest {
            debug!("Memory full, evicting '{}'", key);
            self.entries.remove(&key);
        }
    }
}

/// Thread-safe agent memory.
pub struct AgentMemory {
    capacity: usize,
    default_ttl: Option<Duration>,
    inner: Mutex<Inner>,
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

impl AgentMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            default_ttl: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Applied to entries stored without their own TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.set_with(key, value, Vec::new(), None);
    }

    pub fn set_with(
        &self,
        key: impl Into<String>,
        value: Value,
        tags: Vec<String>,
        ttl: Option<Duration>,
    ) {
        let key = key.into();
        let ttl = ttl.or(self.default_ttl);
        let now = Instant::now();
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            inner.purge_expired(now);
            if inner.entries.len() >= self.capacity {
                inner.evict_oldest();
            }
        }
        inner.entries.insert(
            key.clone(),
            MemoryEntry {
                key,
                value,
                stored_at: Utc::now(),
                tags,
                ttl_secs: ttl.map(|t| t.as_secs_f64()),
                stored: now,
                ttl,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired = inner.entries.get(key)?.is_expired(now);
        if expired {
            inner.entries.remove(key);
            return None;
        }
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Returns whether the key existed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Live entries carrying any of `tags`, sorted by key.
    pub fn search_by_tags(&self, tags: &[&str]) -> Vec<MemoryEntry> {
        let now = Instant::now();
        let inner = self.inner.lock();
        let mut found: Vec<MemoryEntry> = inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .filter(|entry| entry.tags.iter().any(|t| tags.contains(&t.as_str())))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
    }

    pub fn keys(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        inner.purge_expired(Instant::now());
        let mut keys: Vec<String> = inner.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.purge_expired(Instant::now());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Live values by key.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        let mut inner = self.inner.lock();
        inner.purge_expired(Instant::now());
        inner
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    pub fn add_message(&self, role: impl Into<String>, content: impl Into<String>) {
        self.inner.lock().conversation.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
    }

    /// The whole conversation, or its last `last_n` messages.
    pub fn history(&self, last_n: Option<usize>) -> Vec<ChatMessage> {
        let inner = self.inner.lock();
        let skip = match last_n {
            Some(n) if n > 0 => inner.conversation.len().saturating_sub(n),
            _ => 0,
        };
        inner.conversation[skip..].to_vec()
    }

    pub fn clear_history(&self) {
        self.inner.lock().conversation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_delete() {
        let memory = AgentMemory::default();
        memory.set("a", json!(1));
        assert_eq!(memory.get("a"), Some(json!(1)));
        assert_eq!(memory.get("missing"), None);

        memory.set("a", json!({"x": 2}));
        assert_eq!(memory.get("a"), Some(json!({"x": 2})));
        assert_eq!(memory.len(), 1);

        assert!(memory.delete("a"));
        assert!(!memory.delete("a"));
        assert!(memory.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_disappear() {
        let memory = AgentMemory::default();
        memory.set_with("short", json!("s"), Vec::new(), Some(Duration::from_secs(5)));
        memory.set("forever", json!("f"));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(memory.get("short"), Some(json!("s")));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(memory.get("short"), None);
        assert_eq!(memory.keys(), vec!["forever".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies() {
        let memory = AgentMemory::new(10).with_default_ttl(Duration::from_secs(1));
        memory.set("k", json!(true));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(memory.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_store_evicts_oldest() {
        let memory = AgentMemory::new(2);
        memory.set("first", json!(1));
        tokio::time::advance(Duration::from_millis(10)).await;
        memory.set("second", json!(2));
        tokio::time::advance(Duration::from_millis(10)).await;

        // Overwriting a key never evicts.
        memory.set("second", json!(22));
        assert_eq!(memory.len(), 2);

        memory.set("third", json!(3));
        assert_eq!(memory.keys(), vec!["second".to_string(), "third".to_string()]);
        assert_eq!(memory.get("second"), Some(json!(22)));
    }

    #[test]
    fn test_search_by_tags() {
        let memory = AgentMemory::default();
        memory.set_with("a", json!(1), vec!["fact".to_string()], None);
        memory.set_with("b", json!(2), vec!["pref".to_string(), "fact".to_string()], None);
        memory.set("c", json!(3));

        let keys: Vec<String> = memory
            .search_by_tags(&["fact"])
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(memory.search_by_tags(&["other"]).is_empty());
    }

    #[test]
    fn test_snapshot_and_clear() {
        let memory = AgentMemory::default();
        memory.set("x", json!("y"));
        let snapshot = memory.snapshot();
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), json!({"x": "y"}));

        memory.clear();
        assert!(memory.snapshot().is_empty());
    }

    #[test]
    fn test_conversation_history() {
        let memory = AgentMemory::default();
        memory.add_message("user", "hi");
        memory.add_message("assistant", "hello");
        memory.add_message("user", "bye");

        assert_eq!(memory.history(None).len(), 3);
        let tail = memory.history(Some(2));
        assert_eq!(tail[0].content, "hello");
        assert_eq!(tail[1].role, "user");
        assert_eq!(memory.history(Some(10)).len(), 3);

        memory.clear_history();
        assert!(memory.history(None).is_empty());
    }
}
