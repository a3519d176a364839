//! Local persistence - the durable medium for offline state.
//!
//! Models the browser's origin-scoped key-value storage: synchronous
//! string-keyed get/set/remove of JSON text. All offline durability
//! (answer snapshots, the submission queue, the cached form structure)
//! goes through this trait and nothing else.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage key for the in-progress answer snapshot.
pub const OFFLINE_ANSWERS_KEY: &str = "offlineAnswers";
/// Storage key for the queue of unsent submissions.
pub const OFFLINE_SUBMISSIONS_KEY: &str = "offlineSubmissions";
/// Storage key for the cached form structure.
pub const OFFLINE_FORM_KEY: &str = "offlineFormStructure";

/// Synchronous string-keyed storage.
///
/// Operations never fail from the caller's perspective; a medium that
/// cannot persist simply behaves like [`NoopStore`].
pub trait LocalStore: Send + Sync {
    /// Persist `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str);

    /// Load the value under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Option<String>;

    /// Remove `key` entirely.
    fn clear(&self, key: &str);
}

/// Deserialize the JSON stored under `key`, falling back to the default.
///
/// Missing data is a normal absence. Corrupt data is logged and treated
/// as absent - it is never propagated as an error.
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn LocalStore, key: &str) -> T {
    match store.load(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt offline data");
                T::default()
            }
        },
        None => T::default(),
    }
}

/// In-memory store backed by a mutex-guarded map.
///
/// The default medium for native processes and tests. The mutex only
/// guards the map itself; the engine assumes a single writer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn save(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn clear(&self, key: &str) {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .remove(key);
    }
}

/// Storage for contexts without a durable medium (server-side
/// rendering). Every operation is a guarded no-op; `load` reports
/// absence rather than erroring.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl LocalStore for NoopStore {
    fn save(&self, _key: &str, _value: &str) {}

    fn load(&self, _key: &str) -> Option<String> {
        None
    }

    fn clear(&self, _key: &str) {}
}
