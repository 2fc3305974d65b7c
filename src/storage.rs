//! Key-value persistence capability
//!
//! The session takes storage as an injected capability so scoring logic
//! stays testable without a browser. On web the backing store is
//! LocalStorage; storage failures are logged and swallowed, never fatal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// String key-value storage, the only persistence surface of the core
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory storage for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    map: HashMap<String, String>,
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_owned(), value.to_owned());
    }
}

/// Clonable handle over a [`MemoryStorage`] so a test or embedder can keep
/// observing writes after handing the session its copy
#[derive(Debug, Clone, Default)]
pub struct SharedStorage(Rc<RefCell<MemoryStorage>>);

impl KeyValueStorage for SharedStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.borrow_mut().set(key, value);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(key).ok())
            .flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        match storage {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::warn!("LocalStorage write failed for {key}");
                }
            }
            None => log::warn!("LocalStorage unavailable, dropping write for {key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::default();
        assert_eq!(storage.get("bestScore"), None);
        storage.set("bestScore", "{}");
        assert_eq!(storage.get("bestScore").as_deref(), Some("{}"));
    }

    #[test]
    fn shared_storage_clones_observe_writes() {
        let observer = SharedStorage::default();
        let mut writer = observer.clone();
        writer.set("k", "v");
        assert_eq!(observer.get("k").as_deref(), Some("v"));
    }
}
