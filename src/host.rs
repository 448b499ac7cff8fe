//! Host-page collaborators.
//!
//! Pieces of the page the router pokes at but does not own: the key-value
//! store holding the identity record, and the document head the meta
//! middleware writes into. Both come with in-memory implementations for
//! tests and headless runs; a browser deployment backs them with the real
//! facilities instead.

use std::collections::HashMap;
use std::sync::RwLock;

/// String key-value storage — the persistent store next to the page.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory [`Storage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().unwrap().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

/// The document head: a title and named meta tags.
pub trait Document: Send + Sync {
    fn set_title(&self, title: &str);
    fn set_meta(&self, name: &str, content: &str);
}

/// In-memory [`Document`], with read-back accessors for assertions.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    title: RwLock<String>,
    metas: RwLock<HashMap<String, String>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> String {
        self.title.read().unwrap().clone()
    }

    pub fn meta(&self, name: &str) -> Option<String> {
        self.metas.read().unwrap().get(name).cloned()
    }
}

impl Document for MemoryDocument {
    fn set_title(&self, title: &str) {
        *self.title.write().unwrap() = title.to_owned();
    }

    fn set_meta(&self, name: &str, content: &str) {
        self.metas.write().unwrap().insert(name.to_owned(), content.to_owned());
    }
}
