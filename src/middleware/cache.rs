//! Navigation-data caching with a time-to-live.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Process-lifetime cache storage.
///
/// Constructed once at registration and injected into every [`Cache`] that
/// should share it; tests construct a fresh store per test.
#[derive(Default)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Returns the entry under `key` if it is younger than `ttl`.
    fn fresh(&self, key: &str, ttl: Duration) -> Option<Value> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn insert(&self, key: String, value: Value) {
        self.entries
            .write()
            .unwrap()
            .insert(key, CacheEntry { value, stored_at: Instant::now() });
    }
}

/// Serves repeated navigations from cache.
///
/// The key is the path plus the canonicalized query (or a fixed custom key).
/// A fresh hit fills `ctx.data.cached` and halts the chain without
/// redirecting — the context still commits and the component renders from
/// the cached payload. On a miss the chain runs, and whatever it left in
/// `ctx.data.cacheable` is stored for next time.
pub struct Cache {
    store: Arc<CacheStore>,
    ttl: Duration,
    key: Option<String>,
}

impl Cache {
    pub fn new(store: Arc<CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl, key: None }
    }

    /// Uses a fixed key instead of path + query.
    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_owned());
        self
    }

    fn key_for(&self, ctx: &NavigationContext) -> String {
        if let Some(key) = &self.key {
            return key.clone();
        }
        let mut pairs: Vec<_> = ctx.query.iter().collect();
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", ctx.path)
    }
}

#[async_trait]
impl Middleware for Cache {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let key = self.key_for(ctx);

        if let Some(value) = self.store.fresh(&key, self.ttl) {
            debug!(%key, "serving navigation data from cache");
            ctx.data.cached = Some(value);
            return Ok(());
        }

        next.run(ctx).await?;

        if let Some(value) = ctx.data.cacheable.clone() {
            self.store.insert(key, value);
        }
        Ok(())
    }
}
