//! Sliding-window navigation rate limiting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::warn;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

type KeyFn = Arc<dyn Fn(&NavigationContext) -> String + Send + Sync>;

/// Process-lifetime hit log, one timestamp list per key.
///
/// Constructed once at registration and injected, so tests build a fresh
/// store per test. Chains never run in parallel, so plain sequential
/// mutation under the lock is sufficient.
#[derive(Default)]
pub struct RateLimitStore {
    hits: RwLock<HashMap<String, Vec<Instant>>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops hits older than `window`, then either records a new hit
    /// (`true`) or reports the budget spent (`false`).
    fn try_acquire(&self, key: &str, max_requests: usize, window: Duration) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.write().unwrap();
        let log = hits.entry(key.to_owned()).or_default();

        log.retain(|hit| now.duration_since(*hit) < window);
        if log.len() >= max_requests {
            return false;
        }
        log.push(now);
        true
    }
}

/// Allows `max_requests` navigations per key within a sliding window; the
/// next one inside the window is a guard halt to the error route with
/// `ctx.data.rate_limit_exceeded` set.
///
/// The key is produced by a custom function if given, else the attached
/// identity's id, else `"anonymous"`.
pub struct RateLimit {
    store: Arc<RateLimitStore>,
    max_requests: usize,
    window: Duration,
    key_fn: Option<KeyFn>,
    target: String,
}

impl RateLimit {
    pub fn new(store: Arc<RateLimitStore>, max_requests: usize, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
            key_fn: None,
            target: "/error?type=ratelimit".to_owned(),
        }
    }

    /// Derives the limiting key from the context instead of the identity.
    pub fn key_with<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&NavigationContext) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(key_fn));
        self
    }

    /// Overrides the error route (default `/error?type=ratelimit`).
    pub fn target(mut self, path: &str) -> Self {
        self.target = path.to_owned();
        self
    }

    fn key_for(&self, ctx: &NavigationContext) -> String {
        if let Some(key_fn) = &self.key_fn {
            return key_fn(ctx);
        }
        ctx.user
            .as_ref()
            .map(|user| user.id.clone())
            .unwrap_or_else(|| "anonymous".to_owned())
    }
}

#[async_trait]
impl Middleware for RateLimit {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let key = self.key_for(ctx);

        if !self.store.try_acquire(&key, self.max_requests, self.window) {
            warn!(%key, path = %ctx.path, "rate limit exceeded");
            ctx.data.rate_limit_exceeded = true;
            ctx.redirect(&self.target);
            return Ok(());
        }

        next.run(ctx).await
    }
}
