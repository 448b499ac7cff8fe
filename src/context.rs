//! The per-navigation context threaded through the middleware chain.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::history::History;
use crate::identity::User;

/// The mutable record one navigation attempt carries through its middleware
/// chain and, if it commits, into the rendered component.
///
/// Created fresh per attempt, owned exclusively by that attempt, discarded
/// when the attempt is superseded, committed, or fails. Middlewares
/// communicate downstream by mutating [`data`](Self::data); a guard that
/// decides against this navigation calls [`redirect`](Self::redirect) and
/// returns without running the rest of the chain.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    /// The path being navigated to.
    pub path: String,
    /// Capture name → decoded path segment, positional per the matched
    /// pattern.
    pub params: HashMap<String, String>,
    /// Query key → decoded value, last occurrence wins.
    pub query: HashMap<String, String>,
    /// Side channels the middlewares fill for one another and for the
    /// component.
    pub data: ContextData,
    /// Identity snapshot, attached by an authentication middleware.
    pub user: Option<User>,
    /// Set once a guard decided against this navigation. A redirected
    /// context is never committed.
    pub redirected: bool,
    navigator: Navigator,
    epoch: u64,
}

impl NavigationContext {
    pub(crate) fn new(
        path: String,
        params: HashMap<String, String>,
        query: HashMap<String, String>,
        navigator: Navigator,
        epoch: u64,
    ) -> Self {
        Self {
            path,
            params,
            query,
            data: ContextData::default(),
            user: None,
            redirected: false,
            navigator,
            epoch,
        }
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/projects/:id`, `ctx.param("id")` on `/projects/42`
    /// returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Requests a new navigation, adding a history entry.
    pub fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }

    /// Guard halt: marks this context as redirected and replaces the current
    /// history entry with `path`, so "back" does not return to the blocked
    /// page. The caller returns without invoking its continuation.
    pub fn redirect(&mut self, path: &str) {
        self.redirected = true;
        self.navigator.replace(path);
    }

    /// The navigation capability bound to the owning router.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// Generation token of the notification that started this attempt.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Known middleware side channels, plus an open-ended remainder.
///
/// Producers and consumers agree by field: the validation middleware fills
/// `validation_errors`, the data loader fills `loaded`, the cache serves
/// into `cached` and stores whatever the chain left in `cacheable`, and so
/// on. Anything without a dedicated field goes through `extra` under a
/// by-convention key.
#[derive(Debug, Clone, Default)]
pub struct ContextData {
    /// Messages from a failed parameter validation.
    pub validation_errors: Vec<String>,
    /// Payload produced by a data-loading middleware.
    pub loaded: Option<Value>,
    /// Display message of a failed load, recorded before the error
    /// propagates.
    pub load_error: Option<String>,
    /// True while a data-loading middleware is awaiting its loader.
    pub loading: bool,
    /// Payload served from cache instead of running the downstream chain.
    pub cached: Option<Value>,
    /// Payload the downstream chain offers for caching.
    pub cacheable: Option<Value>,
    /// Set when a rate-limit guard halted this navigation.
    pub rate_limit_exceeded: bool,
    /// Informal side channels keyed by convention.
    pub extra: HashMap<String, Value>,
}

/// Capability handle for requesting navigations.
///
/// Cheap to clone; hand it to whatever needs to steer the router — a
/// middleware does so through its context, a rendered component may keep
/// one, the host application drives the initial wiring with one.
#[derive(Clone)]
pub struct Navigator {
    history: Arc<dyn History>,
}

impl Navigator {
    pub(crate) fn new(history: Arc<dyn History>) -> Self {
        Self { history }
    }

    /// Navigates to `path`, adding a history entry.
    pub fn navigate(&self, path: &str) {
        self.history.push(path);
    }

    /// Navigates to `path`, replacing the current history entry.
    pub fn replace(&self, path: &str) {
        self.history.replace(path);
    }

    /// Browser-style back.
    pub fn back(&self) {
        self.history.back();
    }

    /// Browser-style forward.
    pub fn forward(&self) {
        self.history.forward();
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Navigator")
    }
}
