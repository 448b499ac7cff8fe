//! Built-in middleware integration tests, driven through a mounted router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use rumo::middleware::{
    Auth, Cache, CacheStore, DataLoader, ErrorLogger, Guest, Meta, Middleware, Next, RateLimit,
    RateLimitStore, RedirectIf, RequireRole, Rule, Schema, Timeout, ValidateParams,
};
use rumo::{
    Error, MemoryDocument, MemoryHistory, MemoryStorage, NavigationContext, Phase, Route, Router,
    Storage, USER_KEY, View,
};

const ANA: &str = r#"{"id":"1","name":"Ana","email":"ana@example.com","roles":["admin"]}"#;
const GUEST_BOB: &str = r#"{"id":"2","name":"Bob","email":"bob@example.com","roles":[]}"#;

fn page(name: &'static str) -> impl Fn(&NavigationContext) -> View + Send + Sync + 'static {
    move |_: &NavigationContext| View::html(format!("<h1>{name}</h1>"))
}

/// Observes, after the downstream chain finished or halted, what it left in
/// the context — how sibling middlewares read each other's side channels.
struct Observe<F: Fn(&NavigationContext) + Send + Sync + 'static> {
    observer: F,
}

#[async_trait]
impl<F: Fn(&NavigationContext) + Send + Sync + 'static> Middleware for Observe<F> {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let outcome = next.run(ctx).await;
        (self.observer)(ctx);
        outcome
    }
}

/// Offers the loaded payload to an upstream cache.
struct MarkCacheable;

#[async_trait]
impl Middleware for MarkCacheable {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        next.run(ctx).await?;
        ctx.data.cacheable = ctx.data.loaded.clone();
        Ok(())
    }
}

#[tokio::test]
async fn auth_redirects_anonymous_and_attaches_identity() {
    let storage = Arc::new(MemoryStorage::new());
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history.clone())
        .route(Route::new("/admin", page("admin")).middleware(Auth::new(storage.clone())))
        .route(Route::new("/login", page("login")));

    let nav = router.navigator();
    nav.navigate("/admin");
    router.drain().await;

    // Anonymous: bounced, and the blocked entry was replaced, not stacked.
    assert_eq!(router.context().unwrap().path, "/login");
    assert_eq!(history.depth(), 2);

    storage.set(USER_KEY, ANA);
    nav.navigate("/admin");
    router.drain().await;

    let ctx = router.context().unwrap();
    assert_eq!(ctx.path, "/admin");
    assert_eq!(ctx.user.as_ref().unwrap().name, "Ana");
}

#[tokio::test]
async fn auth_clears_unreadable_identity_and_redirects() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, "{broken");
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(Route::new("/admin", page("admin")).middleware(Auth::new(storage.clone())))
        .route(Route::new("/login", page("login")));

    router.navigator().navigate("/admin");
    router.drain().await;

    assert_eq!(router.context().unwrap().path, "/login");
    assert!(storage.get(USER_KEY).is_none());
}

#[tokio::test]
async fn guest_bounces_authenticated_users_home() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, ANA);
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(Route::new("/", page("home")).exact())
        .route(Route::new("/login", page("login")).middleware(Guest::new(storage)));

    router.navigator().navigate("/login");
    router.drain().await;

    assert_eq!(router.context().unwrap().path, "/");
}

#[tokio::test]
async fn role_check_sends_missing_role_to_forbidden() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, GUEST_BOB);
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(
            Route::new("/settings", page("settings"))
                .middleware(Auth::new(storage.clone()))
                .middleware(RequireRole::new(["admin"])),
        )
        .route(Route::new("/403", page("forbidden")))
        .route(Route::new("/login", page("login")));

    let nav = router.navigator();
    nav.navigate("/settings");
    router.drain().await;
    assert_eq!(router.context().unwrap().path, "/403");

    storage.set(USER_KEY, ANA);
    nav.navigate("/settings");
    router.drain().await;
    assert_eq!(router.context().unwrap().path, "/settings");
}

#[tokio::test]
async fn validation_failure_collects_errors_and_lands_on_error_route() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(
            Route::new("/items/:id", page("item"))
                .middleware(Observe {
                    observer: move |ctx: &NavigationContext| {
                        sink.lock().unwrap().extend(ctx.data.validation_errors.clone());
                    },
                })
                .middleware(ValidateParams::new(
                    Schema::new().rule("id", Rule::new().required().number().min(1.0).max(100.0)),
                )),
        )
        .route(Route::new("/error", page("error")));

    router.navigator().navigate("/items/abc");
    router.drain().await;

    let ctx = router.context().unwrap();
    assert_eq!(ctx.path, "/error");
    assert_eq!(ctx.query["type"], "validation");
    assert_eq!(*seen.lock().unwrap(), ["parameter `id` must be a number"]);
}

#[tokio::test]
async fn validation_passes_well_formed_params() {
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).route(
        Route::new("/items/:id", page("item")).middleware(ValidateParams::new(
            Schema::new().rule(
                "id",
                Rule::new().required().number().min(1.0).max(100.0).pattern("^[0-9]+$"),
            ),
        )),
    );

    router.navigator().navigate("/items/42");
    router.drain().await;

    assert_eq!(router.phase(), Phase::Resolved);
    assert_eq!(router.context().unwrap().path, "/items/42");
}

#[tokio::test(start_paused = true)]
async fn cache_skips_the_expensive_chain_until_the_ttl_expires() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);

    let store = Arc::new(CacheStore::new());
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).route(
        Route::new("/data", page("data"))
            .middleware(Cache::new(store.clone(), Duration::from_secs(60)))
            .middleware(MarkCacheable)
            .middleware(DataLoader::new(move |_ctx| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({ "rows": [1, 2, 3] }))
                }
            })),
    );

    let nav = router.navigator();
    nav.navigate("/data");
    router.drain().await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(store.len(), 1);

    // Within the TTL: served from cache, the loader does not run again.
    nav.navigate("/data");
    router.drain().await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    let ctx = router.context().unwrap();
    assert_eq!(ctx.data.cached.as_ref().unwrap()["rows"], json!([1, 2, 3]));

    // Past the TTL: the chain runs again.
    tokio::time::advance(Duration::from_secs(61)).await;
    nav.navigate("/data");
    router.drain().await;
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_allows_the_budget_then_halts() {
    let flags: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&flags);

    let store = Arc::new(RateLimitStore::new());
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(
            Route::new("/limited", page("limited"))
                .middleware(Observe {
                    observer: move |ctx: &NavigationContext| {
                        sink.lock().unwrap().push(ctx.data.rate_limit_exceeded);
                    },
                })
                .middleware(
                    RateLimit::new(store, 2, Duration::from_secs(60))
                        .key_with(|_| "visitor".to_owned()),
                ),
        )
        .route(Route::new("/error", page("error")));

    let nav = router.navigator();
    for _ in 0..3 {
        nav.navigate("/limited");
        router.drain().await;
    }

    // Exactly two navigations fit the window; the third was halted.
    assert_eq!(*flags.lock().unwrap(), [false, false, true]);
    let ctx = router.context().unwrap();
    assert_eq!(ctx.path, "/error");
    assert_eq!(ctx.query["type"], "ratelimit");

    // A fresh window admits navigations again.
    tokio::time::advance(Duration::from_secs(61)).await;
    nav.navigate("/limited");
    router.drain().await;
    assert_eq!(router.context().unwrap().path, "/limited");
}

#[tokio::test(start_paused = true)]
async fn timeout_expiry_is_a_chain_failure() {
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).route(
        Route::new("/slow", page("slow"))
            .middleware(Timeout::new(Duration::from_millis(50)))
            .middleware(DataLoader::new(|_ctx| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(json!(null))
            })),
    );

    router.navigator().navigate("/slow");
    router.drain().await;

    assert_eq!(router.phase(), Phase::Errored);
    assert!(router.error().unwrap().contains("timed out"));
}

#[tokio::test]
async fn timeout_leaves_a_fast_chain_alone() {
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).route(
        Route::new("/fast", page("fast")).middleware(Timeout::new(Duration::from_secs(5))),
    );

    router.navigator().navigate("/fast");
    router.drain().await;

    assert_eq!(router.phase(), Phase::Resolved);
}

#[tokio::test]
async fn loader_failure_records_and_propagates() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).global(ErrorLogger).route(
        Route::new("/feed", page("feed"))
            .middleware(Observe {
                observer: move |ctx: &NavigationContext| {
                    *sink.lock().unwrap() = ctx.data.load_error.clone();
                },
            })
            .middleware(DataLoader::new(|_ctx| async {
                Err("feed service unavailable".into())
            })),
    );

    router.navigator().navigate("/feed");
    router.drain().await;

    assert_eq!(router.phase(), Phase::Errored);
    assert!(router.error().unwrap().contains("feed service unavailable"));
    assert_eq!(seen.lock().unwrap().as_deref(), Some("feed service unavailable"));
}

#[tokio::test]
async fn meta_applies_title_and_description() {
    let document = Arc::new(MemoryDocument::new());
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history).route(
        Route::new("/", page("home")).exact().middleware(
            Meta::new(document.clone())
                .title("Home — portfolio")
                .description("Selected work"),
        ),
    );

    router.sync().await;

    assert_eq!(document.title(), "Home — portfolio");
    assert_eq!(document.meta("description").as_deref(), Some("Selected work"));
}

#[tokio::test]
async fn conditional_redirect_fires_on_its_predicate() {
    let history = Arc::new(MemoryHistory::path_addresses());
    let router = Router::mount(history)
        .route(
            Route::new("/projects", page("projects")).middleware(RedirectIf::new(
                |ctx: &NavigationContext| ctx.query.contains_key("legacy_id"),
                "/",
            )),
        )
        .route(Route::new("/", page("home")).exact());

    let nav = router.navigator();
    nav.navigate("/projects?legacy_id=9");
    router.drain().await;
    assert_eq!(router.context().unwrap().path, "/");

    nav.navigate("/projects");
    router.drain().await;
    assert_eq!(router.context().unwrap().path, "/projects");
}
