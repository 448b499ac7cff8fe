//! Minimal rumo example — a portfolio site's route table, driven headless.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example portfolio
//!
//! The script below walks the router through a visitor session: landing on
//! the home page, opening a project, tripping the parameter validation,
//! bouncing off a guarded page, then signing in and retrying.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use rumo::middleware::{
    Auth, Cache, CacheStore, DataLoader, ErrorLogger, Guest, Logger, Meta, Middleware, Next, Rule,
    Schema, Timeout, ValidateParams,
};
use rumo::{
    Error, MemoryDocument, MemoryHistory, MemoryStorage, NavigationContext, Route, Router,
    Storage, USER_KEY, View,
};

/// Offers whatever the loader produced to the cache middleware upstream.
struct MarkCacheable;

#[async_trait]
impl Middleware for MarkCacheable {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        next.run(ctx).await?;
        ctx.data.cacheable = ctx.data.loaded.clone();
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let history = Arc::new(MemoryHistory::hash_addresses());
    let storage = Arc::new(MemoryStorage::new());
    let document = Arc::new(MemoryDocument::new());
    let cache = Arc::new(CacheStore::new());

    let router = Router::mount(history.clone())
        .global(Logger)
        .global(ErrorLogger)
        .route(
            Route::new("/", home)
                .exact()
                .middleware(Meta::new(document.clone()).title("Home — rumo portfolio")),
        )
        .route(
            Route::new("/login", login)
                .middleware(Guest::new(storage.clone()))
                .middleware(Meta::new(document.clone()).title("Sign in")),
        )
        .route(
            Route::new("/projects/:id", project)
                .middleware(ValidateParams::new(
                    Schema::new().rule("id", Rule::new().required().number().min(1.0)),
                ))
                .middleware(Timeout::new(Duration::from_secs(2)))
                .middleware(Cache::new(cache.clone(), Duration::from_secs(60)))
                .middleware(MarkCacheable)
                .middleware(DataLoader::new(|ctx| {
                    let id = ctx.param("id").unwrap_or_default().to_owned();
                    async move {
                        // Stands in for a fetch against a projects API.
                        let name = format!("project #{id}");
                        Ok(json!({ "id": id, "name": name, "stars": 12 }))
                    }
                })),
        )
        .route(Route::new("/admin", admin).middleware(Auth::new(storage.clone())))
        .route(Route::new("/error", error_page))
        .not_found(|| View::html("<h1>404</h1><p>This page does not exist.</p>"));

    let nav = router.navigator();

    // Landing.
    router.sync().await;
    show("GET /", &router);

    // A project page: validation passes, data loads, result is cached.
    nav.navigate("/projects/2?tab=stack");
    router.drain().await;
    show("GET /projects/2?tab=stack", &router);

    // Same project again: served from the cache, the loader never runs.
    nav.navigate("/projects/2?tab=stack");
    router.drain().await;
    show("GET /projects/2?tab=stack (cached)", &router);

    // A bad project id: the validation guard bounces to /error.
    nav.navigate("/projects/latest");
    router.drain().await;
    show("GET /projects/latest", &router);

    // Guarded page without an identity: replaced with /login.
    nav.navigate("/admin");
    router.drain().await;
    show("GET /admin (anonymous)", &router);

    // Sign in, retry.
    storage.set(
        USER_KEY,
        r#"{"id":"1","name":"Ana","email":"ana@example.com","roles":["admin"]}"#,
    );
    nav.navigate("/admin");
    router.drain().await;
    show("GET /admin (signed in)", &router);

    println!("document title: {}", document.title());
}

fn show(step: &str, router: &Router) {
    println!("\n── {step}\n{}", router.render().markup());
}

fn home(_: &NavigationContext) -> View {
    View::html("<h1>Olá, I build things</h1><p>Selected work lives under /projects.</p>")
}

fn login(_: &NavigationContext) -> View {
    View::html("<h1>Sign in</h1><form>…</form>")
}

fn project(ctx: &NavigationContext) -> View {
    let fallback = json!({});
    let data = ctx
        .data
        .cached
        .as_ref()
        .or(ctx.data.loaded.as_ref())
        .unwrap_or(&fallback);
    View::html(format!(
        "<h1>{}</h1><p>tab: {}</p>",
        data["name"].as_str().unwrap_or("unknown project"),
        ctx.query.get("tab").map(String::as_str).unwrap_or("about"),
    ))
}

fn admin(ctx: &NavigationContext) -> View {
    let who = ctx.user.as_ref().map(|u| u.name.as_str()).unwrap_or("?");
    View::html(format!("<h1>Admin</h1><p>hello, {who}</p>"))
}

fn error_page(ctx: &NavigationContext) -> View {
    let kind = ctx.query.get("type").map(String::as_str).unwrap_or("unknown");
    View::html(format!("<h1>Oops</h1><p>{kind} error</p>"))
}
