//! # rumo
//!
//! A minimal middleware-driven client-side router.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The page owns pixels; rumo owns navigation. Layout, styling, fetching
//! and rendering belong to your components and your host bindings — rumo
//! decides *which* component the current address means, and runs your
//! policy chain on the way there. Every feature rumo skips is one the view
//! layer already does, at no cost to you.
//!
//! What the view layer / host owns — rumo intentionally ignores:
//!
//! - **Markup and styling** — components return [`View`]s; what is inside
//!   them is their business
//! - **Server rendering** — there is no server; the router lives next to
//!   the page
//! - **Nested routes / code splitting** — one flat table, first match wins
//!
//! What's left for rumo — the only part that changes between applications:
//!
//! - Pattern matching — `/projects/:id` templates with positional captures
//! - A middleware chain — logging, auth, validation, caching, rate
//!   limiting, timeouts, all composed per navigation
//! - History synchronization — path or hash addresses, back/forward,
//!   replace-style guard redirects
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rumo::middleware::{Auth, Logger};
//! use rumo::{MemoryHistory, MemoryStorage, NavigationContext, Route, Router, View};
//!
//! #[tokio::main]
//! async fn main() {
//!     let history = Arc::new(MemoryHistory::hash_addresses());
//!     let storage = Arc::new(MemoryStorage::new());
//!
//!     let router = Router::mount(history)
//!         .global(Logger)
//!         .route(Route::new("/", home).exact())
//!         .route(Route::new("/projects/:id", project))
//!         .route(Route::new("/admin", admin).middleware(Auth::new(storage)))
//!         .not_found(|| View::html("<h1>404</h1>"));
//!
//!     router.run().await;
//! }
//!
//! fn home(_: &NavigationContext) -> View {
//!     View::html("<h1>home</h1>")
//! }
//!
//! fn project(ctx: &NavigationContext) -> View {
//!     View::html(format!("<h1>project {}</h1>", ctx.param("id").unwrap_or("?")))
//! }
//!
//! fn admin(ctx: &NavigationContext) -> View {
//!     let who = ctx.user.as_ref().map(|u| u.name.as_str()).unwrap_or("?");
//!     View::html(format!("<h1>hello, {who}</h1>"))
//! }
//! ```

mod component;
mod context;
mod error;
mod history;
mod host;
mod identity;
mod pattern;
mod query;
mod route;
mod router;
mod view;

pub mod middleware;

pub use component::Component;
pub use context::{ContextData, NavigationContext, Navigator};
pub use error::{BoxError, Error};
pub use history::{AddressMode, History, Location, MemoryHistory, PathChange};
pub use host::{Document, MemoryDocument, MemoryStorage, Storage};
pub use identity::{USER_KEY, User, stored_user};
pub use pattern::Pattern;
pub use query::parse as parse_query;
pub use route::Route;
pub use router::{Phase, Router};
pub use view::{IntoView, View};
