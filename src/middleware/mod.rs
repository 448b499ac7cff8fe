//! Middleware layer.
//!
//! Middleware intercepts navigations and is the right place for
//! cross-cutting policy: structured tracing, authentication and role
//! guards, parameter validation, caching, rate limiting, timeouts.
//!
//! # The contract
//!
//! A middleware receives the mutable [`NavigationContext`] and a [`Next`]
//! continuation, and does exactly one of three things:
//!
//! - calls `next.run(ctx).await` to let the rest of the chain (and
//!   eventually the route's component) proceed;
//! - returns `Ok(())` **without** calling `next` — the chain halts there.
//!   This is the designed mechanism for guards and cache hits; a guard that
//!   redirects additionally calls [`NavigationContext::redirect`] so the
//!   halted context is never committed;
//! - returns `Err` — the rest of the chain is skipped and the router
//!   surfaces the error as its `Errored` state.
//!
//! [`Next::run`] takes `self` by value: the continuation is a one-shot
//! capability, and invoking it twice is rejected by the compiler rather
//! than left as undefined behavior.
//!
//! For a given navigation the router runs the global middlewares first,
//! then the matched route's own, each in registration order.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NavigationContext;
use crate::error::Error;

mod auth;
mod cache;
mod load;
mod logger;
mod meta;
mod rate_limit;
mod redirect;
mod timeout;
mod validate;

pub use auth::{Auth, Guest, RequireRole};
pub use cache::{Cache, CacheStore};
pub use load::DataLoader;
pub use logger::{ErrorLogger, Logger};
pub use meta::Meta;
pub use rate_limit::{RateLimit, RateLimitStore};
pub use redirect::RedirectIf;
pub use timeout::Timeout;
pub use validate::{ParamKind, Rule, Schema, ValidateParams};

/// A unit of navigation policy.
///
/// ```rust
/// use async_trait::async_trait;
/// use rumo::middleware::{Middleware, Next};
/// use rumo::{Error, NavigationContext};
///
/// struct Announce;
///
/// #[async_trait]
/// impl Middleware for Announce {
///     async fn handle(
///         &self,
///         ctx: &mut NavigationContext,
///         next: Next<'_>,
///     ) -> Result<(), Error> {
///         tracing::info!(path = %ctx.path, "passing through");
///         next.run(ctx).await
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error>;
}

/// The continuation handed to each middleware: the not-yet-run remainder of
/// the chain.
///
/// Consuming `self` in [`run`](Next::run) makes at-most-once invocation a
/// type-system fact. Dropping it unused halts the chain.
pub struct Next<'a> {
    stack: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    /// Runs the remainder of the chain against `ctx`.
    pub async fn run(self, ctx: &mut NavigationContext) -> Result<(), Error> {
        match self.stack.split_first() {
            Some((head, rest)) => head.handle(ctx, Next { stack: rest }).await,
            None => Ok(()),
        }
    }
}

/// Executes an ordered chain to completion, a halt, or an error.
pub(crate) async fn run_chain(
    stack: &[Arc<dyn Middleware>],
    ctx: &mut NavigationContext,
) -> Result<(), Error> {
    Next { stack }.run(ctx).await
}
