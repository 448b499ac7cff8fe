//! Conditional redirects.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

type Predicate = Arc<dyn Fn(&NavigationContext) -> bool + Send + Sync>;

/// Guard halt to `target` whenever the predicate holds.
///
/// ```rust
/// use rumo::middleware::RedirectIf;
///
/// // Legacy query-style project links.
/// RedirectIf::new(|ctx| ctx.query.contains_key("legacy_id"), "/projects");
/// ```
pub struct RedirectIf {
    predicate: Predicate,
    target: String,
}

impl RedirectIf {
    pub fn new<F>(predicate: F, target: &str) -> Self
    where
        F: Fn(&NavigationContext) -> bool + Send + Sync + 'static,
    {
        Self { predicate: Arc::new(predicate), target: target.to_owned() }
    }
}

#[async_trait]
impl Middleware for RedirectIf {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        if (self.predicate)(ctx) {
            ctx.redirect(&self.target);
            return Ok(());
        }
        next.run(ctx).await
    }
}
