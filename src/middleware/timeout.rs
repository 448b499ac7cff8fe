//! Bounding a navigation's running time.

use std::time::Duration;

use async_trait::async_trait;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

/// Races the remaining chain against a timer; expiry is a chain failure.
///
/// The losing remainder is dropped, which cancels any in-flight awaits at
/// their next suspension point. Register this ahead of the slow part of the
/// chain (data loaders, identity lookups).
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Middleware for Timeout {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let path = ctx.path.clone();
        tokio::select! {
            outcome = next.run(ctx) => outcome,
            () = tokio::time::sleep(self.limit) => {
                Err(Error::Timeout { path, limit: self.limit })
            }
        }
    }
}
