//! Navigation logging.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info};

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

/// Logs every navigation: path, params and query on entry, elapsed time on
/// completion. Typically registered globally, first.
pub struct Logger;

#[async_trait]
impl Middleware for Logger {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let started = Instant::now();
        info!(path = %ctx.path, params = ?ctx.params, query = ?ctx.query, "navigating");

        next.run(ctx).await?;

        info!(
            path = %ctx.path,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "navigation processed"
        );
        Ok(())
    }
}

/// Logs an error escaping the downstream chain, then re-raises it.
///
/// Catch-and-rethrow is the supported way to add diagnostics without
/// swallowing the failure; the router still ends up in its `Errored` state.
pub struct ErrorLogger;

#[async_trait]
impl Middleware for ErrorLogger {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        match next.run(ctx).await {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(path = %ctx.path, error = %err, "navigation failed");
                Err(err)
            }
        }
    }
}
