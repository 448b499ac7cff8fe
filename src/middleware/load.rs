//! Data loading ahead of the route component.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::{BoxError, Error};

type LoadFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, BoxError>> + Send>>;
type Loader = Arc<dyn Fn(&NavigationContext) -> LoadFuture + Send + Sync>;

/// Awaits an async loader and parks its payload in `ctx.data.loaded` for the
/// downstream chain and the component.
///
/// `ctx.data.loading` is true for the duration of the await. A failed load
/// records its message in `ctx.data.load_error` and then propagates, so the
/// router lands in `Errored` rather than rendering a half-loaded page.
///
/// The loader borrows the context only to pick out what it needs; the
/// returned future owns its data:
///
/// ```rust
/// use rumo::middleware::DataLoader;
/// use serde_json::json;
///
/// DataLoader::new(|ctx| {
///     let id = ctx.param("id").unwrap_or_default().to_owned();
///     async move { Ok(json!({ "project": id })) }
/// });
/// ```
pub struct DataLoader {
    loader: Loader,
}

impl DataLoader {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn(&NavigationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, BoxError>> + Send + 'static,
    {
        Self { loader: Arc::new(move |ctx| Box::pin(loader(ctx))) }
    }
}

#[async_trait]
impl Middleware for DataLoader {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        ctx.data.loading = true;
        let outcome = (self.loader)(ctx).await;
        ctx.data.loading = false;

        match outcome {
            Ok(value) => {
                debug!(path = %ctx.path, "data loaded");
                ctx.data.loaded = Some(value);
                next.run(ctx).await
            }
            Err(err) => {
                ctx.data.load_error = Some(err.to_string());
                Err(Error::Load(err))
            }
        }
    }
}
