//! Document title and meta tags per route.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;
use crate::host::Document;

/// Writes a title and/or description into the document head before the rest
/// of the chain runs.
pub struct Meta {
    document: Arc<dyn Document>,
    title: Option<String>,
    description: Option<String>,
}

impl Meta {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document, title: None, description: None }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

#[async_trait]
impl Middleware for Meta {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        if let Some(title) = &self.title {
            self.document.set_title(title);
        }
        if let Some(description) = &self.description {
            self.document.set_meta("description", description);
        }
        next.run(ctx).await
    }
}
