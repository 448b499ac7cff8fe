//! Identity guards: authentication, guest-only pages, role checks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;
use crate::host::Storage;
use crate::identity::stored_user;

/// Requires a stored identity.
///
/// On success the identity snapshot is attached to `ctx.user` for everything
/// downstream. Absent or unreadable identity means a guard halt to the login
/// route; an unreadable record is also cleared from storage.
pub struct Auth {
    storage: Arc<dyn Storage>,
    login: String,
}

impl Auth {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, login: "/login".to_owned() }
    }

    /// Overrides the login route (default `/login`).
    pub fn login(mut self, path: &str) -> Self {
        self.login = path.to_owned();
        self
    }
}

#[async_trait]
impl Middleware for Auth {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        match stored_user(&*self.storage) {
            Some(user) => {
                ctx.user = Some(user);
                next.run(ctx).await
            }
            None => {
                debug!(path = %ctx.path, "no identity, redirecting to login");
                ctx.redirect(&self.login);
                Ok(())
            }
        }
    }
}

/// Keeps authenticated users away from guest-only routes (login,
/// registration).
pub struct Guest {
    storage: Arc<dyn Storage>,
    home: String,
}

impl Guest {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, home: "/".to_owned() }
    }

    /// Overrides where authenticated users are sent (default `/`).
    pub fn home(mut self, path: &str) -> Self {
        self.home = path.to_owned();
        self
    }
}

#[async_trait]
impl Middleware for Guest {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        if stored_user(&*self.storage).is_some() {
            debug!(path = %ctx.path, "already authenticated, leaving guest-only route");
            ctx.redirect(&self.home);
            return Ok(());
        }
        next.run(ctx).await
    }
}

/// Requires `ctx.user` to hold at least one of the listed roles.
///
/// Runs after [`Auth`] in the same chain — without an attached identity the
/// navigation is sent to the login route, without a matching role to the
/// forbidden route.
pub struct RequireRole {
    roles: Vec<String>,
    login: String,
    forbidden: String,
}

impl RequireRole {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            login: "/login".to_owned(),
            forbidden: "/403".to_owned(),
        }
    }

    /// Overrides the login route (default `/login`).
    pub fn login(mut self, path: &str) -> Self {
        self.login = path.to_owned();
        self
    }

    /// Overrides the forbidden route (default `/403`).
    pub fn forbidden(mut self, path: &str) -> Self {
        self.forbidden = path.to_owned();
        self
    }
}

#[async_trait]
impl Middleware for RequireRole {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let Some(user) = &ctx.user else {
            ctx.redirect(&self.login);
            return Ok(());
        };

        let permitted = user.roles.iter().any(|role| self.roles.contains(role));
        if !permitted {
            debug!(path = %ctx.path, required = ?self.roles, held = ?user.roles, "role check failed");
            ctx.redirect(&self.forbidden);
            return Ok(());
        }

        next.run(ctx).await
    }
}
