//! Route definitions.

use std::sync::Arc;

use crate::component::{BoxedComponent, Component};
use crate::middleware::Middleware;
use crate::pattern::Pattern;

/// One entry in the route table: a pattern, a component, and the route's own
/// middleware chain. Registered once at application start, immutable after.
///
/// Each builder method returns `self` so definitions chain naturally:
///
/// ```rust
/// use rumo::{NavigationContext, Route, View};
///
/// fn project(ctx: &NavigationContext) -> View {
///     View::html(format!("<h1>project {}</h1>", ctx.param("id").unwrap_or("?")))
/// }
///
/// Route::new("/projects/:id", project);
/// Route::new("/", |_: &NavigationContext| View::html("<h1>home</h1>")).exact();
/// ```
pub struct Route {
    pattern: Pattern,
    exact: bool,
    component: BoxedComponent,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Route {
    /// Registers `component` under `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not compile — route tables are built at
    /// application start.
    pub fn new(pattern: &str, component: impl Component) -> Self {
        Self {
            pattern: Pattern::compile(pattern),
            exact: false,
            component: component.into_boxed_component(),
            middlewares: Vec::new(),
        }
    }

    /// Requires the path to equal the pattern text verbatim. Captures are
    /// still extracted through the compiled pattern; exactness only changes
    /// the boolean decision.
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Appends a route-scoped middleware. Route middlewares run after the
    /// globals, in the order they were appended.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub(crate) fn matches(&self, path: &str) -> bool {
        if self.exact {
            self.pattern.raw() == path
        } else {
            self.pattern.matches(path)
        }
    }

    pub(crate) fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub(crate) fn component(&self) -> &BoxedComponent {
        &self.component
    }

    pub(crate) fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }
}
