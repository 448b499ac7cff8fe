//! The router core: route resolution, pipeline orchestration, and the
//! navigation state machine.
//!
//! # States
//!
//! ```text
//! Idle ──sync──▶ Processing ──▶ Resolved   (a route matched, context committed)
//!                    │     ├──▶ NotFound   (no pattern matched; no middleware ran)
//!                    │     └──▶ Errored    (the chain raised)
//!                    ▲
//!                    └── every further path change re-enters Processing
//! ```
//!
//! `Resolved`, `NotFound` and `Errored` are rendering states, not terminal
//! ones. [`Router::render`] maps whatever state is current to a [`View`]:
//! the matched component, the not-found collaborator, the error
//! collaborator, or a loading placeholder while a chain is still running.
//!
//! # Stale attempts
//!
//! Navigation notifications carry a strictly increasing epoch. An attempt
//! commits only if its epoch is still the newest one emitted; a superseded
//! attempt runs to completion and is then discarded, so a slow chain can
//! never clobber a fresher navigation. A redirected context is discarded
//! unconditionally.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error};

use crate::context::{NavigationContext, Navigator};
use crate::error::Error;
use crate::history::{History, PathChange};
use crate::middleware::{self, Middleware};
use crate::query;
use crate::route::Route;
use crate::view::{IntoView, View};

/// Which rendering state the router is in. See the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Processing,
    Resolved,
    NotFound,
    Errored,
}

enum RouterState {
    Idle,
    Processing,
    Resolved(NavigationContext),
    NotFound,
    Errored(Error),
}

type NotFoundRenderer = Arc<dyn Fn() -> View + Send + Sync>;
type ErrorRenderer = Arc<dyn Fn(&Error) -> View + Send + Sync>;

/// The application router.
///
/// Built once at startup: mount a [`History`], chain route and middleware
/// registrations, then drive it — [`run`](Router::run) for the event loop,
/// or [`sync`](Router::sync)/[`turn`](Router::turn)/[`drain`](Router::drain)
/// for manual stepping.
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use rumo::middleware::Logger;
/// use rumo::{MemoryHistory, NavigationContext, Route, Router, View};
///
/// fn home(_: &NavigationContext) -> View {
///     View::html("<h1>home</h1>")
/// }
///
/// # async fn wiring() {
/// let history = Arc::new(MemoryHistory::hash_addresses());
/// let router = Router::mount(history)
///     .global(Logger)
///     .route(Route::new("/", home).exact());
///
/// router.sync().await;
/// println!("{}", router.render().markup());
/// # }
/// ```
pub struct Router {
    routes: Vec<Route>,
    global: Vec<Arc<dyn Middleware>>,
    history: Arc<dyn History>,
    events: Mutex<UnboundedReceiver<PathChange>>,
    state: RwLock<RouterState>,
    not_found: Option<NotFoundRenderer>,
    error_renderer: Option<ErrorRenderer>,
}

impl Router {
    /// Attaches a router to an address source. The router becomes the single
    /// consumer of the history's change notifications.
    pub fn mount(history: Arc<dyn History>) -> Self {
        let events = Mutex::new(history.changes());
        Self {
            routes: Vec::new(),
            global: Vec::new(),
            history,
            events,
            state: RwLock::new(RouterState::Idle),
            not_found: None,
            error_renderer: None,
        }
    }

    /// Appends a route. Registration order is match order: the first route
    /// whose pattern matches wins, with no specificity scoring. A `/:id`
    /// route registered before `/profile` shadows it.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Appends a global middleware. Globals run before any route's own
    /// middlewares, for every matched route, in registration order.
    pub fn global(mut self, middleware: impl Middleware) -> Self {
        self.global.push(Arc::new(middleware));
        self
    }

    /// Supplies the not-found renderer. Without one, a minimal 404 view is
    /// used.
    pub fn not_found<F, V>(mut self, renderer: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: IntoView,
    {
        self.not_found = Some(Arc::new(move || renderer().into_view()));
        self
    }

    /// Supplies the error renderer. Without one, a minimal error view is
    /// used.
    pub fn on_error<F, V>(mut self, renderer: F) -> Self
    where
        F: Fn(&Error) -> V + Send + Sync + 'static,
        V: IntoView,
    {
        self.error_renderer = Some(Arc::new(move |err| renderer(err).into_view()));
        self
    }

    /// A navigation capability bound to this router's history.
    pub fn navigator(&self) -> Navigator {
        Navigator::new(Arc::clone(&self.history))
    }

    // ── Driving ──────────────────────────────────────────────────────────────

    /// Processes the address currently showing — the initial navigation.
    pub async fn sync(&self) {
        let change = PathChange {
            path: self.history.route_path(),
            epoch: self.history.epoch(),
        };
        self.process(change).await;
    }

    /// Awaits the next path-change notification and processes it. Returns
    /// `false` once the notification stream has closed.
    pub async fn turn(&self) -> bool {
        let change = { self.events.lock().await.recv().await };
        match change {
            Some(change) => {
                self.process(change).await;
                true
            }
            None => false,
        }
    }

    /// Processes every already-pending notification, then returns. Settles
    /// redirect chains without blocking on new input.
    pub async fn drain(&self) {
        loop {
            let next = { self.events.lock().await.try_recv() };
            match next {
                Ok(change) => self.process(change).await,
                Err(_) => break,
            }
        }
    }

    /// The event loop: processes the current address, then every
    /// notification as it arrives. Runs for as long as the history emits.
    pub async fn run(&self) {
        self.sync().await;
        while self.turn().await {}
    }

    // ── State machine ────────────────────────────────────────────────────────

    async fn process(&self, change: PathChange) {
        let PathChange { path, epoch } = change;
        debug!(path = %path, epoch, "processing navigation");

        // Entering Processing discards any previously stored error.
        *self.state.write().unwrap() = RouterState::Processing;

        let Some(route) = self.resolve(&path) else {
            debug!(path = %path, "no route matched");
            self.commit(epoch, RouterState::NotFound);
            return;
        };

        let params = route.pattern().captures(&path);
        let query = query::parse(&self.history.raw_query());
        let mut ctx = NavigationContext::new(
            path.clone(),
            params,
            query,
            self.navigator(),
            epoch,
        );

        let chain: Vec<Arc<dyn Middleware>> = self
            .global
            .iter()
            .chain(route.middlewares().iter())
            .cloned()
            .collect();

        match middleware::run_chain(&chain, &mut ctx).await {
            Err(err) => {
                error!(path = %path, error = %err, "navigation errored");
                self.commit(epoch, RouterState::Errored(err));
            }
            Ok(()) if ctx.redirected => {
                // A redirected context is never committed; the redirect's own
                // notification produces the next committed state.
                debug!(path = %path, "discarding redirected context");
            }
            Ok(()) => {
                self.commit(epoch, RouterState::Resolved(ctx));
            }
        }
    }

    /// First structural match in registration order.
    fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Adopts `next` as the rendered state — unless a newer notification was
    /// emitted while this attempt ran, in which case the attempt is stale
    /// and its result is dropped.
    fn commit(&self, epoch: u64, next: RouterState) {
        let latest = self.history.epoch();
        if latest != epoch {
            debug!(epoch, latest, "discarding stale navigation");
            return;
        }
        *self.state.write().unwrap() = next;
    }

    // ── Introspection & rendering ────────────────────────────────────────────

    /// The current rendering phase.
    pub fn phase(&self) -> Phase {
        match *self.state.read().unwrap() {
            RouterState::Idle => Phase::Idle,
            RouterState::Processing => Phase::Processing,
            RouterState::Resolved(_) => Phase::Resolved,
            RouterState::NotFound => Phase::NotFound,
            RouterState::Errored(_) => Phase::Errored,
        }
    }

    /// A snapshot of the committed context, if a navigation has resolved.
    pub fn context(&self) -> Option<NavigationContext> {
        match &*self.state.read().unwrap() {
            RouterState::Resolved(ctx) => Some(ctx.clone()),
            _ => None,
        }
    }

    /// Display form of the captured error, if the router is `Errored`.
    pub fn error(&self) -> Option<String> {
        match &*self.state.read().unwrap() {
            RouterState::Errored(err) => Some(err.to_string()),
            _ => None,
        }
    }

    /// Renders the current state.
    ///
    /// A resolved state re-resolves which route matches the committed path —
    /// necessarily the route that matched during processing, since the
    /// committed path does not change in between.
    pub fn render(&self) -> View {
        match &*self.state.read().unwrap() {
            RouterState::Errored(err) => match &self.error_renderer {
                Some(renderer) => renderer(err),
                None => View::html(format!(
                    "<h1>Something went wrong</h1><p>{}</p>",
                    View::text(err.to_string()).markup()
                )),
            },
            RouterState::Idle | RouterState::Processing => View::html("<p>Loading…</p>"),
            RouterState::NotFound => self.render_not_found(),
            RouterState::Resolved(ctx) => match self.resolve(&ctx.path) {
                Some(route) => route.component().render(ctx),
                None => self.render_not_found(),
            },
        }
    }

    fn render_not_found(&self) -> View {
        match &self.not_found {
            Some(renderer) => renderer(),
            None => View::html("<h1>404</h1><p>Page not found</p>"),
        }
    }
}
