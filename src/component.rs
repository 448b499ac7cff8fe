//! Component trait and type erasure.
//!
//! # How page components are stored
//!
//! The route table needs to hold components of *different* types in a single
//! `Vec<Route>`. Rust collections can only hold one concrete type, so we use
//! **trait objects** (`dyn ErasedComponent`) to hide the concrete component
//! type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! fn home(ctx: &NavigationContext) -> View { … }    ← user writes this
//!        ↓ Route::new("/", home)
//! home.into_boxed_component()                       ← Component blanket impl
//!        ↓
//! Arc::new(FnComponent(home))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedComponent = Arc<dyn ErasedComponent>
//! component.render(ctx)  at commit time             ← one vtable dispatch
//! ```
//!
//! Rendering is synchronous on purpose: anything slow (data loading,
//! identity lookups) happens in the middleware chain before the context
//! commits, so a component only formats what the chain already produced.

use std::sync::Arc;

use crate::context::NavigationContext;
use crate::view::{IntoView, View};

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Component` trait's `into_boxed_component`
/// method. External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedComponent {
    fn render(&self, ctx: &NavigationContext) -> View;
}

/// A heap-allocated, type-erased component shared across navigations.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedComponent`.
#[doc(hidden)]
pub type BoxedComponent = Arc<dyn ErasedComponent + Send + Sync + 'static>;

/// Implemented for every valid page component.
///
/// You never implement this yourself. It is automatically satisfied for any
/// function with the signature:
///
/// ```text
/// fn name(ctx: &NavigationContext) -> impl IntoView
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Component: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_component(self) -> BoxedComponent;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Component` on their own types.
mod private {
    pub trait Sealed {}
}

impl<F, V> private::Sealed for F
where
    F: Fn(&NavigationContext) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
}

impl<F, V> Component for F
where
    F: Fn(&NavigationContext) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
    fn into_boxed_component(self) -> BoxedComponent {
        Arc::new(FnComponent(self))
    }
}

/// Newtype wrapper that holds a concrete component `F` and implements
/// [`ErasedComponent`], bridging the typed world to the trait-object world.
struct FnComponent<F>(F);

impl<F, V> ErasedComponent for FnComponent<F>
where
    F: Fn(&NavigationContext) -> V + Send + Sync,
    V: IntoView,
{
    fn render(&self, ctx: &NavigationContext) -> View {
        (self.0)(ctx).into_view()
    }
}
