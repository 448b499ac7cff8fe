//! Rendered output type and the [`IntoView`] conversion trait.
//!
//! You should not need to think about this module directly. Build a [`View`]
//! in your component and return it. That is the entire job description.

/// A rendered unit of markup — what a page component hands to the view layer.
///
/// ```rust
/// use rumo::View;
///
/// View::html("<h1>home</h1>");
/// View::text("1 < 2");          // escaped: 1 &lt; 2
/// View::empty();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    markup: String,
}

impl View {
    /// A view from ready-made markup, passed through untouched.
    pub fn html(markup: impl Into<String>) -> Self {
        Self { markup: markup.into() }
    }

    /// A view from plain text. `&`, `<` and `>` are escaped.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            markup: text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;"),
        }
    }

    /// A view that renders nothing.
    pub fn empty() -> Self {
        Self { markup: String::new() }
    }

    /// The markup to hand to the view layer.
    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Conversion into a rendered [`View`].
///
/// Implemented for `View` itself and for strings (which render as escaped
/// text). Implement on your own types to return them directly from page
/// components.
pub trait IntoView {
    fn into_view(self) -> View;
}

impl IntoView for View {
    fn into_view(self) -> View {
        self
    }
}

impl IntoView for &'static str {
    fn into_view(self) -> View {
        View::text(self)
    }
}

impl IntoView for String {
    fn into_view(self) -> View {
        View::text(self)
    }
}
