//! Route patterns and capture extraction.
//!
//! A pattern is a `/`-separated template. A segment starting with `:` is a
//! named capture; every other segment matches literally. Compilation turns
//! the template into a single anchored regular expression, so a pattern
//! matches whole paths only — prefixes never match, and a path with a
//! different segment count never matches.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// A compiled route pattern.
///
/// ```rust
/// use rumo::Pattern;
///
/// let p = Pattern::compile("/projects/:id");
/// assert!(p.matches("/projects/42"));
/// assert!(!p.matches("/projects/42/files"));
/// assert_eq!(p.captures("/projects/42")["id"], "42");
/// ```
///
/// Trailing slashes are significant: `/a` and `/a/` are distinct paths and
/// no normalization is performed. Capture names must be unique within one
/// pattern; with duplicates, the rightmost occurrence wins.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    /// Compiles a pattern. Capture names are recorded left to right; literal
    /// segments are escaped, so `.` or `+` in a segment match themselves.
    ///
    /// # Panics
    ///
    /// Panics if the pattern cannot be compiled. Patterns are registered at
    /// application start, so this is a programming error, not a runtime
    /// condition.
    pub fn compile(raw: &str) -> Self {
        let mut names = Vec::new();
        let source = raw
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => {
                    names.push(name.to_owned());
                    "([^/]+)".to_owned()
                }
                None => regex::escape(segment),
            })
            .collect::<Vec<_>>()
            .join("/");

        let regex = Regex::new(&format!("^{source}$"))
            .unwrap_or_else(|e| panic!("invalid route pattern `{raw}`: {e}"));

        Self { raw: raw.to_owned(), regex, names }
    }

    /// The pattern text as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Full-path anchored test.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extracts captures positionally: the Nth capture name maps to the Nth
    /// group's matched text, percent-decoded. A non-matching path yields an
    /// empty map — never partial captures.
    pub fn captures(&self, path: &str) -> HashMap<String, String> {
        let Some(caps) = self.regex.captures(path) else {
            return HashMap::new();
        };

        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let text = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                let value = percent_decode_str(text).decode_utf8_lossy().into_owned();
                (name.clone(), value)
            })
            .collect()
    }

    /// Capture names in left-to-right order.
    pub fn capture_names(&self) -> &[String] {
        &self.names
    }
}
