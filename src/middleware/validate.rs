//! Declarative path-parameter validation.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{Middleware, Next};
use crate::context::NavigationContext;
use crate::error::Error;

/// Expected shape of a parameter value. All raw values are strings; a kind
/// says how the string must read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

type CustomCheck = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// The rules for one parameter. Build by chaining:
///
/// ```rust
/// use rumo::middleware::Rule;
///
/// Rule::new().required().number().min(1.0);
/// ```
#[derive(Clone, Default)]
pub struct Rule {
    required: bool,
    kind: Option<ParamKind>,
    pattern: Option<Regex>,
    min: Option<f64>,
    max: Option<f64>,
    custom: Option<CustomCheck>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameter must be present and non-empty.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn string(mut self) -> Self {
        self.kind = Some(ParamKind::String);
        self
    }

    /// The value must parse as a number. Enables [`min`](Self::min) and
    /// [`max`](Self::max).
    pub fn number(mut self) -> Self {
        self.kind = Some(ParamKind::Number);
        self
    }

    /// The value must read as `true` or `false`.
    pub fn boolean(mut self) -> Self {
        self.kind = Some(ParamKind::Boolean);
        self
    }

    /// The value must match `pattern` (full regex syntax, unanchored).
    ///
    /// # Panics
    ///
    /// Panics on an invalid pattern — schemas are built at registration
    /// time.
    pub fn pattern(mut self, pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid validation pattern `{pattern}`: {e}"));
        self.pattern = Some(regex);
        self
    }

    /// Lower bound for numeric values.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper bound for numeric values.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Custom predicate; `Err(message)` becomes the recorded validation
    /// error.
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    fn check(&self, name: &str, value: Option<&str>, errors: &mut Vec<String>) {
        let value = match value {
            None | Some("") => {
                if self.required {
                    errors.push(format!("parameter `{name}` is required"));
                }
                return;
            }
            Some(value) => value,
        };

        let number = value.parse::<f64>().ok();

        match self.kind {
            Some(ParamKind::Number) if number.is_none() => {
                errors.push(format!("parameter `{name}` must be a number"));
            }
            Some(ParamKind::Boolean) if value.parse::<bool>().is_err() => {
                errors.push(format!("parameter `{name}` must be true or false"));
            }
            _ => {}
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                errors.push(format!("parameter `{name}` has an invalid format"));
            }
        }

        if self.kind == Some(ParamKind::Number) {
            if let Some(number) = number {
                if let Some(min) = self.min {
                    if number < min {
                        errors.push(format!("parameter `{name}` must be >= {min}"));
                    }
                }
                if let Some(max) = self.max {
                    if number > max {
                        errors.push(format!("parameter `{name}` must be <= {max}"));
                    }
                }
            }
        }

        if let Some(custom) = &self.custom {
            if let Err(message) = custom(value) {
                errors.push(message);
            }
        }
    }
}

/// An ordered set of per-parameter rules.
#[derive(Clone, Default)]
pub struct Schema {
    rules: Vec<(String, Rule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        self.rules.push((name.to_owned(), rule));
        self
    }
}

/// Validates `ctx.params` against a [`Schema`].
///
/// All rules are evaluated; every failure is collected into
/// `ctx.data.validation_errors`, and one failure or more means a guard halt
/// to the error route.
pub struct ValidateParams {
    schema: Schema,
    target: String,
}

impl ValidateParams {
    pub fn new(schema: Schema) -> Self {
        Self { schema, target: "/error?type=validation".to_owned() }
    }

    /// Overrides the error route (default `/error?type=validation`).
    pub fn target(mut self, path: &str) -> Self {
        self.target = path.to_owned();
        self
    }
}

#[async_trait]
impl Middleware for ValidateParams {
    async fn handle(&self, ctx: &mut NavigationContext, next: Next<'_>) -> Result<(), Error> {
        let mut errors = Vec::new();
        for (name, rule) in &self.schema.rules {
            rule.check(name, ctx.param(name), &mut errors);
        }

        if !errors.is_empty() {
            debug!(path = %ctx.path, ?errors, "parameter validation failed");
            ctx.data.validation_errors = errors;
            ctx.redirect(&self.target);
            return Ok(());
        }

        next.run(ctx).await
    }
}
