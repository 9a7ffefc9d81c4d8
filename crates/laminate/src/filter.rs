//! The `markdown` template filter.
//!
//! Templates convert markdown with either filter syntax:
//!
//! ```jinja
//! {% filter markdown %}
//! # Summary
//!
//! **Everything** is fine.
//! {% endfilter %}
//!
//! {{ notes | markdown }}
//! ```
//!
//! The filter result is marked safe, so the generated HTML is not escaped
//! again in auto-escaping (`.html`) templates. Each use converts only its own
//! block: a `[TOC]` inside a filter block lists that block's headings.

use std::fmt;
use std::sync::Arc;

use laminate_markdown::MarkdownConverter;
use minijinja::{Environment, Error, ErrorKind, Value};

/// Name the filter is registered under.
pub const FILTER_NAME: &str = "markdown";

/// Error type returned by custom filter callables.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Signature of a custom markup callable.
pub type FilterFn = dyn Fn(&str) -> Result<String, FilterError> + Send + Sync;

/// How the `markdown` filter is provided to templates.
#[derive(Clone)]
pub enum MarkdownFilter {
    /// Convert with the given converter.
    Builtin(Arc<MarkdownConverter>),
    /// Convert with a caller-supplied markup engine.
    Custom(Arc<FilterFn>),
    /// Do not register the filter; templates using it fail to render.
    Disabled,
}

impl MarkdownFilter {
    pub fn builtin(converter: MarkdownConverter) -> Self {
        MarkdownFilter::Builtin(Arc::new(converter))
    }

    /// Wraps a custom markup callable.
    ///
    /// ```rust
    /// use laminate::MarkdownFilter;
    ///
    /// let shout = MarkdownFilter::custom(|text| Ok(text.to_uppercase()));
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, FilterError> + Send + Sync + 'static,
    {
        MarkdownFilter::Custom(Arc::new(f))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, MarkdownFilter::Disabled)
    }

    /// Adds the filter to `env` unless it is disabled.
    pub fn register(&self, env: &mut Environment<'static>) {
        match self {
            MarkdownFilter::Builtin(converter) => {
                let converter = Arc::clone(converter);
                env.add_filter(FILTER_NAME, move |value: Value| -> Result<Value, Error> {
                    converter
                        .convert(&value_text(&value))
                        .map(Value::from_safe_string)
                        .map_err(|e| {
                            Error::new(ErrorKind::InvalidOperation, "markdown conversion failed")
                                .with_source(e)
                        })
                });
            }
            MarkdownFilter::Custom(callable) => {
                let callable = Arc::clone(callable);
                env.add_filter(FILTER_NAME, move |value: Value| -> Result<Value, Error> {
                    callable(&value_text(&value))
                        .map(Value::from_safe_string)
                        .map_err(|e| {
                            Error::new(ErrorKind::InvalidOperation, e.to_string())
                                .with_source(CustomFilterError(e))
                        })
                });
            }
            MarkdownFilter::Disabled => {}
        }
    }
}

impl fmt::Debug for MarkdownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkdownFilter::Builtin(converter) => {
                f.debug_tuple("Builtin").field(converter).finish()
            }
            MarkdownFilter::Custom(_) => f.write_str("Custom(..)"),
            MarkdownFilter::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Carries a custom callable's error as a minijinja error source.
#[derive(Debug)]
struct CustomFilterError(FilterError);

impl fmt::Display for CustomFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for CustomFilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

fn value_text(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        return String::new();
    }
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}
