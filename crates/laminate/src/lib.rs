//! # Laminate - Markdown Documents Through HTML Templates
//!
//! `laminate` turns a markdown-bearing template into a self-contained HTML
//! document: the input file is rendered with [MiniJinja](minijinja), usually
//! extending the bundled default layout, and the result is written to a build
//! directory together with the stylesheet, images and fonts it references.
//!
//! ## Core Concepts
//!
//! - [`Composer`]: renders one input document and materializes its build output
//! - [`TemplateSet`]: ordered template roots, custom directory before the default
//! - [`MarkdownFilter`]: the `markdown` filter available inside templates
//! - [`LaminateConfig`]: build directory, template roots, resources, variables
//!
//! ## Quick Start
//!
//! An input file such as `reports/q3/index.md`:
//!
//! ```jinja
//! {% extends "index.html" %}
//! {% block content %}
//! {% filter markdown %}
//! # Summary
//!
//! {!chapters/summary.md!}
//! {% endfilter %}
//! {% endblock %}
//! ```
//!
//! is built with:
//!
//! ```rust,ignore
//! use laminate::LaminateConfig;
//!
//! let config = LaminateConfig::new().with_variable("title", "Q3 report");
//! let output = laminate::create_html("reports/q3/index.md", config)?;
//! // build/q3/index.html, build/q3/index.css, build/q3/images/, build/q3/fonts/
//! ```
//!
//! ## Template Resolution
//!
//! `{% extends %}` and `{% include %}` names are looked up next to the input
//! file first, then in the custom template directory, then in the default
//! root (the bundled set, or the `default_templates` directory). Resources
//! are copied from the custom directory when one is configured, otherwise
//! from the default root.
//!
//! ## Layouts
//!
//! Setting [`LaminateConfig::layout`] switches to plain markdown input: the
//! whole input file is converted once and the layout renders it with
//! `{{ content }}`. The bundled `index.html` works as a layout too.
//!
//! ## Markdown
//!
//! Conversion is done by [`laminate_markdown`] with includes (`{!path!}`,
//! resolved against the input file's directory), `[TOC]` generation,
//! unique heading ids and the common extras (tables, footnotes,
//! strikethrough).

mod bundled;
mod composer;
mod config;
mod engine;
mod error;
mod filter;
mod output;
mod template_set;

use std::path::Path;

pub use bundled::{DEFAULT_TEMPLATES, DEFAULT_TEMPLATE_MARKER};
pub use composer::{document_converter, BuildOutput, Composer, OUTPUT_FILE};
pub use config::{LaminateConfig, MarkdownSettings, DEFAULT_BUILD_DIR, DEFAULT_RESOURCES};
pub use engine::build_environment;
pub use error::LaminateError;
pub use filter::{FilterError, FilterFn, MarkdownFilter, FILTER_NAME};
pub use template_set::{BundledEntries, ResolvedTemplate, Resource, TemplateRoot, TemplateSet};

// Re-export the converter crate so callers need only one dependency.
pub use laminate_markdown;

/// Builds `input_file` with `config` in one call.
///
/// Shorthand for `Composer::new(input_file, config)?.create_html()`.
pub fn create_html(
    input_file: impl AsRef<Path>,
    config: LaminateConfig,
) -> Result<BuildOutput, LaminateError> {
    Composer::new(input_file, config)?.create_html()
}
