//! # Laminate Markdown - Markdown to HTML for document builds
//!
//! `laminate-markdown` is the markup half of Laminate. It converts CommonMark
//! text (parsed by `pulldown-cmark`) into HTML, with a small set of extensions
//! that documents typically need:
//!
//! | Extension | Effect |
//! |-----------|--------|
//! | [`Extension::Include`] | Splices `{!path!}` directives with other files, decoded with a configurable encoding |
//! | [`Extension::Toc`] | Replaces a `[TOC]` paragraph with a nested list of headings, offsets heading ranks |
//! | [`Extension::HeaderId`] | Gives every heading a unique anchor id |
//! | [`Extension::Extra`] | Tables, footnotes, strikethrough, task lists and `{#id}` heading attributes |
//!
//! ## Quick Start
//!
//! ```rust
//! use laminate_markdown::convert;
//!
//! assert_eq!(convert("**test**", &[]).unwrap(), "<p><strong>test</strong></p>");
//! ```
//!
//! ## Fragments
//!
//! Conversions are independent. When a template converts several fragments
//! of one document separately, each fragment gets its own heading ids and its
//! own table of contents. Convert the whole document in one call when a single
//! table is needed.

pub mod converter;
mod error;
pub mod extension;
pub mod heading;
pub mod include;
pub mod toc;

pub use converter::{Document, MarkdownConverter};
pub use error::MarkdownError;
pub use extension::{
    Extension, IncludeConfig, TocConfig, DEFAULT_INCLUDE_ENCODING, DEFAULT_TOC_MARKER,
};
pub use heading::{slugify, HeadingIds};
pub use include::expand_includes;
pub use toc::TocEntry;

/// Converts `text` to HTML with the given extensions, in order.
///
/// Shorthand for building a [`MarkdownConverter`] for a single call.
pub fn convert(text: &str, extensions: &[Extension]) -> Result<String, MarkdownError> {
    MarkdownConverter::with_extensions(extensions.to_vec()).convert(text)
}
