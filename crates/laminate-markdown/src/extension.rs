//! Converter extensions and their configuration.
//!
//! Extensions are applied in the order they are listed, although the effect of
//! each one is independent of its position: include runs on the source text,
//! the others rewrite the parsed event stream.

use std::path::PathBuf;

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

/// Default encoding label for included files.
pub const DEFAULT_INCLUDE_ENCODING: &str = "iso-8859-1";

/// Default paragraph text replaced by the table of contents.
pub const DEFAULT_TOC_MARKER: &str = "[TOC]";

/// A pluggable unit adding syntax or post-processing to the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Extension {
    /// Splices `{!path!}` directives with the content of other files.
    Include(IncludeConfig),
    /// Generates a table of contents and offsets heading ranks.
    Toc(TocConfig),
    /// Assigns unique anchor ids to headings.
    HeaderId,
    /// Tables, footnotes, strikethrough, task lists and heading attributes.
    Extra,
}

impl Extension {
    /// Include extension reading from `base_path` with the default encoding.
    pub fn include(base_path: impl Into<PathBuf>) -> Self {
        Extension::Include(IncludeConfig::new(base_path))
    }

    /// Table of contents with the given base heading level.
    pub fn toc(base_level: u8) -> Self {
        Extension::Toc(TocConfig {
            base_level,
            ..TocConfig::default()
        })
    }

    pub(crate) fn parser_options(&self) -> Options {
        match self {
            Extension::Extra => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_FOOTNOTES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_HEADING_ATTRIBUTES
            }
            _ => Options::empty(),
        }
    }
}

/// Configuration for the include extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeConfig {
    /// Directory that include paths are resolved against.
    pub base_path: PathBuf,
    /// `encoding_rs` label used to decode included files.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    DEFAULT_INCLUDE_ENCODING.to_string()
}

impl IncludeConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            encoding: default_encoding(),
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

/// Configuration for the table-of-contents extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Rank given to a top-level `#` heading. A value of 2 turns `#` into
    /// `<h2>`, `##` into `<h3>`, and so on, clamped at `<h6>`.
    pub base_level: u8,
    /// Paragraph text that is replaced with the generated table.
    pub marker: String,
    /// Optional title rendered above the list.
    pub title: Option<String>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            base_level: 1,
            marker: DEFAULT_TOC_MARKER.to_string(),
            title: None,
        }
    }
}
