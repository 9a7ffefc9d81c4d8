//! The include extension.
//!
//! Directives of the form `{!relative/path.md!}` are replaced with the raw
//! content of the named file before the markdown is parsed. Paths resolve
//! against [`IncludeConfig::base_path`], not against the including file, and
//! included text is expanded recursively.

use std::fs;
use std::path::PathBuf;

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MarkdownError;
use crate::extension::IncludeConfig;

static INCLUDE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{!\s*(.+?)\s*!\}").expect("include directive pattern is valid"));

/// Expands every include directive in `text`.
///
/// # Errors
///
/// - [`MarkdownError::UnknownEncoding`] if the configured label is not recognized
/// - [`MarkdownError::FileNotFound`] if an included file is missing
/// - [`MarkdownError::IncludeCycle`] if a file ends up including itself
pub fn expand_includes(text: &str, config: &IncludeConfig) -> Result<String, MarkdownError> {
    let encoding = Encoding::for_label(config.encoding.as_bytes())
        .ok_or_else(|| MarkdownError::UnknownEncoding(config.encoding.clone()))?;
    let mut stack = Vec::new();
    expand(text, config, encoding, &mut stack)
}

fn expand(
    text: &str,
    config: &IncludeConfig,
    encoding: &'static Encoding,
    stack: &mut Vec<PathBuf>,
) -> Result<String, MarkdownError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INCLUDE_DIRECTIVE.captures_iter(text) {
        let (whole, relative) = match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(relative)) => (whole, relative.as_str()),
            _ => continue,
        };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let path = config.base_path.join(relative);
        let bytes = fs::read(&path).map_err(|e| MarkdownError::from_io(&path, e))?;
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if stack.contains(&key) {
            return Err(MarkdownError::IncludeCycle { path });
        }

        let (decoded, _, malformed) = encoding.decode(&bytes);
        if malformed {
            tracing::warn!(
                path = %path.display(),
                encoding = encoding.name(),
                "included file contains malformed sequences"
            );
        }
        tracing::debug!(path = %path.display(), "including file");

        stack.push(key);
        let expanded = expand(&decoded, config, encoding, stack)?;
        stack.pop();

        out.push_str(expanded.trim_end_matches(|c| c == '\n' || c == '\r'));
    }

    out.push_str(&text[last..]);
    Ok(out)
}
