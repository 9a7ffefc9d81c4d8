//! Error types for document builds.
//!
//! [`LaminateError`] covers every failure of the build pipeline. None of them
//! are caught inside the composer: each one ends the invocation and surfaces
//! to the caller unchanged.

use std::io;
use std::path::PathBuf;

use laminate_markdown::MarkdownError;

/// Error type for template composition and build operations.
#[derive(Debug, thiserror::Error)]
pub enum LaminateError {
    /// The input document, or a file it includes, does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A configured template directory does not exist.
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Cleaning the build output directory would delete `protected`
    /// (the input directory or a template directory).
    #[error(
        "build output {} would remove {}; choose another build_dir",
        output.display(),
        protected.display()
    )]
    BuildDirConflict { output: PathBuf, protected: PathBuf },

    /// No root in the template set contains the requested template.
    #[error("template not found: \"{name}\" (searched {})", searched.join(", "))]
    TemplateNotFound { name: String, searched: Vec<String> },

    /// A resource named for copying is missing from the template root.
    #[error("resource not found: \"{name}\" in {root}")]
    ResourceNotFound { name: String, root: String },

    /// Template syntax or rendering failure.
    #[error("template error: {0}")]
    Template(#[source] minijinja::Error),

    /// Markdown conversion failure other than a missing file.
    #[error(transparent)]
    Markdown(MarkdownError),

    /// Filesystem failure while reading, writing or copying.
    #[error("I/O error at \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl LaminateError {
    /// Wraps an I/O failure on `path`, mapping "not found" to [`FileNotFound`](Self::FileNotFound).
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            LaminateError::FileNotFound { path }
        } else {
            LaminateError::Io { path, source }
        }
    }
}

impl From<minijinja::Error> for LaminateError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        // A missing include inside a `markdown` filter block is still a missing file.
        if let Some(MarkdownError::FileNotFound { path }) = find_source::<MarkdownError>(&err) {
            return LaminateError::FileNotFound { path: path.clone() };
        }

        match err.kind() {
            ErrorKind::TemplateNotFound => LaminateError::TemplateNotFound {
                name: missing_template_name(&err),
                searched: Vec::new(),
            },
            _ => LaminateError::Template(err),
        }
    }
}

/// Pulls the quoted template name out of MiniJinja's not-found detail.
fn missing_template_name(err: &minijinja::Error) -> String {
    let detail = err.detail().unwrap_or_default();
    let mut parts = detail.split('"');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(name), Some(_)) => name.to_string(),
        _ => detail.to_string(),
    }
}

fn find_source<'a, T: std::error::Error + 'static>(
    err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a T> {
    let mut current = err.source();
    while let Some(source) = current {
        if let Some(found) = source.downcast_ref::<T>() {
            return Some(found);
        }
        current = source.source();
    }
    None
}

impl From<MarkdownError> for LaminateError {
    fn from(err: MarkdownError) -> Self {
        match err {
            MarkdownError::FileNotFound { path } => LaminateError::FileNotFound { path },
            other => LaminateError::Markdown(other),
        }
    }
}

impl From<serde_yaml::Error> for LaminateError {
    fn from(err: serde_yaml::Error) -> Self {
        LaminateError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LaminateError {
    fn from(err: serde_json::Error) -> Self {
        LaminateError::Config(err.to_string())
    }
}
