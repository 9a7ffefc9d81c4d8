//! Build configuration.
//!
//! [`LaminateConfig`] carries everything a build needs besides the input
//! path: where output goes, which templates to use, how markdown is
//! converted, and the free-form `variables` handed to the template.
//!
//! Configs are built in code or loaded from YAML or JSON:
//!
//! ```yaml
//! build_dir: build
//! templates_dir: templates
//! layout: report/index.html
//! markdown:
//!   include_encoding: utf-8
//!   toc_base_level: 2
//! variables:
//!   title: Quarterly report
//!   author: Ops team
//! ```
//!
//! Relative paths in a config file are resolved against the file's directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use laminate_markdown::DEFAULT_INCLUDE_ENCODING;
use serde::{Deserialize, Serialize};

use crate::error::LaminateError;

/// Resources copied next to the rendered document by default: the
/// stylesheet, then the image and font folders.
pub const DEFAULT_RESOURCES: &[&str] = &["index.css", "images", "fonts"];

/// Default build root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Configuration for a [`Composer`](crate::Composer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaminateConfig {
    /// Root under which `<input-dir-name>/index.html` is written.
    pub build_dir: PathBuf,

    /// Custom template directory, searched before the default root.
    pub templates_dir: Option<PathBuf>,

    /// Directory replacing the bundled default template set.
    pub default_templates: Option<PathBuf>,

    /// Layout template (e.g. `index.html` or `report/index.html`) rendered
    /// instead of the input file. When set, the input file is converted as
    /// one markdown document and bound as `content`.
    pub layout: Option<String>,

    /// Resource names copied from the template root after rendering.
    pub resources: Vec<String>,

    /// Remove the build output directory when resource copying fails.
    pub rollback_on_failure: bool,

    /// Markdown converter settings.
    pub markdown: MarkdownSettings,

    /// Values bound by name in the template.
    pub variables: BTreeMap<String, serde_json::Value>,
}

/// Settings for the markdown converter and template filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownSettings {
    /// Encoding label for files pulled in with `{!path!}`.
    pub include_encoding: String,

    /// Rank given to top-level headings.
    pub toc_base_level: u8,

    /// Register the `markdown` template filter.
    pub filter: bool,
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            include_encoding: DEFAULT_INCLUDE_ENCODING.to_string(),
            toc_base_level: 1,
            filter: true,
        }
    }
}

impl Default for LaminateConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            templates_dir: None,
            default_templates: None,
            layout: None,
            resources: DEFAULT_RESOURCES.iter().map(|s| s.to_string()).collect(),
            rollback_on_failure: true,
            markdown: MarkdownSettings::default(),
            variables: BTreeMap::new(),
        }
    }
}

impl LaminateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML config.
    pub fn from_yaml_str(text: &str) -> Result<Self, LaminateError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self, LaminateError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a config file, choosing the format by extension
    /// (`.yaml`, `.yml` or `.json`).
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LaminateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LaminateError::io(path, e))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => {
                return Err(LaminateError::Config(format!(
                    "unsupported config format: {}",
                    path.display()
                )))
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Resolves relative paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.build_dir = resolve(self.build_dir);
        self.templates_dir = self.templates_dir.map(resolve);
        self.default_templates = self.default_templates.map(resolve);
        self
    }

    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    pub fn with_default_templates(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_templates = Some(dir.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rollback(mut self, rollback: bool) -> Self {
        self.rollback_on_failure = rollback;
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownSettings) -> Self {
        self.markdown = markdown;
        self
    }

    /// Binds a template variable. Later bindings of the same key win.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LaminateConfig::default();
        assert_eq!(config.build_dir, PathBuf::from("build"));
        assert_eq!(config.resources, vec!["index.css", "images", "fonts"]);
        assert!(config.rollback_on_failure);
        assert_eq!(config.markdown.include_encoding, "iso-8859-1");
        assert_eq!(config.markdown.toc_base_level, 1);
        assert!(config.markdown.filter);
        assert_eq!(config.layout, None);
    }

    #[test]
    fn test_yaml_partial_config_keeps_defaults() {
        let config = LaminateConfig::from_yaml_str(
            r#"
templates_dir: custom
layout: report/index.html
markdown:
  toc_base_level: 2
variables:
  title: Report
  pages: 3
"#,
        )
        .unwrap();

        assert_eq!(config.templates_dir, Some(PathBuf::from("custom")));
        assert_eq!(config.layout.as_deref(), Some("report/index.html"));
        assert_eq!(config.markdown.toc_base_level, 2);
        assert_eq!(config.markdown.include_encoding, "iso-8859-1");
        assert_eq!(config.variables["title"], serde_json::json!("Report"));
        assert_eq!(config.variables["pages"], serde_json::json!(3));
        assert_eq!(config.build_dir, PathBuf::from("build"));
    }

    #[test]
    fn test_json_config() {
        let config =
            LaminateConfig::from_json_str(r#"{"build_dir": "out", "rollback_on_failure": false}"#)
                .unwrap();
        assert_eq!(config.build_dir, PathBuf::from("out"));
        assert!(!config.rollback_on_failure);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = LaminateConfig::from_yaml_str("build_dir: [unclosed").unwrap_err();
        assert!(matches!(err, LaminateError::Config(_)));
    }

    #[test]
    fn test_from_path_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("laminate.yaml");
        fs::write(&path, "build_dir: out\ntemplates_dir: /abs/templates\n").unwrap();

        let config = LaminateConfig::from_path(&path).unwrap();
        assert_eq!(config.build_dir, dir.path().join("out"));
        assert_eq!(config.templates_dir, Some(PathBuf::from("/abs/templates")));
    }

    #[test]
    fn test_from_path_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("laminate.toml");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            LaminateConfig::from_path(&path),
            Err(LaminateError::Config(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = LaminateConfig::from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, LaminateError::FileNotFound { .. }));
    }

    #[test]
    fn test_builder_setters() {
        let config = LaminateConfig::new()
            .with_build_dir("out")
            .with_resources(["index.css"])
            .with_variable("title", "Doc")
            .with_rollback(false);
        assert_eq!(config.build_dir, PathBuf::from("out"));
        assert_eq!(config.resources, vec!["index.css"]);
        assert_eq!(config.variables["title"], serde_json::json!("Doc"));
        assert!(!config.rollback_on_failure);
    }
}
