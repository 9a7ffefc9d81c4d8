//! Template composition and the build pipeline.
//!
//! A [`Composer`] is built once per input document. By default the input file
//! is itself the entry template: it is rendered with MiniJinja, usually
//! extending the default `index.html` and converting markdown with the
//! `markdown` filter.
//!
//! With a configured `layout`, the input file is plain markdown instead. It
//! is converted in one piece and the layout template renders it through the
//! `content` binding, so a `[TOC]` covers the whole document.
//!
//! ```text
//! create_html()
//! ├── clean_build_dir()      remove <build_dir>/<input-dir-name>/
//! ├── render()               entry template + markdown filter + variables
//! ├── write()                <build_dir>/<input-dir-name>/index.html
//! └── copy_resources()       index.css, images/, fonts/ from the template root
//! ```
//!
//! Every step is a blocking filesystem call. Two composers must not build into
//! the same directory at the same time.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use laminate_markdown::{Extension, IncludeConfig, MarkdownConverter, TocConfig};
use minijinja::{context, Value};

use crate::config::{LaminateConfig, MarkdownSettings};
use crate::engine::build_environment;
use crate::error::LaminateError;
use crate::filter::MarkdownFilter;
use crate::output;
use crate::template_set::{ResolvedTemplate, TemplateRoot, TemplateSet};

/// File name of the rendered document inside the build output directory.
pub const OUTPUT_FILE: &str = "index.html";

/// Output directory name used when the input directory has no name (`/`).
const FALLBACK_OUTPUT_NAME: &str = "document";

/// Namespace the input file is registered under in the environment, so an
/// entry named `index.html` can extend the layout `index.html`.
const ENTRY_PREFIX: &str = "@entry/";

/// Paths produced by [`Composer::create_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// The rendered document.
    pub html: PathBuf,
    /// Directory the resources were copied into.
    pub resources: PathBuf,
}

/// Renders one input document and materializes its build output.
///
/// # Example
///
/// ```rust,ignore
/// use laminate::{Composer, LaminateConfig};
///
/// let config = LaminateConfig::new()
///     .with_build_dir("build")
///     .with_variable("title", "Quarterly report");
///
/// // reports/q3/index.md → build/q3/index.html
/// let output = Composer::new("reports/q3/index.md", config)?.create_html()?;
/// println!("wrote {}", output.html.display());
/// ```
#[derive(Debug, Clone)]
pub struct Composer {
    input_file: PathBuf,
    input_dir: PathBuf,
    entry_name: String,
    build_output: PathBuf,
    template_set: TemplateSet,
    template_root: TemplateRoot,
    converter: Arc<MarkdownConverter>,
    filter: MarkdownFilter,
    config: LaminateConfig,
}

impl Composer {
    /// Resolves paths and template roots for `input_file`.
    ///
    /// Templates are looked up in the input file's directory first, then in
    /// the custom template directory, then in the default root. The input file
    /// itself is never found through that lookup, so `index.html` may extend
    /// the default `index.html`.
    ///
    /// Nothing is read or written yet; a missing input file is reported by
    /// [`render`](Self::render) and [`parse_markdown`](Self::parse_markdown).
    ///
    /// # Errors
    ///
    /// - [`LaminateError::FileNotFound`] if `input_file` has no file name
    /// - [`LaminateError::DirectoryNotFound`] if a configured template directory is missing
    /// - [`LaminateError::BuildDirConflict`] if cleaning the build output would
    ///   delete the input directory or a template directory
    pub fn new(input_file: impl AsRef<Path>, config: LaminateConfig) -> Result<Self, LaminateError> {
        let input_file = input_file.as_ref().to_path_buf();
        let entry_name = input_file
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| LaminateError::FileNotFound {
                path: input_file.clone(),
            })?;

        let input_dir = match input_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let build_output = config.build_dir.join(output_dir_name(&input_dir)?);

        let protected = [
            Some(&input_dir),
            config.templates_dir.as_ref(),
            config.default_templates.as_ref(),
        ];
        for dir in protected.into_iter().flatten() {
            ensure_outside(&build_output, dir)?;
        }

        let default_root = match &config.default_templates {
            Some(dir) => TemplateRoot::Dir(existing_dir(dir)?),
            None => TemplateRoot::bundled(),
        };
        let custom_root = match &config.templates_dir {
            Some(dir) => Some(TemplateRoot::Dir(existing_dir(dir)?)),
            None => None,
        };

        let mut template_set = TemplateSet::new()
            .with_root(TemplateRoot::Dir(input_dir.clone()))
            .excluding(input_dir.join(&entry_name));
        if let Some(custom) = &custom_root {
            template_set = template_set.with_root(custom.clone());
        }
        template_set = template_set.with_root(default_root.clone());
        let template_root = custom_root.unwrap_or(default_root);

        let converter = Arc::new(document_converter(&input_dir, &config.markdown));
        let filter = if config.markdown.filter {
            MarkdownFilter::Builtin(Arc::clone(&converter))
        } else {
            MarkdownFilter::Disabled
        };

        tracing::debug!(
            input = %input_file.display(),
            output = %build_output.display(),
            template_root = %template_root.describe(),
            "composer configured"
        );

        Ok(Self {
            input_file,
            input_dir,
            entry_name,
            build_output,
            template_set,
            template_root,
            converter,
            filter,
            config,
        })
    }

    /// Replaces the `markdown` filter, e.g. with a custom markup engine or
    /// [`MarkdownFilter::Disabled`].
    pub fn with_filter(mut self, filter: MarkdownFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// `<build_dir>/<input-dir-name>`.
    pub fn build_output_dir(&self) -> &Path {
        &self.build_output
    }

    pub fn template_set(&self) -> &TemplateSet {
        &self.template_set
    }

    /// Root resources are copied from: the custom directory if configured,
    /// otherwise the default root.
    pub fn template_root(&self) -> &TemplateRoot {
        &self.template_root
    }

    pub fn converter(&self) -> &MarkdownConverter {
        &self.converter
    }

    pub fn filter(&self) -> &MarkdownFilter {
        &self.filter
    }

    pub fn config(&self) -> &LaminateConfig {
        &self.config
    }

    /// Locates `name` in the template set, custom root first.
    pub fn resolve(&self, name: &str) -> Result<ResolvedTemplate, LaminateError> {
        self.template_set.resolve(name)
    }

    /// Locates `name` and returns its source.
    pub fn load_template(&self, name: &str) -> Result<String, LaminateError> {
        self.template_set.load(name)
    }

    /// Converts the whole input file as markdown.
    ///
    /// Unlike the `markdown` filter, the converter sees the entire document
    /// here, so a `[TOC]` marker covers every heading.
    pub fn parse_markdown(&self) -> Result<String, LaminateError> {
        let text = self.read_input()?;
        Ok(self.converter.convert(&text)?)
    }

    /// Renders the document.
    ///
    /// Without a layout the input file is the entry template. With one, the
    /// layout is rendered and the input file, converted by
    /// [`parse_markdown`](Self::parse_markdown), is bound as `content`.
    /// The configured variables are bound by name in both cases; `content`
    /// shadows a variable of the same name.
    pub fn render(&self) -> Result<String, LaminateError> {
        match &self.config.layout {
            Some(layout) => self.render_layout(layout),
            None => self.render_entry(),
        }
    }

    fn render_entry(&self) -> Result<String, LaminateError> {
        let source = self.read_input()?;
        let name = format!("{}{}", ENTRY_PREFIX, self.entry_name);

        let mut env = build_environment(&self.template_set, &self.filter);
        env.add_template_owned(name.clone(), source)
            .map_err(|e| self.template_error(e))?;

        let template = env.get_template(&name).map_err(|e| self.template_error(e))?;
        template
            .render(&self.config.variables)
            .map_err(|e| self.template_error(e))
    }

    fn render_layout(&self, layout: &str) -> Result<String, LaminateError> {
        let content = self.parse_markdown()?;
        let env = build_environment(&self.template_set, &self.filter);

        let template = env.get_template(layout).map_err(|e| self.template_error(e))?;
        let ctx = context! {
            content => Value::from_safe_string(content),
            ..Value::from_serialize(&self.config.variables)
        };
        template.render(ctx).map_err(|e| self.template_error(e))
    }

    /// Writes `content` to `path`, creating parent directories as needed and
    /// replacing any existing file.
    pub fn write(&self, content: &str, path: impl AsRef<Path>) -> Result<(), LaminateError> {
        output::write_text(path.as_ref(), content)
    }

    /// Removes the build output directory if it exists.
    pub fn clean_build_dir(&self) -> Result<(), LaminateError> {
        if output::remove_dir_if_exists(&self.build_output)? {
            tracing::debug!(dir = %self.build_output.display(), "removed previous build output");
        }
        Ok(())
    }

    /// Copies each named resource from the template root into the build
    /// output directory, directories recursively.
    ///
    /// # Errors
    ///
    /// Stops at the first missing resource with [`LaminateError::ResourceNotFound`];
    /// resources copied before it stay in place.
    pub fn copy_resources<S: AsRef<str>>(&self, names: &[S]) -> Result<(), LaminateError> {
        for name in names {
            let name = name.as_ref();
            let resource =
                self.template_root
                    .resource(name)
                    .ok_or_else(|| LaminateError::ResourceNotFound {
                        name: name.to_string(),
                        root: self.template_root.describe(),
                    })?;
            output::copy_resource(&resource, name, &self.build_output)?;
            tracing::debug!(resource = name, "copied resource");
        }
        Ok(())
    }

    /// Runs the full build: clean, render, write `index.html`, copy resources.
    ///
    /// If copying resources fails and `rollback_on_failure` is set, the
    /// partially written build output directory is removed before the error
    /// is returned.
    pub fn create_html(&self) -> Result<BuildOutput, LaminateError> {
        tracing::info!(
            input = %self.input_file.display(),
            output = %self.build_output.display(),
            "building document"
        );

        self.clean_build_dir()?;
        let html = self.render()?;
        let html_path = self.build_output.join(OUTPUT_FILE);
        self.write(&html, &html_path)?;

        if let Err(err) = self.copy_resources(&self.config.resources) {
            if self.config.rollback_on_failure {
                tracing::warn!(
                    dir = %self.build_output.display(),
                    error = %err,
                    "resource copy failed, removing partial build output"
                );
                if let Err(cleanup) = output::remove_dir_if_exists(&self.build_output) {
                    tracing::warn!(error = %cleanup, "rollback failed");
                }
            }
            return Err(err);
        }

        tracing::info!(html = %html_path.display(), "document built");
        Ok(BuildOutput {
            html: html_path,
            resources: self.build_output.clone(),
        })
    }

    fn read_input(&self) -> Result<String, LaminateError> {
        fs::read_to_string(&self.input_file).map_err(|e| LaminateError::io(&self.input_file, e))
    }

    fn template_error(&self, err: minijinja::Error) -> LaminateError {
        match LaminateError::from(err) {
            LaminateError::TemplateNotFound { name, .. } => LaminateError::TemplateNotFound {
                name,
                searched: self
                    .template_set
                    .roots()
                    .iter()
                    .map(TemplateRoot::describe)
                    .collect(),
            },
            other => other,
        }
    }
}

/// Builds the converter used by both the filter and [`Composer::parse_markdown`].
///
/// Includes resolve against the input directory.
pub fn document_converter(input_dir: &Path, settings: &MarkdownSettings) -> MarkdownConverter {
    MarkdownConverter::with_extensions(vec![
        Extension::Include(
            IncludeConfig::new(input_dir).with_encoding(settings.include_encoding.clone()),
        ),
        Extension::Toc(TocConfig {
            base_level: settings.toc_base_level,
            ..TocConfig::default()
        }),
        Extension::Extra,
        Extension::HeaderId,
    ])
}

fn output_dir_name(input_dir: &Path) -> Result<String, LaminateError> {
    Ok(normalized_absolute(input_dir)?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_string()))
}

/// Fails if removing `output` would also remove `protected`.
fn ensure_outside(output: &Path, protected: &Path) -> Result<(), LaminateError> {
    if normalized_absolute(protected)?.starts_with(normalized_absolute(output)?) {
        return Err(LaminateError::BuildDirConflict {
            output: output.to_path_buf(),
            protected: protected.to_path_buf(),
        });
    }
    Ok(())
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn normalized_absolute(path: &Path) -> Result<PathBuf, LaminateError> {
    let absolute = std::path::absolute(path).map_err(|e| LaminateError::io(path, e))?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

fn existing_dir(dir: &Path) -> Result<PathBuf, LaminateError> {
    if dir.is_dir() {
        Ok(dir.to_path_buf())
    } else {
        Err(LaminateError::DirectoryNotFound {
            path: dir.to_path_buf(),
        })
    }
}
