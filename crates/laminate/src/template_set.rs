//! Template resolution across an ordered set of roots.
//!
//! A [`TemplateSet`] is a list of [`TemplateRoot`]s searched in order. The
//! composer builds it as:
//!
//! 1. the input file's directory, minus the input file itself
//! 2. the custom template directory, if one is configured
//! 3. the default root: the bundled set, or a directory override
//!
//! The first root containing a name wins, so a custom directory can override
//! single files (say `index.css`) and inherit everything else from the
//! default.
//!
//! Names are relative paths such as `index.html` or `report/index.html`.
//! `./index.html` and `index.html` name the same template. Names that try to
//! leave a root (`../secret`) or are absolute never resolve.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::bundled::DEFAULT_TEMPLATES;
use crate::error::LaminateError;

/// Embedded `(relative_path, content)` entries.
pub type BundledEntries = &'static [(&'static str, &'static str)];

/// One location templates and resources are looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRoot {
    /// A directory on disk.
    Dir(PathBuf),
    /// Entries compiled into the binary.
    Bundled(BundledEntries),
}

impl TemplateRoot {
    /// The bundled default template set.
    pub fn bundled() -> Self {
        TemplateRoot::Bundled(DEFAULT_TEMPLATES)
    }

    /// Human-readable location, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TemplateRoot::Dir(path) => path.display().to_string(),
            TemplateRoot::Bundled(_) => "<bundled default>".to_string(),
        }
    }

    /// Looks up a template file in this root.
    pub fn lookup(&self, name: &str) -> Option<ResolvedTemplate> {
        let relative = safe_relative(name)?;
        match self {
            TemplateRoot::Dir(root) => {
                let path = root.join(&relative);
                path.is_file().then_some(ResolvedTemplate::File(path))
            }
            TemplateRoot::Bundled(entries) => entries
                .iter()
                .find(|(entry, _)| *entry == relative)
                .map(|(_, content)| ResolvedTemplate::Bundled(*content)),
        }
    }

    /// Looks up a resource (file or folder) in this root.
    ///
    /// For bundled roots a folder is every entry below `name/`.
    pub fn resource(&self, name: &str) -> Option<Resource> {
        let relative = safe_relative(name)?;
        match self {
            TemplateRoot::Dir(root) => {
                let path = root.join(&relative);
                path.exists().then_some(Resource::Path(path))
            }
            TemplateRoot::Bundled(entries) => {
                let prefix = format!("{}/", relative);
                let found: Vec<_> = entries
                    .iter()
                    .filter(|(entry, _)| *entry == relative || entry.starts_with(&prefix))
                    .copied()
                    .collect();
                (!found.is_empty()).then_some(Resource::Bundled(found))
            }
        }
    }
}

/// Where a resolved template's source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    /// Read from disk on load.
    File(PathBuf),
    /// Compiled-in source.
    Bundled(&'static str),
}

impl ResolvedTemplate {
    /// Returns the template source, reading from disk if necessary.
    pub fn read(&self) -> Result<String, LaminateError> {
        match self {
            ResolvedTemplate::File(path) => {
                fs::read_to_string(path).map_err(|e| LaminateError::io(path, e))
            }
            ResolvedTemplate::Bundled(content) => Ok((*content).to_string()),
        }
    }
}

/// A resource found in a template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// A file or directory on disk.
    Path(PathBuf),
    /// Bundled entries, keyed by their path relative to the root.
    Bundled(Vec<(&'static str, &'static str)>),
}

/// Ordered list of template roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    roots: Vec<TemplateRoot>,
    excluded: Option<PathBuf>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a root with lower precedence than the ones already present.
    pub fn with_root(mut self, root: TemplateRoot) -> Self {
        self.roots.push(root);
        self
    }

    /// Skips `path` when it is what a directory root resolves to, so lookups
    /// fall through to the next root.
    ///
    /// The composer excludes the input file: an entry `index.html` that
    /// extends `index.html` gets the default layout, not itself.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded = Some(path.into());
        self
    }

    pub fn roots(&self) -> &[TemplateRoot] {
        &self.roots
    }

    /// Finds `name` in the first root that has it.
    ///
    /// # Errors
    ///
    /// Returns [`LaminateError::TemplateNotFound`] listing every searched root.
    pub fn resolve(&self, name: &str) -> Result<ResolvedTemplate, LaminateError> {
        for root in &self.roots {
            if let Some(resolved) = root.lookup(name) {
                if self.is_excluded(&resolved) {
                    continue;
                }
                tracing::debug!(template = name, root = %root.describe(), "resolved template");
                return Ok(resolved);
            }
        }
        Err(LaminateError::TemplateNotFound {
            name: name.to_string(),
            searched: self.roots.iter().map(TemplateRoot::describe).collect(),
        })
    }

    fn is_excluded(&self, resolved: &ResolvedTemplate) -> bool {
        match (resolved, &self.excluded) {
            (ResolvedTemplate::File(path), Some(excluded)) => path == excluded,
            _ => false,
        }
    }

    /// Resolves `name` and returns its source.
    pub fn load(&self, name: &str) -> Result<String, LaminateError> {
        self.resolve(name)?.read()
    }

    /// Loader-style lookup: `Ok(None)` when no root has the name.
    pub fn get(&self, name: &str) -> Result<Option<String>, LaminateError> {
        match self.resolve(name) {
            Ok(resolved) => resolved.read().map(Some),
            Err(LaminateError::TemplateNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Normalizes `name` to `a/b/c` form if it stays inside its root.
///
/// `.` components are dropped; `..`, absolute and empty names are rejected.
fn safe_relative(name: &str) -> Option<String> {
    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ENTRIES: BundledEntries = &[
        ("index.html", "bundled index"),
        ("images/a.svg", "<svg/>"),
        ("images/sub/b.svg", "<svg/>"),
        ("imagesque.txt", "not an image folder"),
    ];

    #[test]
    fn test_bundled_lookup() {
        let root = TemplateRoot::Bundled(ENTRIES);
        assert_eq!(
            root.lookup("index.html"),
            Some(ResolvedTemplate::Bundled("bundled index"))
        );
        assert_eq!(root.lookup("missing.html"), None);
    }

    #[test]
    fn test_bundled_folder_resource() {
        let root = TemplateRoot::Bundled(ENTRIES);
        match root.resource("images") {
            Some(Resource::Bundled(found)) => {
                let names: Vec<_> = found.iter().map(|(n, _)| *n).collect();
                assert_eq!(names, ["images/a.svg", "images/sub/b.svg"]);
            }
            other => panic!("unexpected resource {:?}", other),
        }
        assert_eq!(root.resource("fonts"), None);
    }

    #[test]
    fn test_first_root_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "custom index").unwrap();

        let set = TemplateSet::new()
            .with_root(TemplateRoot::Dir(dir.path().to_path_buf()))
            .with_root(TemplateRoot::Bundled(ENTRIES));

        assert_eq!(set.load("index.html").unwrap(), "custom index");
        assert_eq!(
            set.resolve("images/a.svg").unwrap(),
            ResolvedTemplate::Bundled("<svg/>")
        );
    }

    #[test]
    fn test_not_found_lists_roots() {
        let set = TemplateSet::new()
            .with_root(TemplateRoot::Dir(PathBuf::from("custom")))
            .with_root(TemplateRoot::Bundled(ENTRIES));

        match set.resolve("nope.html") {
            Err(LaminateError::TemplateNotFound { name, searched }) => {
                assert_eq!(name, "nope.html");
                assert_eq!(searched, ["custom", "<bundled default>"]);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(set.get("nope.html").unwrap(), None);
    }

    #[test]
    fn test_escaping_names_never_resolve() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(dir.path().join("secret.html"), "secret").unwrap();

        let root = TemplateRoot::Dir(inner);
        assert_eq!(root.lookup("../secret.html"), None);
        assert_eq!(root.resource("../secret.html"), None);
        assert_eq!(root.lookup(""), None);
    }

    #[test]
    fn test_current_dir_prefix_is_normalized() {
        let root = TemplateRoot::Bundled(ENTRIES);
        assert_eq!(
            root.lookup("./index.html"),
            Some(ResolvedTemplate::Bundled("bundled index"))
        );
        assert!(matches!(root.resource("./images/"), Some(Resource::Bundled(found)) if found.len() == 2));
        assert_eq!(root.lookup("."), None);
    }

    #[test]
    fn test_excluded_file_falls_through() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("index.html");
        fs::write(&entry, "{% extends \"index.html\" %}").unwrap();

        let set = TemplateSet::new()
            .with_root(TemplateRoot::Dir(dir.path().to_path_buf()))
            .with_root(TemplateRoot::Bundled(ENTRIES))
            .excluding(&entry);

        assert_eq!(set.load("index.html").unwrap(), "bundled index");
    }

    #[test]
    fn test_directories_are_not_templates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();
        let root = TemplateRoot::Dir(dir.path().to_path_buf());
        assert_eq!(root.lookup("images"), None);
        assert!(matches!(root.resource("images"), Some(Resource::Path(_))));
    }
}
