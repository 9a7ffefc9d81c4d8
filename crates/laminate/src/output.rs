//! Filesystem side effects of a build: writing, cleaning and copying.

use std::fs;
use std::path::Path;

use crate::error::LaminateError;
use crate::template_set::Resource;

/// Writes `content` to `path` as UTF-8, creating missing parent directories
/// and overwriting any existing file.
pub fn write_text(path: &Path, content: &str) -> Result<(), LaminateError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| LaminateError::io(parent, e))?;
        }
    }
    fs::write(path, content).map_err(|e| LaminateError::io(path, e))
}

/// Recursively removes `dir` if it exists. Returns whether anything was removed.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool, LaminateError> {
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(dir).map_err(|e| LaminateError::io(dir, e))?;
    Ok(true)
}

/// Recursively copies a directory.
///
/// Creates `dst` if needed and overwrites existing files. Symlinks and other
/// special files are skipped.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<(), LaminateError> {
    fs::create_dir_all(dst).map_err(|e| LaminateError::io(dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| LaminateError::io(src, e))? {
        let entry = entry.map_err(|e| LaminateError::io(src, e))?;
        let file_type = entry.file_type().map_err(|e| LaminateError::io(entry.path(), e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).map_err(|e| LaminateError::io(&src_path, e))?;
        }
    }

    Ok(())
}

/// Copies a resource named `name` into `dest_root`, keeping its relative name.
pub fn copy_resource(resource: &Resource, name: &str, dest_root: &Path) -> Result<(), LaminateError> {
    match resource {
        Resource::Path(src) if src.is_dir() => copy_dir(src, &dest_root.join(name)),
        Resource::Path(src) => {
            let dst = dest_root.join(name);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).map_err(|e| LaminateError::io(parent, e))?;
            }
            fs::copy(src, &dst).map_err(|e| LaminateError::io(src, e))?;
            Ok(())
        }
        Resource::Bundled(entries) => {
            for (relative, content) in entries {
                write_text(&dest_root.join(relative), content)?;
            }
            Ok(())
        }
    }
}
