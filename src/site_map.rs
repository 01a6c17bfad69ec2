use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// A file found under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub path: PathBuf,
    /// Relative to the content root.
    pub rel_path: PathBuf,
    /// Lowercase extension without the dot, if any.
    pub extension: Option<String>,
}

impl ContentFile {
    fn new(path: PathBuf, content_root: &Path) -> Self {
        let rel_path = pathdiff::diff_paths(&path, content_root).unwrap_or_else(|| path.clone());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        Self {
            path,
            rel_path,
            extension,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Every file under `content_root`, depth first, siblings in name order.
/// Hidden directories are skipped. Symlinked directories are not followed.
pub fn build_site_map(content_root: &Path) -> Result<Vec<ContentFile>> {
    let mut files = Vec::new();

    fn traverse(dir: &Path, content_root: &Path, files: &mut Vec<ContentFile>) -> Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
            entries.push((entry.path(), file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, file_type) in entries {
            if file_type.is_dir() {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    if name.starts_with('.') {
                        continue;
                    }
                }
                traverse(&path, content_root, files)?;
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(ContentFile::new(path, content_root));
            }
        }
        Ok(())
    }

    traverse(content_root, content_root, &mut files)?;
    Ok(files)
}
