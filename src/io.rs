use std::{fs, io, path::Path};
use tera::Tera;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Install the global tracing subscriber.
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting
/// to info.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Name the master template is registered under.
pub const MASTER_TEMPLATE: &str = "master.html";

/// Load and compile the master template.
pub fn read_template(template_path: &Path) -> Result<Tera> {
    debug!("Reading master template from {}", template_path.display());

    let source = fs::read_to_string(template_path).map_err(|e| Error::io(template_path, e))?;
    let mut tera = Tera::default();
    tera.add_raw_template(MASTER_TEMPLATE, &source)
        .map_err(|e| Error::template(template_path, e))?;
    Ok(tera)
}

/// Read a file that may legitimately be absent.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

/// Delete generated `.html` files under `output_root`.
///
/// Files whose name starts with `reserved_prefix` are hand-written and kept.
/// A missing output root has nothing to clean. Returns the number of files
/// removed.
pub fn cleanup(output_root: &Path, reserved_prefix: &str) -> Result<usize> {
    if !output_root.exists() {
        return Ok(0);
    }

    fn traverse(dir: &Path, reserved_prefix: &str, removed: &mut usize) -> Result<()> {
        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

            if file_type.is_dir() {
                traverse(&path, reserved_prefix, removed)?;
                continue;
            }
            if path.extension().map_or(true, |ext| ext != "html") {
                continue;
            }
            let name = entry.file_name();
            if !reserved_prefix.is_empty() && name.to_string_lossy().starts_with(reserved_prefix) {
                continue;
            }
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            *removed += 1;
        }
        Ok(())
    }

    let mut removed = 0;
    traverse(output_root, reserved_prefix, &mut removed)?;
    info!("Removed {} stale pages from {}", removed, output_root.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_keeps_reserved_and_non_html() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path();
        fs::create_dir_all(out.join("guide")).unwrap();
        fs::write(out.join("index.html"), "old").unwrap();
        fs::write(out.join("guide/start.html"), "old").unwrap();
        fs::write(out.join("_redirects.html"), "keep").unwrap();
        fs::write(out.join("guide/_infra.html"), "keep").unwrap();
        fs::write(out.join("style.css"), "keep").unwrap();

        let removed = cleanup(out, "_").unwrap();

        assert_eq!(removed, 2);
        assert!(!out.join("index.html").exists());
        assert!(!out.join("guide/start.html").exists());
        assert!(out.join("_redirects.html").exists());
        assert!(out.join("guide/_infra.html").exists());
        assert!(out.join("style.css").exists());
    }

    #[test]
    fn cleanup_of_missing_root_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup(&dir.path().join("_site"), "_").unwrap(), 0);
    }

    #[test]
    fn read_optional_distinguishes_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.html");
        assert_eq!(read_optional(&path).unwrap(), None);
        fs::write(&path, "<ul></ul>").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("<ul></ul>"));
    }

    #[test]
    fn write_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.html");
        write_file(&path, b"x").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }

    #[test]
    fn bad_master_template_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmpl.html");
        fs::write(&path, "{% if %}").unwrap();
        assert!(matches!(read_template(&path), Err(Error::Template { .. })));
    }
}
