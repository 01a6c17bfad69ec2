//! Turns a content file into the HTML fragment that goes into the master
//! template.
//!
//! `.html` files are used verbatim. A `.json` file is data for the `tmpl.html`
//! sub-template next to it: the object's keys become template variables,
//! plus `Base`, the file name without extension. So `games/puzzle.json` with
//! `{"Name": "Puzzle"}` renders `games/tmpl.html` with `Base = "puzzle"` and
//! `Name = "Puzzle"`.

use serde_json::Value;
use std::{fs, io};
use tera::{Context, Tera};
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::page::normalize_newlines;
use crate::site_map::ContentFile;

/// Outcome of loading one content file.
#[derive(Debug, PartialEq, Eq)]
pub enum Loaded {
    Fragment(String),
    /// Master template, sub-template or navigation fragment.
    Structural,
    /// Not a content extension.
    Ignored,
}

pub fn load_fragment(file: &ContentFile, config: &SiteConfig) -> Result<Loaded> {
    match file.extension.as_deref() {
        Some("html") => {
            let name = file.file_name();
            if name.eq_ignore_ascii_case(&config.template_name)
                || name.eq_ignore_ascii_case(&config.nav_name)
            {
                return Ok(Loaded::Structural);
            }
            let content = fs::read_to_string(&file.path).map_err(|e| Error::io(&file.path, e))?;
            Ok(Loaded::Fragment(normalize_newlines(content)))
        }
        Some("json") => render_json(file, config).map(|html| Loaded::Fragment(normalize_newlines(html))),
        _ => Ok(Loaded::Ignored),
    }
}

fn render_json(file: &ContentFile, config: &SiteConfig) -> Result<String> {
    let dir = file.path.parent().unwrap_or(std::path::Path::new(""));
    let template_path = dir.join(&config.template_name);

    let source = match fs::read_to_string(&template_path) {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::template(
                &file.path,
                tera::Error::msg(format!("sub-template {} not found", template_path.display())),
            ));
        }
        Err(e) => return Err(Error::io(&template_path, e)),
    };

    let text = fs::read_to_string(&file.path).map_err(|e| Error::io(&file.path, e))?;
    let json_error = |message: String| Error::Json {
        path: file.path.clone(),
        message,
    };
    let mut data = match serde_json::from_str::<Value>(&text).map_err(|e| json_error(e.to_string()))? {
        Value::Object(map) => map,
        _ => return Err(json_error("expected a JSON object".to_string())),
    };

    let base = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data.insert("Base".to_string(), Value::String(base));

    let context = Context::from_value(Value::Object(data)).map_err(|e| Error::template(&file.path, e))?;

    let mut tera = Tera::default();
    tera.add_raw_template(&config.template_name, &source)
        .map_err(|e| Error::template(&template_path, e))?;
    let html = tera
        .render(&config.template_name, &context)
        .map_err(|e| Error::template(&file.path, e))?;

    debug!(
        "Rendered {} with {}",
        file.rel_path.display(),
        template_path.display()
    );
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_map::build_site_map;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn load(root: &Path, rel: &str) -> Result<Loaded> {
        let file = build_site_map(root)
            .unwrap()
            .into_iter()
            .find(|f| f.rel_path == Path::new(rel))
            .unwrap();
        load_fragment(&file, &SiteConfig::default())
    }

    #[test]
    fn html_is_verbatim_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "<h1>A</h1>\r\n<p>x</p>").unwrap();
        assert_eq!(
            load(dir.path(), "a.html").unwrap(),
            Loaded::Fragment("<h1>A</h1>\n<p>x</p>".to_string())
        );
    }

    #[test]
    fn structural_and_unknown_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tmpl.html"), "{{ Base }}").unwrap();
        fs::write(dir.path().join("nav.html"), "<ul></ul>").unwrap();
        fs::write(dir.path().join("logo.png"), [0u8, 1, 2]).unwrap();
        assert_eq!(load(dir.path(), "tmpl.html").unwrap(), Loaded::Structural);
        assert_eq!(load(dir.path(), "nav.html").unwrap(), Loaded::Structural);
        assert_eq!(load(dir.path(), "logo.png").unwrap(), Loaded::Ignored);
    }

    #[test]
    fn structural_names_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Tmpl.HTML"), "{{ Base }}").unwrap();
        fs::write(dir.path().join("NAV.HTML"), "<ul></ul>").unwrap();
        assert_eq!(load(dir.path(), "Tmpl.HTML").unwrap(), Loaded::Structural);
        assert_eq!(load(dir.path(), "NAV.HTML").unwrap(), Loaded::Structural);
    }

    #[test]
    fn json_renders_sibling_template_with_base() {
        let dir = tempfile::tempdir().unwrap();
        let games = dir.path().join("games");
        fs::create_dir_all(&games).unwrap();
        fs::write(games.join("tmpl.html"), "<h1>{{ Key }}</h1><p>{{ Base }}</p>").unwrap();
        fs::write(games.join("puzzle.json"), r#"{"Key": "Value"}"#).unwrap();

        let Loaded::Fragment(html) = load(dir.path(), "games/puzzle.json").unwrap() else {
            panic!("expected a fragment");
        };
        assert_eq!(html, "<h1>Value</h1><p>puzzle</p>");
    }

    #[test]
    fn json_undefined_field_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tmpl.html"), "{{ Missing }}").unwrap();
        fs::write(dir.path().join("x.json"), r#"{"Key": "Value"}"#).unwrap();
        assert!(matches!(
            load(dir.path(), "x.json"),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn json_without_sub_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.json"), r#"{"Key": "Value"}"#).unwrap();
        assert!(matches!(
            load(dir.path(), "x.json"),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn json_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tmpl.html"), "{{ Base }}").unwrap();
        fs::write(dir.path().join("x.json"), "[1, 2]").unwrap();
        assert!(matches!(load(dir.path(), "x.json"), Err(Error::Json { .. })));
    }
}
