use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::feed::write_feed;
use crate::io::{cleanup, read_optional, read_template, write_file, MASTER_TEMPLATE};
use crate::loader::{load_fragment, Loaded};
use crate::page::{normalize_newlines, slash_path, strip_index, Page};
use crate::site_map::{build_site_map, ContentFile};

/// What a build did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    /// Structural files and files with other extensions.
    pub skipped: usize,
    /// Stale pages deleted before generating.
    pub removed: usize,
    pub feed: Option<PathBuf>,
}

/// Variables handed to the master template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PageData<'a> {
    title: String,
    desc: &'a str,
    content: &'a str,
    share: String,
    canonical: String,
    nav_exists: bool,
    sub_nav: String,
    feedback: bool,
    redirect: String,
}

/// Regenerate the whole site: clean stale pages, then render every content
/// file into the master template. The first failing page aborts the build.
///
/// The configuration is validated first, so a trailing slash on `url` is
/// dropped before any URL is composed.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let mut config = config.clone();
    config.validate()?;
    let config = &config;

    let tera = read_template(&config.template)?;

    let mut report = BuildReport {
        removed: cleanup(&config.output_dir, &config.reserved_prefix)?,
        ..BuildReport::default()
    };

    let files = build_site_map(&config.content_dir)?;
    info!(
        "Identified {} files under {}",
        files.len(),
        config.content_dir.display()
    );

    for file in &files {
        if render_file(&tera, config, file)? {
            report.pages += 1;
        } else {
            report.skipped += 1;
        }
    }

    if let Some(feed) = &config.feed {
        report.feed = write_feed(config, feed)?;
    }

    info!(
        "Generated {} pages into {}",
        report.pages,
        config.output_dir.display()
    );
    Ok(report)
}

/// Render one content file. Returns `false` when the file is not a page.
fn render_file(tera: &Tera, config: &SiteConfig, file: &ContentFile) -> Result<bool> {
    let content = match load_fragment(file, config)? {
        Loaded::Fragment(content) => content,
        other => {
            debug!("Skipped ({:?}): {}", other, file.rel_path.display());
            return Ok(false);
        }
    };

    let page = Page::new(content, file.path.clone(), file.rel_path.clone())?;
    let rel_out = file.rel_path.with_extension("html");

    let nav_path = file
        .path
        .parent()
        .unwrap_or(Path::new(""))
        .join(&config.nav_name);
    let sub_nav = read_optional(&nav_path)?
        .map(normalize_newlines)
        .unwrap_or_default();

    let data = PageData {
        title: page_title(&page, &rel_out, config)?,
        desc: &config.description,
        content: page.content(),
        share: share_url(&page, config),
        canonical: canonical_url(&rel_out, config),
        nav_exists: page.has_nav(config),
        sub_nav,
        feedback: page.has_feedback(config),
        redirect: page.redirect(config),
    };

    let context = Context::from_serialize(&data).map_err(|e| Error::template(&file.path, e))?;
    let html = tera
        .render(MASTER_TEMPLATE, &context)
        .map_err(|e| Error::template(&file.path, e))?;

    write_file(&config.output_dir.join(&rel_out), html.as_bytes())?;
    debug!("Converted: {} -> {}", file.rel_path.display(), rel_out.display());
    Ok(true)
}

/// The root index always gets the default title. Other pages use their
/// `<h1>`, or the default title without one.
pub fn page_title(page: &Page, rel_out: &Path, config: &SiteConfig) -> Result<String> {
    if rel_out == Path::new("index.html") {
        return Ok(config.default_title.clone());
    }
    Ok(match page.title()? {
        Some(title) => format!("{} - {}", title, config.title_suffix),
        None => config.default_title.clone(),
    })
}

/// Absolute share image URL.
pub fn share_url(page: &Page, config: &SiteConfig) -> String {
    match page.share() {
        Some(src) if src.starts_with("http://") || src.starts_with("https://") => src,
        Some(src) if src.starts_with('/') => format!("{}{}", config.url, src),
        Some(src) => format!("{}/{}", config.url, src),
        None => format!("{}{}", config.url, config.share_image),
    }
}

/// Canonical URL for an output path relative to the output root.
///
/// Empty for the not-found page, the bare site URL for the root index, and
/// directory-style (`.../guide/`) for other index pages.
pub fn canonical_url(rel_out: &Path, config: &SiteConfig) -> String {
    if rel_out == Path::new(&config.not_found_name) {
        return String::new();
    }
    if rel_out == Path::new("index.html") {
        return config.url.clone();
    }
    format!("{}/{}", config.url, strip_index(&slash_path(rel_out)))
}
