use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Command line arguments, as parsed by clap.
///
/// Every field except `verbose` is an override on top of [`SiteConfig`].
#[derive(Debug, Default)]
pub struct Args {
    pub content: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Everything the renderer needs to know about the site.
///
/// Passed explicitly into [`crate::processing::build_site`], so several
/// isolated builds can run in one process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public root URL, without a trailing slash.
    pub url: String,
    pub description: String,
    /// Title for the root index page and for pages without an `<h1>`.
    pub default_title: String,
    /// Appended to page titles: `"<h1> - <suffix>"`.
    pub title_suffix: String,
    /// Site-relative path of the fallback share image.
    pub share_image: String,
    pub content_dir: PathBuf,
    /// Master template wrapping every page.
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// Base name of the master template and of per-directory sub-templates.
    pub template_name: String,
    /// Base name of per-directory navigation fragments.
    pub nav_name: String,
    /// Base name of the page served for unknown URLs.
    pub not_found_name: String,
    /// Output files starting with this prefix survive cleanup.
    pub reserved_prefix: String,
    /// When set, pages without an explicit redirect forward to this site.
    pub redirect_base: Option<String>,
    /// Path segment inserted after `redirect_base`, e.g. `en`.
    pub redirect_locale: Option<String>,
    pub feed: Option<FeedConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            description: String::new(),
            default_title: "Documentation".to_string(),
            title_suffix: "Documentation".to_string(),
            share_image: "/images/share.png".to_string(),
            content_dir: PathBuf::from("contents"),
            template: PathBuf::from("tmpl.html"),
            output_dir: PathBuf::from("_site"),
            template_name: "tmpl.html".to_string(),
            nav_name: "nav.html".to_string(),
            not_found_name: "404.html".to_string(),
            reserved_prefix: "_".to_string(),
            redirect_base: None,
            redirect_locale: None,
            feed: None,
        }
    }
}

/// Atom feed settings for the blog directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Content subdirectory holding the posts.
    pub dir: String,
    pub title: String,
    pub author_name: String,
    pub author_uri: String,
    pub author_email: String,
    /// Offset applied to post dates, which carry no time of day.
    pub utc_offset_hours: i32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            dir: "blog".to_string(),
            title: "Blog".to_string(),
            author_name: String::new(),
            author_uri: String::new(),
            author_email: String::new(),
            utc_offset_hours: 9,
        }
    }
}

impl SiteConfig {
    /// Read a JSON configuration file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the configuration for a run: config file first, then flags.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(content) = &args.content {
            config.content_dir = content.clone();
        }
        if let Some(template) = &args.template {
            config.template = template.clone();
        }
        if let Some(output) = &args.output {
            config.output_dir = output.clone();
        }
        if let Some(url) = &args.url {
            config.url = url.clone();
        }
        if let Some(description) = &args.description {
            config.description = description.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Normalize and check values that would otherwise fail mid-build.
    pub fn validate(&mut self) -> Result<()> {
        self.url = self.url.trim_end_matches('/').to_string();
        if let Some(base) = &mut self.redirect_base {
            *base = base.trim_end_matches('/').to_string();
        }

        if self.template_name.is_empty() || self.nav_name.is_empty() {
            return Err(Error::Config(
                "template_name and nav_name must not be empty".to_string(),
            ));
        }
        if let Some(feed) = &self.feed {
            if !(-23..=23).contains(&feed.utc_offset_hours) {
                return Err(Error::Config(format!(
                    "feed.utc_offset_hours out of range: {}",
                    feed.utc_offset_hours
                )));
            }
        }
        Ok(())
    }
}
