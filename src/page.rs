//! Page model: a parsed content fragment and the metadata derived from it.
//!
//! Metadata lives in the fragment itself, on elements with well-known ids:
//!
//! ```html
//! <h1>Getting Started</h1>
//! <img id="meta-share" src="/images/started/share.png">
//! <span id="meta-created">2021-03-04</span>
//! <a id="meta-redirect" href="https://new.example.com/started/"></a>
//! ```
//!
//! Every accessor runs its own query over the tree; nothing is cached.

use std::path::{Component, Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::html::{attribute, find_first_by_attribute, find_first_by_tag_name, text_content, ParsedTree};

pub const SHARE_ID: &str = "meta-share";
pub const CREATED_ID: &str = "meta-created";
pub const REDIRECT_ID: &str = "meta-redirect";

pub struct Page {
    tree: ParsedTree,
    path: PathBuf,
    rel_path: PathBuf,
    content: String,
}

impl Page {
    /// Parse `content`. `path` is the source file, `rel_path` the same file
    /// relative to the content root.
    pub fn new(content: String, path: PathBuf, rel_path: PathBuf) -> Result<Self> {
        let content = normalize_newlines(content);
        let tree = ParsedTree::parse(content.as_bytes(), &path)?;
        Ok(Self {
            tree,
            path,
            rel_path,
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rel_path(&self) -> &Path {
        &self.rel_path
    }

    /// The fragment as it was parsed.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Base file name, e.g. `roadmap.html`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Text of the first `<h1>`, or `None` when the page has no `<h1>`.
    ///
    /// An `<h1>` without any text is an authoring bug and fails the build.
    pub fn title(&self) -> Result<Option<String>> {
        let Some(h1) = find_first_by_tag_name(self.tree.root(), "h1") else {
            return Ok(None);
        };
        let title = text_content(&h1).trim().to_string();
        if title.is_empty() {
            return Err(Error::MissingRequiredContent {
                path: self.path.clone(),
                what: "<h1> has no text",
            });
        }
        Ok(Some(title))
    }

    /// `src` of the share-image element.
    pub fn share(&self) -> Option<String> {
        find_first_by_attribute(self.tree.root(), "id", SHARE_ID)
            .and_then(|img| attribute(&img, "src"))
            .filter(|src| !src.is_empty())
    }

    /// Text of the creation-date element, e.g. `2021-03-04`.
    pub fn created(&self) -> Option<String> {
        find_first_by_attribute(self.tree.root(), "id", CREATED_ID)
            .map(|span| text_content(&span).trim().to_string())
            .filter(|date| !date.is_empty())
    }

    /// Where this page forwards to, or an empty string.
    ///
    /// An explicit redirect element wins (its `href`, else its text). Without
    /// one, a URL on `redirect_base` is synthesized when that is configured.
    pub fn redirect(&self, config: &SiteConfig) -> String {
        if let Some(target) = self.explicit_redirect() {
            return target;
        }
        match &config.redirect_base {
            Some(base) if !self.is_not_found(config) => {
                let mut url = base.clone();
                url.push('/');
                if let Some(locale) = config.redirect_locale.as_deref().filter(|l| !l.is_empty()) {
                    url.push_str(locale);
                    url.push('/');
                }
                url.push_str(strip_index(&slash_path(&self.rel_path)));
                url
            }
            _ => String::new(),
        }
    }

    fn explicit_redirect(&self) -> Option<String> {
        let node = find_first_by_attribute(self.tree.root(), "id", REDIRECT_ID)?;
        attribute(&node, "href")
            .or_else(|| Some(text_content(&node)))
            .map(|target| target.trim().to_string())
            .filter(|target| !target.is_empty())
    }

    pub fn is_not_found(&self, config: &SiteConfig) -> bool {
        self.rel_path == Path::new(&config.not_found_name)
    }

    pub fn has_nav(&self, config: &SiteConfig) -> bool {
        !self.is_not_found(config)
    }

    pub fn has_feedback(&self, config: &SiteConfig) -> bool {
        self.redirect(config).is_empty() && !self.is_not_found(config)
    }
}

pub(crate) fn normalize_newlines(content: String) -> String {
    if content.contains("\r\n") {
        content.replace("\r\n", "\n")
    } else {
        content
    }
}

/// Relative path with `/` separators regardless of platform.
pub(crate) fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `guide/index.html` -> `guide/`, `index.html` -> ``.
pub(crate) fn strip_index(url_path: &str) -> &str {
    if url_path == "index.html" {
        ""
    } else {
        url_path.strip_suffix("/index.html").map_or(url_path, |dir| {
            &url_path[..dir.len() + 1]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(rel: &str, html: &str) -> Page {
        let rel = PathBuf::from(rel);
        Page::new(html.to_string(), Path::new("contents").join(&rel), rel).unwrap()
    }

    #[test]
    fn title_from_first_h1() {
        let p = page("a.html", "<h1>Getting &amp; Started</h1><h1>Other</h1>");
        assert_eq!(p.title().unwrap().as_deref(), Some("Getting & Started"));
    }

    #[test]
    fn missing_h1_is_not_an_error() {
        let p = page("a.html", "<p>plain</p>");
        assert_eq!(p.title().unwrap(), None);
    }

    #[test]
    fn empty_h1_fails() {
        let p = page("a.html", "<h1>  </h1>");
        assert!(matches!(
            p.title(),
            Err(Error::MissingRequiredContent { .. })
        ));
    }

    #[test]
    fn share_and_created() {
        let p = page(
            "blog/post.html",
            r#"<h1>Post</h1><img id="meta-share" src="/images/post.png"><span id="meta-created">2020-05-06</span>"#,
        );
        assert_eq!(p.share().as_deref(), Some("/images/post.png"));
        assert_eq!(p.created().as_deref(), Some("2020-05-06"));
        assert_eq!(p.name(), "post.html");

        let bare = page("blog/bare.html", "<h1>Bare</h1>");
        assert_eq!(bare.share(), None);
        assert_eq!(bare.created(), None);
    }

    #[test]
    fn content_is_newline_normalized() {
        let p = page("a.html", "<h1>A</h1>\r\n<p>b</p>\r\n");
        assert_eq!(p.content(), "<h1>A</h1>\n<p>b</p>\n");
    }

    #[test]
    fn explicit_redirect_href_or_text() {
        let config = SiteConfig::default();
        let href = page("a.html", r#"<a id="meta-redirect" href="https://new.example/a"></a>"#);
        assert_eq!(href.redirect(&config), "https://new.example/a");

        let text = page("b.html", r#"<span id="meta-redirect">https://new.example/b</span>"#);
        assert_eq!(text.redirect(&config), "https://new.example/b");
    }

    #[test]
    fn no_redirect_without_base() {
        let config = SiteConfig::default();
        let p = page("guide/index.html", "<h1>Guide</h1>");
        assert_eq!(p.redirect(&config), "");
        assert!(p.has_feedback(&config));
        assert!(p.has_nav(&config));
    }

    #[test]
    fn synthesized_redirect_strips_index() {
        let config = SiteConfig {
            redirect_base: Some("https://new.example".to_string()),
            redirect_locale: Some("en".to_string()),
            ..SiteConfig::default()
        };
        let dir = page("guide/started/index.html", "<h1>Started</h1>");
        assert_eq!(dir.redirect(&config), "https://new.example/en/guide/started/");

        let root = page("index.html", "<h1>Home</h1>");
        assert_eq!(root.redirect(&config), "https://new.example/en/");

        let leaf = page("guide/install.html", "<h1>Install</h1>");
        assert_eq!(leaf.redirect(&config), "https://new.example/en/guide/install.html");
        assert!(!leaf.has_feedback(&config));
        assert!(leaf.has_nav(&config));
    }

    #[test]
    fn synthesized_redirect_without_locale() {
        let config = SiteConfig {
            redirect_base: Some("https://new.example".to_string()),
            ..SiteConfig::default()
        };
        let p = page("guide/index.html", "<h1>Guide</h1>");
        assert_eq!(p.redirect(&config), "https://new.example/guide/");
    }

    #[test]
    fn not_found_page_has_no_nav_or_feedback() {
        let config = SiteConfig {
            redirect_base: Some("https://new.example".to_string()),
            ..SiteConfig::default()
        };
        let p = page("404.html", "<h1>Not Found</h1>");
        assert!(!p.has_nav(&config));
        assert!(!p.has_feedback(&config));
        assert_eq!(p.redirect(&config), "");
    }

    #[test]
    fn strip_index_only_strips_whole_segment() {
        assert_eq!(strip_index("index.html"), "");
        assert_eq!(strip_index("a/b/index.html"), "a/b/");
        assert_eq!(strip_index("a/myindex.html"), "a/myindex.html");
    }
}
