//! Atom feed for the blog directory.
//!
//! Posts are the `.html` pages directly inside the feed directory. Each one
//! carries its date in `<span id="meta-created">YYYY-MM-DD</span>`.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::{FeedConfig, SiteConfig};
use crate::error::{Error, Result};
use crate::io::write_file;
use crate::page::Page;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

struct Post {
    page: Page,
    title: String,
    created: NaiveDate,
}

/// Build `<output>/<dir>/feed.xml`. Returns the written path, or `None` when
/// the directory has no dated posts.
pub fn write_feed(config: &SiteConfig, feed: &FeedConfig) -> Result<Option<PathBuf>> {
    let offset = feed
        .utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            Error::Config(format!(
                "feed.utc_offset_hours out of range: {}",
                feed.utc_offset_hours
            ))
        })?;
    let out_path = config.output_dir.join(&feed.dir).join("feed.xml");

    let mut posts = collect_posts(config, feed)?;
    if posts.is_empty() {
        warn!("No dated posts in {}, feed not written", feed.dir);
        return Ok(None);
    }
    posts.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| a.page.name().cmp(&b.page.name()))
    });

    let base = format!("{}/{}/", config.url, feed.dir.trim_matches('/'));
    let mut xml = FeedXml::new(&out_path);

    xml.decl()?;
    xml.start("feed", &[("xmlns", ATOM_NS)])?;
    xml.text_element("title", &feed.title)?;
    xml.text_element("id", &base)?;
    xml.empty("link", &[("rel", "self"), ("href", format!("{base}feed.xml").as_str())])?;
    xml.text_element("updated", &timestamp(posts[0].created, offset, &out_path)?)?;
    xml.author(feed)?;

    for post in &posts {
        let href = format!("{base}{}", post.page.name());
        let date = timestamp(post.created, offset, post.page.path())?;

        xml.start("entry", &[])?;
        xml.text_element("title", &post.title)?;
        xml.text_element("id", &href)?;
        xml.empty("link", &[("rel", "alternate"), ("href", href.as_str())])?;
        xml.text_element("published", &date)?;
        xml.text_element("updated", &date)?;
        xml.author(feed)?;
        xml.start("content", &[("type", "html")])?;
        xml.text(post.page.content())?;
        xml.end("content")?;
        xml.end("entry")?;
    }
    xml.end("feed")?;

    write_file(&out_path, &xml.finish())?;
    info!("Wrote feed with {} entries to {}", posts.len(), out_path.display());
    Ok(Some(out_path))
}

fn collect_posts(config: &SiteConfig, feed: &FeedConfig) -> Result<Vec<Post>> {
    let dir = config.content_dir.join(&feed.dir);
    let mut paths = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))? {
        let entry = entry.map_err(|e| Error::io(&dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut posts = Vec::new();
    for path in paths {
        let is_html = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if !is_html || !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.eq_ignore_ascii_case("index.html")
            || name.eq_ignore_ascii_case(&config.nav_name)
            || name.eq_ignore_ascii_case(&config.template_name)
        {
            continue;
        }

        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let rel_path = Path::new(&feed.dir).join(&name);
        let page = Page::new(text, path.clone(), rel_path)?;

        let Some(created) = page.created() else {
            warn!("Skipping {} in feed: no creation date", path.display());
            continue;
        };
        let created = NaiveDate::parse_from_str(&created, "%Y-%m-%d").map_err(|e| {
            Error::feed(&path, format!("invalid creation date {created:?}: {e}"))
        })?;
        let title = page.title()?.ok_or_else(|| Error::MissingRequiredContent {
            path: path.clone(),
            what: "feed entry has no <h1>",
        })?;

        posts.push(Post {
            page,
            title,
            created,
        });
    }
    Ok(posts)
}

/// Midnight of `date` in `offset`, as RFC 3339.
fn timestamp(date: NaiveDate, offset: FixedOffset, path: &Path) -> Result<String> {
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| Error::feed(path, format!("cannot place {date} in {offset}")))
}

/// Thin wrapper over the quick-xml writer that tags errors with the feed path.
struct FeedXml<'a> {
    writer: Writer<Vec<u8>>,
    path: &'a Path,
}

impl<'a> FeedXml<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            path,
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::feed(self.path, e))
    }

    fn decl(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut tag = BytesStart::new(name);
        for &attr in attrs {
            tag.push_attribute(attr);
        }
        self.write(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut tag = BytesStart::new(name);
        for &attr in attrs {
            tag.push_attribute(attr);
        }
        self.write(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    fn author(&mut self, feed: &FeedConfig) -> Result<()> {
        self.start("author", &[])?;
        self.text_element("name", &feed.author_name)?;
        if !feed.author_uri.is_empty() {
            self.text_element("uri", &feed.author_uri)?;
        }
        if !feed.author_email.is_empty() {
            self.text_element("email", &feed.author_email)?;
        }
        self.end("author")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
