//! Static documentation site compiler.
//!
//! Walks a tree of HTML and JSON content fragments, pulls page metadata out of
//! the parsed markup, and wraps every fragment in a shared master template:
//!
//! ```no_run
//! # fn main() -> sitegen::Result<()> {
//! use sitegen::{build_site, SiteConfig};
//!
//! let config = SiteConfig {
//!     url: "https://docs.example.com/".to_string(),
//!     ..SiteConfig::default()
//! };
//! let report = build_site(&config)?;
//! println!("{} pages", report.pages);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod feed;
pub mod html;
pub mod io;
pub mod loader;
pub mod page;
pub mod processing;
pub mod site_map;

pub use config::{Args, FeedConfig, SiteConfig};
pub use error::{Error, Result};
pub use page::Page;
pub use processing::{build_site, BuildReport};
