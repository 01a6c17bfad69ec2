//! Error types for the site build.
//!
//! Every variant that concerns a file carries its path so a failed build
//! points straight at the content that broke it.

use std::path::{Path, PathBuf};

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal build error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Markup that could not be tokenized.
    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Sub-template or master template failed to parse or render.
    #[error("template failed for {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// Malformed JSON content file or configuration file.
    #[error("invalid JSON in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    /// Content exists but lacks text the page cannot do without.
    #[error("missing required content in {}: {what}", path.display())]
    MissingRequiredContent { path: PathBuf, what: &'static str },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atom feed could not be built or written.
    #[error("feed error for {}: {message}", path.display())]
    Feed { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn template(path: impl AsRef<Path>, source: tera::Error) -> Self {
        Self::Template {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn feed(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Feed {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Collect an error and all of its sources as strings, outermost first.
///
/// Tera keeps the interesting part (the undefined variable, the bad line) in
/// the source chain, so callers print the whole chain.
pub fn error_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();

    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }

    chain
}
