//! Content module - posts, front-matter, markdown and content providers

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod provider;

use std::path::PathBuf;
use thiserror::Error;

pub use frontmatter::FrontMatter;
pub(crate) use frontmatter::parse_date_string;
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use provider::{ContentProvider, DirProvider, StaticProvider};

/// Errors raised while reading or interpreting content assets
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Missing front-matter in {0}")]
    MissingFrontMatter(String),

    #[error("Invalid front-matter in {key}: {message}")]
    InvalidFrontMatter { key: String, message: String },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
