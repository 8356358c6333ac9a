//! coders-on-beer: static site generator and dev server for a small blog
//!
//! Markdown posts with front-matter are loaded through a content provider,
//! routed by URL (`/` and `/posts/:postId`), converted to HTML and rendered
//! into embedded Tera page templates.

pub mod bundle;
pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod router;
pub mod server;
pub mod site;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The blog project on disk
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source (content) directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Output directory of the content bundle
    pub bundle_dir: PathBuf,
}

impl Blog {
    /// Config file name, relative to the base directory
    pub const CONFIG_FILE: &'static str = "_config.yml";

    /// Open the blog in a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(Self::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", Self::CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let bundle_dir = base_dir.join(&config.bundle_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            bundle_dir,
        })
    }

    /// Directory holding post assets
    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir.join(content::provider::POSTS_DIR)
    }

    /// Path of the config file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(Self::CONFIG_FILE)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::Summary> {
        commands::generate::run(self).await
    }

    /// Clean the public and bundle directories
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, id: Option<u64>) -> Result<PathBuf> {
        commands::new::create_post(self, title, id)
    }
}
