//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub author_url: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub bundle_dir: String,

    // Writing
    pub front_matter: FrontMatterPolicy,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Home page
    #[serde(default)]
    pub home: HomeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Coders on Beer".to_string(),
            subtitle: "Software Engineering Blog".to_string(),
            description: String::new(),
            author: "@mendes.software".to_string(),
            author_url: "https://bsky.app/profile/mendes.software".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            bundle_dir: "bundle".to_string(),

            front_matter: FrontMatterPolicy::default(),
            date_format: "YYYY-MM-DD".to_string(),
            highlight: HighlightConfig::default(),

            home: HomeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// URL path for `path` under the configured root
    pub fn url_for(&self, path: &str) -> String {
        let root = self.root.trim_end_matches('/');
        let path = path.trim_start_matches('/');

        if path.is_empty() {
            format!("{}/", root)
        } else {
            format!("{}/{}", root, path)
        }
    }
}

/// How posts without usable front-matter are surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterPolicy {
    /// Fall back to empty metadata and log a warning
    #[default]
    Lenient,
    /// Refuse to load the post
    Strict,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Home page configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// List posts under the header
    pub list_posts: bool,
}
