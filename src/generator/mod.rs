//! Generator module - writes every route of the site to the public directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::FrontMatterPolicy;
use crate::content::provider::is_markdown_file;
use crate::pages::{NotFoundPage, Page};
use crate::router::{PostParams, Route};
use crate::site::Site;
use crate::Blog;

/// Directory under the source dir whose files are copied verbatim
pub const STATIC_DIR: &str = "static";

/// What a generation run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub pages: usize,
    pub posts: usize,
    pub skipped: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator<'a> {
    blog: &'a Blog,
    site: Site,
}

impl<'a> Generator<'a> {
    /// Create a new generator over an assembled site
    pub fn new(blog: &'a Blog, site: Site) -> Self {
        Self { blog, site }
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<Summary> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        let mut summary = Summary::default();

        // Home page
        let home = self.site.page_for(Route::Home).await?;
        self.write_page(&home, &Route::Home.path())?;
        summary.pages += 1;

        // Post pages
        let loader = self.site.loader();
        for post_id in loader.post_ids() {
            let route = Route::Post(PostParams { post_id });
            let page = self.site.page_for(route).await?;

            if let Page::NotFound(not_found) = &page {
                if self.site.config().front_matter == FrontMatterPolicy::Strict {
                    anyhow::bail!("Failed to generate post {}: {}", post_id, not_found.reason);
                }
                tracing::warn!("Skipping post {}: {}", post_id, not_found.reason);
                summary.skipped += 1;
                continue;
            }

            self.write_page(&page, &route.path())?;
            summary.pages += 1;
            summary.posts += 1;
        }

        // 404 page
        let not_found = Page::NotFound(NotFoundPage::new("This page does not exist."));
        let html = self.site.render(&not_found)?.html;
        write_file(&public_dir.join("404.html"), &html)?;
        summary.pages += 1;

        summary.assets = self.copy_static_assets()?;
        tracing::debug!("Converted {} post bodies", self.site.cache().conversions());

        Ok(summary)
    }

    /// Write a page to `<route path>/index.html`
    fn write_page(&self, page: &Page, route_path: &str) -> Result<()> {
        let rendered = self.site.render(page)?;
        let output_path = output_path(&self.blog.public_dir, route_path);
        write_file(&output_path, &rendered.html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy `source/static/**` (minus markdown) into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = self.blog.source_dir.join(STATIC_DIR);
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(&static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// File a route path is written to
pub fn output_path(public_dir: &Path, route_path: &str) -> PathBuf {
    // Strip leading slash from path to avoid creating absolute paths
    let clean_path = route_path.trim_matches('/');
    if clean_path.is_empty() {
        public_dir.join("index.html")
    } else {
        public_dir.join(clean_path).join("index.html")
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
