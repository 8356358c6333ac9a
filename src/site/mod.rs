//! Site runtime - routes, content and templates wired together
//!
//! `Site` is what the generator and the dev server share: given a URL path
//! it resolves the route, loads the content, converts the body and renders
//! the page.

use anyhow::Result;
use std::sync::Arc;

use crate::cache::RenderCache;
use crate::config::SiteConfig;
use crate::content::{ContentError, ContentLoader, ContentProvider, DirProvider, MarkdownRenderer};
use crate::pages::{post_link, HomePage, NotFoundPage, Page, PostPage};
use crate::router::{PostParams, Route, RouteTable};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// A rendered page, ready to write or serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: u16,
    pub html: String,
}

/// Everything needed to turn a path into HTML
pub struct Site {
    config: SiteConfig,
    provider: Arc<dyn ContentProvider>,
    routes: RouteTable,
    templates: TemplateRenderer,
    cache: RenderCache,
}

impl Site {
    /// Assemble a site from a config and a content provider
    pub fn new(config: SiteConfig, provider: Arc<dyn ContentProvider>) -> Result<Self> {
        let renderer = MarkdownRenderer::with_config(&config.highlight);
        Ok(Self {
            config,
            provider,
            routes: RouteTable::default(),
            templates: TemplateRenderer::new()?,
            cache: RenderCache::new(renderer),
        })
    }

    /// Load the blog's content directory once and assemble the site
    pub fn load(blog: &Blog) -> Result<Self> {
        let provider = DirProvider::load(&blog.source_dir)?;
        tracing::info!(
            "Loaded {} content assets from {:?}",
            provider.len(),
            provider.root()
        );
        if provider.is_empty() {
            tracing::warn!("No content found under {:?}", provider.root());
        }
        Self::new(blog.config.clone(), Arc::new(provider))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Loader over this site's content
    pub fn loader(&self) -> ContentLoader<'_> {
        ContentLoader::new(self.provider.as_ref(), self.config.front_matter)
    }

    /// Resolve `path` and build its page, body converted
    pub async fn page(&self, path: &str) -> Result<Page> {
        match self.routes.resolve(path) {
            Ok(route) => self.page_for(route).await,
            Err(e) => {
                tracing::debug!("{}", e);
                Ok(Page::NotFound(NotFoundPage::new(e.to_string())))
            }
        }
    }

    /// Build the page for an already-resolved route
    pub async fn page_for(&self, route: Route) -> Result<Page> {
        match route {
            Route::Home => Ok(Page::Home(self.home())),
            Route::Post(params) => self.post(params).await,
        }
    }

    /// Resolve, build and render `path`
    pub async fn render_path(&self, path: &str) -> Result<Rendered> {
        let page = self.page(path).await?;
        self.render(&page)
    }

    /// Render a built page
    pub fn render(&self, page: &Page) -> Result<Rendered> {
        Ok(Rendered {
            status: page.status(),
            html: page.render(&self.templates, &self.config)?,
        })
    }

    fn home(&self) -> HomePage {
        if !self.config.home.list_posts {
            return HomePage::new();
        }

        match self.loader().load_posts() {
            Ok(posts) => HomePage::with_posts(
                posts.iter().map(|p| post_link(&self.config, p)).collect(),
            ),
            Err(e) => {
                tracing::warn!("Failed to list posts on the home page: {}", e);
                HomePage::new()
            }
        }
    }

    async fn post(&self, params: PostParams) -> Result<Page> {
        let loader = self.loader();

        let post = match loader.load_post(params.post_id) {
            Ok(post) => post,
            Err(ContentError::NotFound(key)) => {
                return Ok(Page::NotFound(NotFoundPage::new(format!(
                    "No post with id {} ({})",
                    params.post_id, key
                ))));
            }
            Err(e) => {
                tracing::warn!("Failed to load post {}: {}", params.post_id, e);
                return Ok(Page::NotFound(NotFoundPage::new(e.to_string())));
            }
        };

        let (prev, next) = loader.neighbours(params.post_id);
        let link = |id: Option<u64>| {
            id.and_then(|id| loader.load_post(id).ok())
                .map(|p| post_link(&self.config, &p))
        };

        let mut page = PostPage::new(params, post).with_neighbours(link(prev), link(next));
        page.resolve(&self.cache).await?;
        Ok(Page::Post(page))
    }
}
