//! Page components - Home, Post and NotFound
//!
//! Pages are plain values built from already-loaded inputs. A post page is
//! usable as soon as it is constructed: its metadata is there from the
//! start, while its body moves from [`BodyState::Pending`] to
//! [`BodyState::Ready`] once, when [`PostPage::resolve`] completes.

use anyhow::Result;
use std::sync::Arc;
use tera::Context;

use crate::cache::RenderCache;
use crate::config::SiteConfig;
use crate::content::Post;
use crate::router::PostParams;
use crate::templates::{PostData, PostLink, TemplateRenderer};

/// Conversion state of a post body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyState {
    Pending,
    Ready(Arc<str>),
}

impl BodyState {
    pub fn html(&self) -> Option<&str> {
        match self {
            BodyState::Pending => None,
            BodyState::Ready(html) => Some(html),
        }
    }
}

/// The home page; static apart from the optional post list
#[derive(Debug, Clone, Default)]
pub struct HomePage {
    posts: Vec<PostLink>,
}

impl HomePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Home page listing `posts` under the header
    pub fn with_posts(posts: Vec<PostLink>) -> Self {
        Self { posts }
    }
}

/// A single post
#[derive(Debug, Clone)]
pub struct PostPage {
    params: PostParams,
    post: Post,
    body: BodyState,
    prev: Option<PostLink>,
    next: Option<PostLink>,
}

impl PostPage {
    /// Page for `post`, reached through `params`; the body is not converted yet
    pub fn new(params: PostParams, post: Post) -> Self {
        Self {
            params,
            post,
            body: BodyState::Pending,
            prev: None,
            next: None,
        }
    }

    /// Attach previous/next post links
    pub fn with_neighbours(mut self, prev: Option<PostLink>, next: Option<PostLink>) -> Self {
        self.prev = prev;
        self.next = next;
        self
    }

    /// Id shown on the page, taken from the route
    pub fn id(&self) -> u64 {
        self.params.post_id
    }

    pub fn title(&self) -> &str {
        &self.post.title
    }

    pub fn date(&self) -> &str {
        &self.post.date
    }

    pub fn body(&self) -> &BodyState {
        &self.body
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.body, BodyState::Ready(_))
    }

    /// Convert the body through `cache`. Resolving an already-ready page is
    /// a no-op.
    pub async fn resolve(&mut self, cache: &RenderCache) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        let html = cache.convert(&self.post.raw).await?;
        self.body = BodyState::Ready(html);
        Ok(())
    }
}

/// Page shown for unknown routes and missing posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundPage {
    pub reason: String,
}

impl NotFoundPage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Any page the site can render
#[derive(Debug, Clone)]
pub enum Page {
    Home(HomePage),
    Post(PostPage),
    NotFound(NotFoundPage),
}

impl Page {
    /// Template used to render this page
    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Home(_) => "home.html",
            Page::Post(_) => "post.html",
            Page::NotFound(_) => "not_found.html",
        }
    }

    /// HTTP status the page is served with
    pub fn status(&self) -> u16 {
        match self {
            Page::NotFound(_) => 404,
            _ => 200,
        }
    }

    /// Template context for this page
    pub fn context(&self, config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("config", config);

        match self {
            Page::Home(home) => {
                context.insert("posts", &home.posts);
            }
            Page::Post(page) => {
                let post = PostData {
                    id: page.id(),
                    title: page.title().to_string(),
                    date: page.date().to_string(),
                };
                context.insert("post", &post);
                context.insert("body", page.body().html().unwrap_or(""));
                context.insert("prev", &page.prev);
                context.insert("next", &page.next);
            }
            Page::NotFound(not_found) => {
                context.insert("reason", &not_found.reason);
                context.insert("home", &config.url_for("/"));
            }
        }

        context
    }

    /// Render to a full HTML document
    pub fn render(&self, templates: &TemplateRenderer, config: &SiteConfig) -> Result<String> {
        templates.render(self.template_name(), &self.context(config))
    }
}

/// Link to `post` under the site root
pub fn post_link(config: &SiteConfig, post: &Post) -> PostLink {
    PostLink {
        id: post.id,
        title: post.title.clone(),
        date: post.date.clone(),
        path: config.url_for(&format!("/posts/{}", post.id)),
    }
}
