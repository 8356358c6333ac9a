//! Route table - maps URL paths to pages
//!
//! Resolution happens in two phases: a path is matched against the
//! registered patterns to collect string [`Params`], then the route's loader
//! turns those into a typed [`Route`] before any page is built.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Path segment name to raw value, as captured from the URL
pub type Params = BTreeMap<String, String>;

/// Routing errors; all of them end up as a not-found page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route matches {0}")]
    NoMatch(String),

    #[error("Invalid value {value:?} for parameter {name}")]
    InvalidParam { name: String, value: String },
}

/// Typed parameters of the post route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostParams {
    pub post_id: u64,
}

impl PostParams {
    /// Loader for `/posts/:postId`
    pub fn load(params: &Params) -> Result<Self, RouteError> {
        let raw = params.get("postId").map(String::as_str).unwrap_or("");
        // `u64::from_str` accepts a leading `+`; ids are plain digits only,
        // without leading zeros
        if raw.is_empty()
            || !raw.bytes().all(|b| b.is_ascii_digit())
            || (raw.len() > 1 && raw.starts_with('0'))
        {
            return Err(invalid("postId", raw));
        }
        let post_id = raw.parse().map_err(|_| invalid("postId", raw))?;
        Ok(Self { post_id })
    }
}

fn invalid(name: &str, value: &str) -> RouteError {
    RouteError::InvalidParam {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// A resolved route, parameters loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Post(PostParams),
}

impl Route {
    /// URL path of this route, without the site root
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Post(params) => format!("/posts/{}", params.post_id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "home"),
            Route::Post(params) => write!(f, "post #{}", params.post_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

type Loader = fn(&Params) -> Result<Route, RouteError>;

struct RouteEntry {
    pattern: &'static str,
    segments: Vec<Segment>,
    loader: Loader,
}

/// Ordered list of path patterns and their loaders
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// An empty table
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `pattern` (segments starting with `:` capture)
    pub fn route(mut self, pattern: &'static str, loader: Loader) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(s),
            })
            .collect();
        self.routes.push(RouteEntry {
            pattern,
            segments,
            loader,
        });
        self
    }

    /// Match `path` and run the matching route's loader
    pub fn resolve(&self, path: &str) -> Result<Route, RouteError> {
        let (entry, params) = self
            .matches(path)
            .ok_or_else(|| RouteError::NoMatch(path.to_string()))?;
        tracing::debug!("{} matched {} with {:?}", path, entry.pattern, params);
        (entry.loader)(&params)
    }

    /// Match `path` without loading, returning the pattern and raw params
    pub fn match_path(&self, path: &str) -> Option<(&'static str, Params)> {
        self.matches(path).map(|(entry, params)| (entry.pattern, params))
    }

    fn matches(&self, path: &str) -> Option<(&RouteEntry, Params)> {
        let path = normalize(path);
        let parts: Vec<&str> = split_path(path).collect();

        self.routes.iter().find_map(|entry| {
            if entry.segments.len() != parts.len() {
                return None;
            }
            let mut params = Params::new();
            for (segment, part) in entry.segments.iter().zip(&parts) {
                match segment {
                    Segment::Literal(lit) if lit == part => {}
                    Segment::Literal(_) => return None,
                    Segment::Param(name) => {
                        params.insert(name.to_string(), part.to_string());
                    }
                }
            }
            Some((entry, params))
        })
    }
}

impl Default for RouteTable {
    /// The blog's routes: `/` and `/posts/:postId`
    fn default() -> Self {
        Self::new()
            .route("/", |_| Ok(Route::Home))
            .route("/posts/:postId", |params| {
                PostParams::load(params).map(Route::Post)
            })
    }
}

/// Drop query, fragment and a trailing `index.html` segment
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or("");
    match path.strip_suffix("index.html") {
        Some(dir) if dir.is_empty() || dir.ends_with('/') => dir,
        _ => path,
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
