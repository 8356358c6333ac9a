//! Post model

use chrono::{DateTime, Local};
use serde::Serialize;

use super::FrontMatter;
use crate::helpers::format_date;

/// A blog post, built from one markdown asset
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Numeric id, as it appears in `/posts/{id}`
    pub id: u64,

    /// Asset key the post was read from
    pub source: String,

    /// Title from front-matter
    pub title: String,

    /// Date from front-matter, verbatim
    pub date: String,

    /// `date` parsed, when it is in a recognised format
    #[serde(skip)]
    pub published: Option<DateTime<Local>>,

    /// Raw markdown body (front-matter removed)
    pub raw: String,

    /// Full front-matter, including custom fields
    #[serde(skip)]
    pub front_matter: FrontMatter,
}

impl Post {
    /// Build a post from split front-matter and body
    pub fn new(id: u64, source: String, front_matter: FrontMatter, body: &str) -> Self {
        let title = front_matter
            .title
            .clone()
            .unwrap_or_else(|| format!("Post #{}", id));
        let date = front_matter.date.clone().unwrap_or_default();
        let published = front_matter.parse_date();

        Self {
            id,
            source,
            title,
            date,
            published,
            raw: body.to_string(),
            front_matter,
        }
    }

    /// Date for display: the parsed date in `format` (Moment.js-style), or
    /// the front-matter text when it could not be parsed
    pub fn display_date(&self, format: &str) -> String {
        match &self.published {
            Some(dt) => format_date(dt, format),
            None => self.date.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_from_front_matter() {
        let fm = FrontMatter {
            title: Some("Hello".to_string()),
            date: Some("2024-05-01".to_string()),
            ..Default::default()
        };
        let post = Post::new(7, "posts/7.md".to_string(), fm, "body");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.date, "2024-05-01");
        assert_eq!(post.display_date("MMMM DD, YYYY"), "May 01, 2024");
        assert_eq!(post.raw, "body");
    }

    #[test]
    fn test_post_without_metadata() {
        let post = Post::new(3, "posts/3.md".to_string(), FrontMatter::default(), "");
        assert_eq!(post.title, "Post #3");
        assert_eq!(post.date, "");
        assert!(post.published.is_none());
        assert_eq!(post.display_date("YYYY"), "");
    }
}
