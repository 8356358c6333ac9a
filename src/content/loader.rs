//! Content loader - turns provider assets into posts

use super::provider::{post_id_from_key, post_key};
use super::{ContentError, ContentProvider, FrontMatter, Post};
use crate::config::FrontMatterPolicy;

/// Loads posts from a content provider
pub struct ContentLoader<'a> {
    provider: &'a dyn ContentProvider,
    policy: FrontMatterPolicy,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(provider: &'a dyn ContentProvider, policy: FrontMatterPolicy) -> Self {
        Self { provider, policy }
    }

    /// Ids of every post asset, ascending
    pub fn post_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .provider
            .keys()
            .into_iter()
            .filter_map(post_id_from_key)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Load a single post by id
    pub fn load_post(&self, id: u64) -> Result<Post, ContentError> {
        let key = post_key(id);
        let text = self
            .provider
            .get(&key)
            .ok_or_else(|| ContentError::NotFound(key.clone()))?;

        let (front_matter, body) = match (FrontMatter::split(text), self.policy) {
            (Ok((Some(fm), body)), _) => (fm, body),
            (Ok((None, body)), FrontMatterPolicy::Lenient) => {
                tracing::warn!("{} has no front-matter, using empty metadata", key);
                (FrontMatter::default(), body)
            }
            (Ok((None, _)), FrontMatterPolicy::Strict) => {
                return Err(ContentError::MissingFrontMatter(key));
            }
            (Err(message), FrontMatterPolicy::Lenient) => {
                tracing::warn!(
                    "Failed to parse front-matter in {}, treating as content: {}",
                    key,
                    message
                );
                (FrontMatter::default(), text)
            }
            (Err(message), FrontMatterPolicy::Strict) => {
                return Err(ContentError::InvalidFrontMatter { key, message });
            }
        };

        Ok(Post::new(id, key, front_matter, body))
    }

    /// Load every post, newest first.
    ///
    /// Under the lenient policy a post that fails to load is logged and
    /// skipped; under the strict policy the first failure is returned.
    pub fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = Vec::new();

        for id in self.post_ids() {
            match self.load_post(id) {
                Ok(post) => posts.push(post),
                Err(e) if self.policy == FrontMatterPolicy::Lenient => {
                    tracing::warn!("Failed to load post {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }

        posts.sort_by(|a, b| b.published.cmp(&a.published).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    /// Neighbouring post ids: (previous, next) by id order
    pub fn neighbours(&self, id: u64) -> (Option<u64>, Option<u64>) {
        let ids = self.post_ids();
        let prev = ids.iter().copied().filter(|&other| other < id).max();
        let next = ids.iter().copied().filter(|&other| other > id).min();
        (prev, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn provider() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(
            "posts/1.md".to_string(),
            "---\ntitle: First\ndate: 2024-01-01\n---\n# One\n".to_string(),
        );
        map.insert(
            "posts/2.md".to_string(),
            "---\ntitle: Second\ndate: 2024-02-01\n---\n# Two\n".to_string(),
        );
        map.insert("posts/5.md".to_string(), "# No metadata\n".to_string());
        map.insert("about.md".to_string(), "---\ntitle: About\n---\n".to_string());
        map
    }

    #[test]
    fn test_post_ids_only_numeric_posts() {
        let provider = provider();
        let loader = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        assert_eq!(loader.post_ids(), vec![1, 2, 5]);
    }

    #[test]
    fn test_load_post() {
        let provider = provider();
        let loader = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        let post = loader.load_post(2).unwrap();
        assert_eq!(post.id, 2);
        assert_eq!(post.title, "Second");
        assert_eq!(post.date, "2024-02-01");
        assert_eq!(post.raw, "# Two\n");
        assert_eq!(post.source, "posts/2.md");
    }

    #[test]
    fn test_load_missing_post() {
        let provider = provider();
        let loader = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        assert!(matches!(
            loader.load_post(99),
            Err(ContentError::NotFound(key)) if key == "posts/99.md"
        ));
    }

    #[test]
    fn test_missing_front_matter_policies() {
        let provider = provider();

        let lenient = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        let post = lenient.load_post(5).unwrap();
        assert_eq!(post.title, "Post #5");
        assert_eq!(post.date, "");
        assert_eq!(post.raw, "# No metadata\n");

        let strict = ContentLoader::new(&provider, FrontMatterPolicy::Strict);
        assert!(matches!(
            strict.load_post(5),
            Err(ContentError::MissingFrontMatter(_))
        ));
        assert!(strict.load_posts().is_err());
    }

    #[test]
    fn test_malformed_front_matter_policies() {
        let mut provider = BTreeMap::new();
        provider.insert(
            "posts/1.md".to_string(),
            "---\ntitle: [broken\n---\nbody".to_string(),
        );

        let lenient = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        let post = lenient.load_post(1).unwrap();
        assert_eq!(post.title, "Post #1");
        assert!(post.raw.starts_with("---"));

        let strict = ContentLoader::new(&provider, FrontMatterPolicy::Strict);
        assert!(matches!(
            strict.load_post(1),
            Err(ContentError::InvalidFrontMatter { .. })
        ));
    }

    #[test]
    fn test_load_posts_newest_first() {
        let provider = provider();
        let loader = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        let posts = loader.load_posts().unwrap();
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 5]);
    }

    #[test]
    fn test_neighbours() {
        let provider = provider();
        let loader = ContentLoader::new(&provider, FrontMatterPolicy::Lenient);
        assert_eq!(loader.neighbours(1), (None, Some(2)));
        assert_eq!(loader.neighbours(2), (Some(1), Some(5)));
        assert_eq!(loader.neighbours(5), (Some(2), None));
    }
}
