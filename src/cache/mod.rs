//! Render cache - memoised markdown conversion
//!
//! Converting a body is the one deferred step of building a post page. Each
//! distinct body text (identified by its content hash) gets a single
//! `OnceCell`: the first caller runs the conversion on the blocking pool and
//! every other caller, concurrent or later, awaits that same settled value.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::content::MarkdownRenderer;

/// Calculate a hash for content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

type Slot = Arc<OnceCell<Arc<str>>>;

/// Memo of converted bodies, keyed by body hash
pub struct RenderCache {
    renderer: Arc<MarkdownRenderer>,
    slots: Mutex<HashMap<u64, Slot>>,
    conversions: AtomicUsize,
}

impl RenderCache {
    pub fn new(renderer: MarkdownRenderer) -> Self {
        Self {
            renderer: Arc::new(renderer),
            slots: Mutex::new(HashMap::new()),
            conversions: AtomicUsize::new(0),
        }
    }

    /// Converted HTML for `body`, settling at most once per body text
    pub async fn convert(&self, body: &str) -> Result<Arc<str>> {
        let key = hash_content(body);
        let slot = self.slot(key);

        let html = slot
            .get_or_try_init(|| async {
                let renderer = Arc::clone(&self.renderer);
                let body = body.to_string();
                self.conversions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Converting body {:016x} ({} bytes)", key, body.len());

                let html = tokio::task::spawn_blocking(move || renderer.render(&body))
                    .await
                    .context("Markdown conversion task failed")??;
                Ok::<_, anyhow::Error>(Arc::<str>::from(html))
            })
            .await?;

        Ok(Arc::clone(html))
    }

    /// Number of conversions actually run
    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::Relaxed)
    }

    fn slot(&self, key: u64) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(key).or_default())
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(MarkdownRenderer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content() {
        assert_eq!(hash_content("a"), hash_content("a"));
        assert_ne!(hash_content("a"), hash_content("b"));
    }

    #[tokio::test]
    async fn test_convert_once_per_body() {
        let cache = RenderCache::default();

        let first = cache.convert("# Title").await.unwrap();
        let second = cache.convert("# Title").await.unwrap();
        assert!(first.contains("<h1>Title</h1>"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.conversions(), 1);

        cache.convert("*other*").await.unwrap();
        assert_eq!(cache.conversions(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_conversion() {
        let cache = Arc::new(RenderCache::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.convert("## Shared").await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().contains("<h2>Shared</h2>"));
        }
        assert_eq!(cache.conversions(), 1);
    }
}
