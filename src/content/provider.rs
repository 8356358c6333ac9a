//! Content providers - read-only mappings from asset key to raw text
//!
//! Keys are `/`-separated paths relative to the source directory, e.g.
//! `posts/42.md`. A provider is loaded once and never mutated; the dev
//! server swaps in a fresh one when files change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ContentError;

/// Directory (under the source dir) holding post assets
pub const POSTS_DIR: &str = "posts";

/// Read-only key-to-text lookup for content assets
pub trait ContentProvider: Send + Sync {
    /// Raw text for `key`
    fn get(&self, key: &str) -> Option<&str>;

    /// All known keys, sorted
    fn keys(&self) -> Vec<&str>;
}

impl ContentProvider for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        BTreeMap::keys(self).map(String::as_str).collect()
    }
}

/// Asset key of the post with the given id
pub fn post_key(id: u64) -> String {
    format!("{}/{}.md", POSTS_DIR, id)
}

/// Post id encoded in an asset key, if the key names a post
pub fn post_id_from_key(key: &str) -> Option<u64> {
    let name = key.strip_prefix(POSTS_DIR)?.strip_prefix('/')?;
    let stem = name.strip_suffix(".md")?;
    // Reject signs and leading zeros so each id has exactly one key
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if stem.len() > 1 && stem.starts_with('0') {
        return None;
    }
    stem.parse().ok()
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Provider backed by the markdown files of a directory, read once
#[derive(Debug, Clone, Default)]
pub struct DirProvider {
    root: PathBuf,
    entries: BTreeMap<String, String>,
}

impl DirProvider {
    /// Read every markdown file under `root`.
    ///
    /// A missing directory yields an empty provider; an unreadable file fails
    /// the whole load.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self, ContentError> {
        let root = root.as_ref().to_path_buf();
        let mut entries = BTreeMap::new();

        if !root.exists() {
            tracing::debug!("Source directory {:?} does not exist", root);
            return Ok(Self { root, entries });
        }

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            entries.insert(asset_key(&root, path), text);
        }

        tracing::debug!("Loaded {} content assets from {:?}", entries.len(), root);
        Ok(Self { root, entries })
    }

    /// Directory the assets were read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentProvider for DirProvider {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// Provider over a table compiled into the binary, e.g. the `content.rs`
/// module written by `bundle --format rust`
#[derive(Debug, Clone, Copy)]
pub struct StaticProvider {
    entries: &'static [(&'static str, &'static str)],
}

impl StaticProvider {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }
}

impl ContentProvider for StaticProvider {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
    }

    fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys
    }
}

/// `/`-separated key of `path` relative to `root`
pub fn asset_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: &[(&str, &str)] = &[
        ("posts/2.md", "---\ntitle: Two\n---\nsecond"),
        ("posts/1.md", "---\ntitle: One\n---\nfirst"),
    ];

    #[test]
    fn test_post_key_round_trip() {
        assert_eq!(post_key(42), "posts/42.md");
        assert_eq!(post_id_from_key("posts/42.md"), Some(42));
        assert_eq!(post_id_from_key("posts/0.md"), Some(0));
        assert_eq!(post_id_from_key("posts/042.md"), None);
        assert_eq!(post_id_from_key("posts/-1.md"), None);
        assert_eq!(post_id_from_key("posts/draft.md"), None);
        assert_eq!(post_id_from_key("about.md"), None);
        assert_eq!(post_id_from_key("posts/nested/3.md"), None);
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticProvider::new(TABLE);
        assert_eq!(provider.keys(), vec!["posts/1.md", "posts/2.md"]);
        assert!(provider.get("posts/2.md").unwrap().ends_with("second"));
        assert!(provider.get("posts/3.md").is_none());
    }

    #[test]
    fn test_dir_provider_loads_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("1.md"), "# One").unwrap();
        fs::write(posts.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("about.md"), "about").unwrap();

        let provider = DirProvider::load(dir.path()).unwrap();
        assert_eq!(provider.keys(), vec!["about.md", "posts/1.md"]);
        assert_eq!(provider.get("posts/1.md"), Some("# One"));
        assert_eq!(provider.len(), 2);
    }

    #[test]
    fn test_dir_provider_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirProvider::load(dir.path().join("nope")).unwrap();
        assert!(provider.is_empty());
    }
}
