//! Build-time content transform
//!
//! Markdown assets are rewritten into string constants that page code can
//! import: one ES module per asset (`export default "...";`) or a single
//! Rust module with a static `(key, text)` table for [`StaticProvider`].
//!
//! [`StaticProvider`]: crate::content::StaticProvider

use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use crate::content::provider::asset_key;
use crate::content::ContentProvider;
use crate::Blog;

/// Bundle output flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    /// One `<key>.js` ES module per asset
    Js,
    /// A single `content.rs` with a static table
    Rust,
}

impl FromStr for BundleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "js" | "javascript" => Ok(BundleFormat::Js),
            "rs" | "rust" => Ok(BundleFormat::Rust),
            _ => bail!("Unknown bundle format: {}. Available: js, rust", s),
        }
    }
}

/// Rewrite a markdown asset as an ES module exporting its text.
///
/// Returns `None` for anything that isn't a `.md` file, leaving it to
/// other transforms.
pub fn transform(id: &str, code: &str) -> Option<String> {
    if !id.ends_with(".md") {
        return None;
    }
    // A JSON string literal is a valid JS string literal
    let literal = serde_json::to_string(code).ok()?;
    Some(format!("export default {};", literal))
}

/// Rust module holding every asset of `provider` as a static table
pub fn bundle_rust(provider: &dyn ContentProvider) -> String {
    let mut out = String::from(
        "// Generated by `coders-on-beer bundle --format rust`. Do not edit.\n\n\
         pub static CONTENT: &[(&str, &str)] = &[\n",
    );
    for key in provider.keys() {
        let Some(text) = provider.get(key) else {
            continue;
        };
        // `Debug` for str produces an escaped, valid Rust string literal
        let _ = writeln!(out, "    ({:?}, {:?}),", key, text);
    }
    out.push_str("];\n");
    out
}

/// Runs the transform over a blog's source directory
pub struct Bundler<'a> {
    blog: &'a Blog,
}

impl<'a> Bundler<'a> {
    pub fn new(blog: &'a Blog) -> Self {
        Self { blog }
    }

    /// Bundle every markdown asset into `out_dir`, returning the files written.
    ///
    /// Any unreadable asset aborts the bundle.
    pub fn run(&self, format: BundleFormat, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let assets = self.read_assets()?;
        fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {:?}", out_dir))?;

        let mut written = Vec::new();
        match format {
            BundleFormat::Js => {
                for (key, text) in &assets {
                    let Some(module) = transform(key, text) else {
                        continue;
                    };
                    let path = out_dir.join(format!("{}.js", key));
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, module).with_context(|| format!("Failed to write {:?}", path))?;
                    written.push(path);
                }
            }
            BundleFormat::Rust => {
                let table: std::collections::BTreeMap<String, String> = assets
                    .into_iter()
                    .filter(|(key, _)| key.ends_with(".md"))
                    .collect();
                let path = out_dir.join("content.rs");
                fs::write(&path, bundle_rust(&table))
                    .with_context(|| format!("Failed to write {:?}", path))?;
                written.push(path);
            }
        }

        tracing::info!("Bundled {} file(s) into {:?}", written.len(), out_dir);
        Ok(written)
    }

    /// Read every markdown asset under the source directory, sorted by key
    fn read_assets(&self) -> Result<Vec<(String, String)>> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            bail!("Source directory {:?} does not exist", source_dir);
        }

        let mut assets = Vec::new();
        for entry in WalkDir::new(source_dir).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", source_dir))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read content asset {:?}", path))?;
            assets.push((asset_key(source_dir, path), text));
        }

        assets.sort();
        Ok(assets)
    }
}
