//! Bundle markdown content into importable modules

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::bundle::{BundleFormat, Bundler};
use crate::Blog;

/// Bundle the blog's content, into `out` or the configured bundle dir
pub fn run(blog: &Blog, format: &str, out: Option<&Path>) -> Result<Vec<PathBuf>> {
    let format: BundleFormat = format.parse()?;
    let out_dir = out.unwrap_or(&blog.bundle_dir);
    Bundler::new(blog).run(format, out_dir)
}
