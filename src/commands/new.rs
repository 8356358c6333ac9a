//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::provider::{post_id_from_key, POSTS_DIR};
use crate::content::FrontMatter;
use crate::Blog;

/// Create `posts/<id>.md` with title, date and slug filled in.
///
/// Without an explicit id the post gets the next free one.
pub fn create_post(blog: &Blog, title: &str, id: Option<u64>) -> Result<PathBuf> {
    let posts_dir = blog.posts_dir();
    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("Failed to create {:?}", posts_dir))?;

    let id = match id {
        Some(id) => id,
        None => next_id(blog)?,
    };
    let file_path = posts_dir.join(format!("{}.md", id));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        date: Some(now.format("%Y-%m-%d %H:%M:%S").to_string()),
        slug: Some(slug::slugify(title)),
        ..Default::default()
    };

    fs::write(&file_path, front_matter.to_block())
        .with_context(|| format!("Failed to write {:?}", file_path))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// One past the highest existing post id
fn next_id(blog: &Blog) -> Result<u64> {
    let mut max = 0;
    for entry in fs::read_dir(blog.posts_dir())? {
        let name = entry?.file_name();
        let key = format!("{}/{}", POSTS_DIR, name.to_string_lossy());
        if let Some(id) = post_id_from_key(&key) {
            max = max.max(id);
        }
    }
    match max.checked_add(1) {
        Some(id) => Ok(id),
        None => anyhow::bail!("No free post id after {}; pass --id explicitly", max),
    }
}
