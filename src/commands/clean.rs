//! Clean generated output

use anyhow::{Context, Result};
use std::fs;

use crate::Blog;

/// Remove the public and bundle directories
pub fn run(blog: &Blog) -> Result<()> {
    for dir in [&blog.public_dir, &blog.bundle_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir).with_context(|| format!("Failed to delete {:?}", dir))?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(blog.public_dir.join("posts/1")).unwrap();
        fs::create_dir_all(&blog.bundle_dir).unwrap();
        fs::create_dir_all(&blog.source_dir).unwrap();

        run(&blog).unwrap();
        assert!(!blog.public_dir.exists());
        assert!(!blog.bundle_dir.exists());
        assert!(blog.source_dir.exists());

        // Nothing left to clean is fine
        run(&blog).unwrap();
    }
}
