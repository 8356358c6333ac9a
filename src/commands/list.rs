//! List posts

use anyhow::Result;

use crate::content::{ContentLoader, DirProvider};
use crate::Blog;

/// Print every post, newest first
pub fn run(blog: &Blog) -> Result<()> {
    let provider = DirProvider::load(&blog.source_dir)?;
    let loader = ContentLoader::new(&provider, blog.config.front_matter);
    let posts = loader.load_posts()?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        println!(
            "  #{} {} - {} [{}]",
            post.id,
            post.display_date(&blog.config.date_format),
            post.title,
            post.source
        );
    }

    Ok(())
}
