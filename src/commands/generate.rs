//! Generate static files

use anyhow::Result;

use crate::generator::{Generator, Summary};
use crate::site::Site;
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog) -> Result<Summary> {
    let start = std::time::Instant::now();

    let site = Site::load(blog)?;
    let summary = Generator::new(blog, site).generate().await?;

    tracing::info!(
        "Generated {} pages ({} posts, {} skipped, {} assets) in {:.2}s",
        summary.pages,
        summary.posts,
        summary.skipped,
        summary.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}
