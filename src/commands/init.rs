//! Initialize a new blog

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::provider::POSTS_DIR;
use crate::generator::STATIC_DIR;
use crate::Blog;

const DEFAULT_CONFIG: &str = r#"# Site
title: Coders on Beer
subtitle: Software Engineering Blog
description: ''
author: '@mendes.software'
author_url: https://bsky.app/profile/mendes.software
language: en

# URL
url: http://localhost:4000
root: /

# Directory
source_dir: source
public_dir: public
bundle_dir: bundle

# Writing
# lenient: posts without front-matter render with a placeholder title
# strict: such posts are reported as errors
front_matter: lenient
date_format: YYYY-MM-DD
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: false

# Home page
home:
  list_posts: false
"#;

const HELLO_POST: &str = r#"---
title: Understanding Modern Software Development
date: 2024-01-15
slug: understanding-modern-software-development
---
Software gets written one small, reviewable change at a time.

## Keep it small

Small changes are easier to test and easier to revert:

```rust
fn main() {
    println!("Cheers!");
}
```

Run `coders-on-beer new "My Post"` to write your own.
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let source_dir = target_dir.join("source");
    fs::create_dir_all(source_dir.join(POSTS_DIR))?;
    fs::create_dir_all(source_dir.join(STATIC_DIR))?;

    let config_path = target_dir.join(Blog::CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    let post_path = source_dir.join(POSTS_DIR).join("1.md");
    if !post_path.exists() {
        fs::write(&post_path, HELLO_POST)?;
    }

    tracing::info!("Initialized blog in {:?}", target_dir);
    Ok(())
}
