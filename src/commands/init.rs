//! Initialize a new Folio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Folio;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("source/_drafts"))?;
    fs::create_dir_all(target_dir.join("source/css"))?;
    fs::create_dir_all(target_dir.join("source/images"))?;

    // Create default _config.yml
    let config_content = r#"# Folio Configuration

# Site
title: Folio
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public
blog_dir: blog
tag_dir: tags
projects_file: projects.yml

# Home page
home:
  greeting: Hello!
  intro: |
    I'm a developer. This is my corner of the internet.
  hero_image: ''
max_display: 5

# Blog listing
per_page: 10
pagination_dir: page

# Writing
new_post_name: :title.md
render_drafts: false

# Date format
date_format: MMMM DD, YYYY

# Code highlighting
highlight:
  theme: base16-ocean.dark
  line_number: true

# Analytics (leave app_key empty to disable)
analytics:
  app_key: ''
  endpoint: ''

# Newsletter (leave provider empty to disable)
newsletter:
  provider: ''
"#;

    fs::write(target_dir.join("_config.yml"), config_content)?;

    // Starter projects file
    let projects_content = r#"# Portfolio entries shown on the projects page
- title: My First Project
  description: A short description of what it does.
  image: /images/project.png
  link: https://github.com/username/project
"#;

    fs::write(target_dir.join("source/projects.yml"), projects_content)?;

    // Starter stylesheet
    let css_content = r#"body {
  max-width: 48rem;
  margin: 0 auto;
  padding: 0 1rem;
  font-family: system-ui, sans-serif;
  line-height: 1.6;
}

.site-header { display: flex; justify-content: space-between; padding: 1rem 0; }
.site-nav a { margin-left: 1rem; }
.greeting { font-size: 2.5rem; font-weight: 800; }
.post-list { list-style: none; padding: 0; }
.post-item { padding: 1.5rem 0; border-bottom: 1px solid #ddd; }
.tag { margin-right: 0.5rem; font-size: 0.875rem; }
.pagination { display: flex; gap: 1rem; padding: 1rem 0; }
.sr-only { position: absolute; width: 1px; height: 1px; overflow: hidden; }
"#;

    fs::write(target_dir.join("source/css/style.css"), css_content)?;

    // Create a sample post
    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
summary: Your very first post.
tags:
---

Welcome to your new site. This is your very first post.

## Quick Start

### Create a new post

```bash
$ folio-rs new "My New Post"
```

### Run server

```bash
$ folio-rs server
```

### Generate static files

```bash
$ folio-rs generate
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("source/_posts/hello-world.md"), sample_post)?;

    Ok(())
}

/// Run the init command with an existing Folio instance
pub fn run(folio: &Folio) -> Result<()> {
    init_site(&folio.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Folio;

    #[test]
    fn test_init_site_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("_config.yml").exists());
        assert!(dir.path().join("source/_posts/hello-world.md").exists());
        assert!(dir.path().join("source/projects.yml").exists());
        assert!(dir.path().join("source/css/style.css").exists());

        // The scaffolded site loads cleanly
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "Folio");
    }
}
