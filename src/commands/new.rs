//! Create a new post

use anyhow::Result;
use std::fs;

use crate::Folio;

/// Create a new post or draft
pub fn create_post(folio: &Folio, title: &str, draft: bool, path: Option<&str>) -> Result<()> {
    let now = chrono::Local::now();

    let target_dir = if draft {
        folio.source_dir.join("_drafts")
    } else {
        folio.source_dir.join("_posts")
    };

    fs::create_dir_all(&target_dir)?;

    // Generate filename
    let filename = if let Some(p) = path {
        format!("{}.md", p)
    } else {
        let slug = slug::slugify(title);
        folio
            .config
            .new_post_name
            .replace(":title", &slug)
            .replace(":year", &now.format("%Y").to_string())
            .replace(":month", &now.format("%m").to_string())
            .replace(":day", &now.format("%d").to_string())
    };

    let file_path = target_dir.join(&filename);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        r#"---
title: {}
date: {}
summary:
tags:
---
"#,
        title,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

/// Run the new command
pub fn run(folio: &Folio, title: &str, draft: bool) -> Result<()> {
    create_post(folio, title, draft, None)
}
