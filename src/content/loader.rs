//! Content loader - loads posts and projects from the source directory

use anyhow::Result;
use chrono::Local;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post, Project};
use crate::Folio;

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &folio.config.highlight.theme,
            folio.config.highlight.line_number,
        );
        Self { folio, renderer }
    }

    /// Load all posts from source/_posts
    ///
    /// Slugs are unique across the collection; a post whose slug collides
    /// with an earlier one is skipped with a warning.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.folio.source_dir.join("_posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let mut seen_slugs: HashSet<String> = HashSet::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_post(path) {
                    Ok(post) => {
                        if !post.published && !self.folio.config.render_drafts {
                            continue;
                        }
                        if !seen_slugs.insert(post.slug.clone()) {
                            tracing::warn!(
                                "Duplicate slug '{}' in {:?}, skipping",
                                post.slug,
                                path
                            );
                            continue;
                        }
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        // Sort by date descending (newest first)
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        // File mtime backs up a missing front-matter date
        let metadata = fs::metadata(path)?;
        let file_modified = metadata
            .modified()
            .ok()
            .map(|t| chrono::DateTime::<Local>::from(t));

        let date = fm
            .parse_date()
            .unwrap_or_else(|| file_modified.unwrap_or_else(Local::now));

        let updated = fm.parse_updated().or(file_modified);

        // Title from front-matter or filename
        let title = fm.title.clone().unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let source = path
            .strip_prefix(&self.folio.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // Slug from front-matter override, else the source filename
        let slug = match &fm.slug {
            Some(s) => slug::slugify(s),
            None => slug::slugify(
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("untitled"),
            ),
        };

        let post_path = format!("{}/{}/", self.folio.config.blog_dir, slug);
        let permalink = crate::helpers::full_url_for(&self.folio.config, &post_path);

        // Summary from front-matter, else derived from the body
        let (derived_summary, full_md) = MarkdownRenderer::split_summary(body);
        let summary = fm
            .summary
            .clone()
            .or(derived_summary)
            .unwrap_or_default();

        let content_html = self.renderer.render(&full_md)?;

        let mut post = Post::new(title, date, source);
        post.slug = slug;
        post.updated = updated;
        post.summary = summary;
        post.tags = fm.tags;
        post.raw = body.to_string();
        post.content = content_html;
        post.full_source = path.to_path_buf();
        post.path = post_path;
        post.permalink = permalink;
        post.published = fm.published;
        post.extra = fm.extra;

        Ok(post)
    }

    /// Load project entries from the projects file
    pub fn load_projects(&self) -> Result<Vec<Project>> {
        let projects_path = self
            .folio
            .source_dir
            .join(&self.folio.config.projects_file);
        if !projects_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&projects_path)?;
        let projects: Vec<Project> = serde_yaml::from_str(&content)?;
        Ok(projects)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
