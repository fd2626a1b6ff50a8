//! Blog post model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A blog post
///
/// Built once by the content loader and never mutated afterwards. The slug
/// is unique across the collection and serves as the display key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// URL-friendly unique identifier
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Last updated date
    pub updated: Option<DateTime<Local>>,

    /// Short summary shown in listings
    pub summary: String,

    /// Post tags
    pub tags: Vec<String>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Source file path (relative to the source directory)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path (without root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Whether the post is published
    pub published: bool,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: DateTime<Local>, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            slug,
            title,
            date,
            updated: None,
            summary: String::new(),
            tags: Vec::new(),
            raw: String::new(),
            content: String::new(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            path: String::new(),
            permalink: String::new(),
            published: true,
            extra: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_post_slugifies_title() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let post = Post::new("Hello World!".to_string(), date, "hello.md".to_string());
        assert_eq!(post.slug, "hello-world");
        assert!(post.published);
        assert!(post.tags.is_empty());
    }
}
