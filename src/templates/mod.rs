//! Built-in folio theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary; a site needs no theme
//! directory on disk.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};
use thiserror::Error;

/// Template rendering errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template engine error: {0}")]
    Engine(#[from] tera::Error),

    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Template renderer with the embedded folio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all folio templates loaded
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        // The templates emit HTML fragments (post bodies, snippets) that
        // must not be re-escaped
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("blog.html", include_str!("folio/blog.html")),
            ("post.html", include_str!("folio/post.html")),
            ("projects.html", include_str!("folio/projects.html")),
            ("tag.html", include_str!("folio/tag.html")),
            ("tags.html", include_str!("folio/tags.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("folio/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("folio/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/post_item.html",
                include_str!("folio/partials/post_item.html"),
            ),
            (
                "partials/pager.html",
                include_str!("folio/partials/pager.html"),
            ),
            (
                "partials/newsletter.html",
                include_str!("folio/partials/newsletter.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == template_name) {
            return Err(TemplateError::NotFound(template_name.to_string()));
        }
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: reformat a YYYY-MM-DD date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    // "LL" expands to the long form ("May 30, 2023")
    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(date.format("%B %d, %Y").to_string()));
        }
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub blog_dir: String,
    pub tag_dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    /// Display date, formatted per the site date format
    pub date: String,
    /// Machine-readable date for <time datetime>
    pub datetime: String,
    pub path: String,
    pub permalink: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_loads_templates() {
        let renderer = TemplateRenderer::new().unwrap();
        assert!(renderer
            .render("missing.html", &Context::new())
            .is_err());
    }

    #[test]
    fn test_strip_html_filter() {
        let value = tera::Value::String("<p>Hello <b>world</b></p>".to_string());
        let out = strip_html_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("Hello world".to_string()));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let value = tera::Value::String("abcdefghij".to_string());
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(4));
        let out = truncate_chars_filter(&value, &args).unwrap();
        assert_eq!(out, tera::Value::String("abcd...".to_string()));
    }

    #[test]
    fn test_date_format_filter_long_form() {
        let value = tera::Value::String("2024-01-15".to_string());
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::from("LL"));
        let out = date_format_filter(&value, &args).unwrap();
        assert_eq!(out, tera::Value::String("January 15, 2024".to_string()));
    }
}
