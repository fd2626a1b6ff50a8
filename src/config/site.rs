//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
///
/// Loaded once at startup and passed by reference to the loader, generator
/// and server. Never mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub blog_dir: String,
    pub tag_dir: String,
    /// Projects data file, relative to the source directory
    pub projects_file: String,

    // Home page
    #[serde(default)]
    pub home: HomeConfig,

    /// Maximum number of posts shown on the home page
    pub max_display: usize,

    // Blog listing pagination
    pub per_page: usize,
    pub pagination_dir: String,

    // Writing
    pub new_post_name: String,
    pub render_drafts: bool,

    // Date format (Moment.js style, matches front-matter conventions)
    pub date_format: String,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub newsletter: NewsletterConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            blog_dir: "blog".to_string(),
            tag_dir: "tags".to_string(),
            projects_file: "projects.yml".to_string(),

            home: HomeConfig::default(),
            max_display: 5,

            per_page: 10,
            pagination_dir: "page".to_string(),

            new_post_name: ":title.md".to_string(),
            render_drafts: false,

            date_format: "MMMM DD, YYYY".to_string(),

            highlight: HighlightConfig::default(),
            analytics: AnalyticsConfig::default(),
            newsletter: NewsletterConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Home page hero section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// Large greeting headline
    pub greeting: String,
    /// Intro text below the greeting, markdown
    pub intro: String,
    /// Hero image path, relative to the site root; empty to omit
    pub hero_image: String,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello!".to_string(),
            intro: String::new(),
            hero_image: String::new(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Analytics configuration
///
/// An empty `app_key` disables the snippet entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub app_key: String,
    /// Server the SDK reports to
    pub endpoint: String,
    /// Where the SDK itself is loaded from
    pub script_url: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            endpoint: String::new(),
            script_url:
                "https://cdnjs.cloudflare.com/ajax/libs/countly-sdk-web/20.4.0/countly.min.js"
                    .to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Whether a usable analytics setup is configured
    pub fn enabled(&self) -> bool {
        !self.app_key.is_empty()
    }
}

/// Newsletter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewsletterConfig {
    /// Provider name ("buttondown", "mailchimp", ...); empty disables the
    /// subscription block
    pub provider: String,
}

impl NewsletterConfig {
    pub fn enabled(&self) -> bool {
        !self.provider.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.max_display, 5);
        assert_eq!(config.per_page, 10);
        assert!(!config.analytics.enabled());
        assert!(!config.newsletter.enabled());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
author: Test User
max_display: 3
per_page: 20
analytics:
  app_key: abc123
  endpoint: https://countly.example.com
newsletter:
  provider: buttondown
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.max_display, 3);
        assert_eq!(config.per_page, 20);
        assert!(config.analytics.enabled());
        assert_eq!(config.analytics.endpoint, "https://countly.example.com");
        assert!(config.newsletter.enabled());
        assert_eq!(config.newsletter.provider, "buttondown");
    }

    #[test]
    fn test_partial_analytics_keeps_default_script_url() {
        let yaml = r#"
analytics:
  app_key: abc123
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.analytics.script_url.contains("countly"));
    }
}
