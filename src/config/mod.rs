//! Configuration module

mod site;

pub use site::{AnalyticsConfig, HighlightConfig, HomeConfig, NewsletterConfig, SiteConfig};
