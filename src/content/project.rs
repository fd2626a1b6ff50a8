//! Project entry model

use serde::{Deserialize, Serialize};

/// A portfolio project entry
///
/// Read-only data loaded from the projects file in the source directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub title: String,

    /// Short description
    pub description: String,

    /// Card image path, relative to the site root
    #[serde(default)]
    pub image: String,

    /// Link to the project (repository, product page, ...)
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projects_yaml() {
        let yaml = r#"
- title: Apalis
  description: Background job processing for Rust
  image: /images/apalis.png
  link: https://github.com/geofmureithi/apalis
- title: Mpesa for Node.js
  description: M-Pesa library using the REST API
  link: https://github.com/safaricom/mpesa-node-library
"#;
        let projects: Vec<Project> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].title, "Apalis");
        assert_eq!(projects[0].image, "/images/apalis.png");
        // image is optional
        assert_eq!(projects[1].image, "");
    }
}
