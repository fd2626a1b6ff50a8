//! Generator module - renders the site into static HTML files

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use tera::Context;
use walkdir::WalkDir;

use crate::analytics::Snippet;
use crate::content::{select_top_posts, MarkdownRenderer, Post, Project};
use crate::helpers::{format_date, full_url_for, url_for};
use crate::templates::{
    ConfigData, NavPost, PaginationData, PostData, ProjectData, TagData, TemplateRenderer,
};
use crate::Folio;

/// Static site generator using the embedded templates
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let markdown = MarkdownRenderer::with_options(
            &folio.config.highlight.theme,
            folio.config.highlight.line_number,
        );

        Ok(Self {
            folio: folio.clone(),
            renderer,
            markdown,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post], projects: &[Project]) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        // Copy source assets (images, css, etc.)
        self.copy_source_assets()?;

        // One canonical ordering for every page
        let sorted_posts = select_top_posts(posts, posts.len());

        let config_data = self.build_config_data();

        self.generate_home(&sorted_posts, &config_data)?;
        self.generate_blog_pages(&sorted_posts, &config_data)?;
        self.generate_post_pages(&sorted_posts, &config_data)?;
        self.generate_projects_page(projects, &config_data)?;
        self.generate_tag_pages(&sorted_posts, &config_data)?;
        self.generate_atom_feed(&sorted_posts)?;

        Ok(())
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        let config = &self.folio.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            blog_dir: config.blog_dir.clone(),
            tag_dir: config.tag_dir.clone(),
        }
    }

    /// Build the listing representation of a post
    fn build_post_data(&self, post: &Post) -> PostData {
        PostData {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: format_date(&post.date, &self.folio.config.date_format),
            datetime: post.date.format("%Y-%m-%d").to_string(),
            path: post.path.clone(),
            permalink: post.permalink.clone(),
            tags: post.tags.clone(),
            summary: post.summary.clone(),
            content: post.content.clone(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self, config_data: &ConfigData) -> Context {
        let config = &self.folio.config;
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("analytics_snippet", &Snippet::new(&config.analytics).render());
        context.insert("show_newsletter", &config.newsletter.enabled());
        context.insert("newsletter_provider", &config.newsletter.provider);
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        // Pages that have a title overwrite this
        context.insert("page_title", "");
        context
    }

    /// Render a template and write it to a path under the public directory
    fn write_page(&self, template: &str, context: &Context, rel_path: &str) -> Result<()> {
        let html = self.renderer.render(template, context)?;

        let output_path = self.folio.public_dir.join(rel_path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(())
    }

    /// Generate the home page
    ///
    /// Shows at most `max_display` posts; an "All Posts" link appears only
    /// when more posts exist than the cap, and the newsletter block only
    /// when a provider is configured.
    fn generate_home(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        let config = &self.folio.config;

        let selected = select_top_posts(posts, config.max_display);
        let home_posts: Vec<PostData> = selected.iter().map(|p| self.build_post_data(p)).collect();

        let intro_html = if config.home.intro.is_empty() {
            String::new()
        } else {
            self.markdown.render(&config.home.intro)?
        };

        let mut context = self.create_base_context(config_data);
        context.insert("greeting", &config.home.greeting);
        context.insert("intro_html", &intro_html);
        context.insert("hero_image", &config.home.hero_image);
        context.insert("home_posts", &home_posts);
        context.insert("has_more", &(posts.len() > config.max_display));

        self.write_page("home.html", &context, "index.html")
    }

    /// Generate blog listing pages with pagination
    fn generate_blog_pages(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        let config = &self.folio.config;
        let per_page = config.per_page.max(1);
        let total_pages = posts.len().div_ceil(per_page).max(1);

        let blog_root = url_for(config, &format!("{}/", config.blog_dir));

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PostData> = posts[start..end]
                .iter()
                .map(|p| self.build_post_data(p))
                .collect();

            let page_url = |n: usize| {
                if n == 1 {
                    blog_root.clone()
                } else {
                    format!("{}{}/{}/", blog_root, config.pagination_dir, n)
                }
            };

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                prev_link: if page_num > 1 {
                    page_url(page_num - 1)
                } else {
                    String::new()
                },
                next_link: if page_num < total_pages {
                    page_url(page_num + 1)
                } else {
                    String::new()
                },
            };

            let mut context = self.create_base_context(config_data);
            context.insert("page_title", "Blog");
            context.insert("page_posts", &page_posts);
            context.insert("pagination", &pagination);

            let rel_path = if page_num == 1 {
                format!("{}/index.html", config.blog_dir)
            } else {
                format!(
                    "{}/{}/{}/index.html",
                    config.blog_dir, config.pagination_dir, page_num
                )
            };
            self.write_page("blog.html", &context, &rel_path)?;
        }

        Ok(())
    }

    /// Generate individual post pages
    fn generate_post_pages(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        for (i, post) in posts.iter().enumerate() {
            // posts run newest to oldest: "previous" is the older neighbour
            let prev_post = posts.get(i + 1).map(|p| NavPost {
                title: p.title.clone(),
                path: p.path.clone(),
            });
            let next_post = (i > 0).then(|| NavPost {
                title: posts[i - 1].title.clone(),
                path: posts[i - 1].path.clone(),
            });

            let mut context = self.create_base_context(config_data);
            context.insert("page_title", &post.title);
            context.insert("page_description", &post.summary);
            context.insert("post", &self.build_post_data(post));
            if let Some(ref prev) = prev_post {
                context.insert("prev_post", prev);
            }
            if let Some(ref next) = next_post {
                context.insert("next_post", next);
            }

            let rel_path = format!("{}index.html", post.path);
            self.write_page("post.html", &context, &rel_path)?;
        }

        if !posts.is_empty() {
            tracing::info!("Generated {} post pages", posts.len());
        }
        Ok(())
    }

    /// Generate the projects page
    fn generate_projects_page(&self, projects: &[Project], config_data: &ConfigData) -> Result<()> {
        let project_data: Vec<ProjectData> = projects
            .iter()
            .map(|p| ProjectData {
                title: p.title.clone(),
                description: p.description.clone(),
                image: p.image.clone(),
                link: p.link.clone(),
            })
            .collect();

        let mut context = self.create_base_context(config_data);
        context.insert("page_title", "Projects");
        context.insert("projects", &project_data);

        self.write_page("projects.html", &context, "projects/index.html")
    }

    /// Generate per-tag pages and the tags index
    fn generate_tag_pages(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        let mut tags_map: HashMap<String, Vec<PostData>> = HashMap::new();

        for post in posts {
            for tag in &post.tags {
                if tag.trim().is_empty() {
                    continue;
                }
                tags_map
                    .entry(tag.clone())
                    .or_default()
                    .push(self.build_post_data(post));
            }
        }

        for (tag, tag_posts) in &tags_map {
            let tag_slug = slug::slugify(tag);
            if tag_slug.is_empty() {
                continue;
            }

            let mut context = self.create_base_context(config_data);
            context.insert("page_title", tag);
            context.insert("tag_name", tag);
            context.insert("tag_posts", tag_posts);

            let rel_path = format!("{}/{}/index.html", self.folio.config.tag_dir, tag_slug);
            self.write_page("tag.html", &context, &rel_path)?;
        }

        // Tags index, sorted by name
        let mut all_tags: Vec<TagData> = tags_map
            .iter()
            .map(|(name, posts)| TagData {
                name: name.clone(),
                slug: slug::slugify(name),
                count: posts.len(),
            })
            .collect();
        all_tags.sort_by(|a, b| a.name.cmp(&b.name));

        let mut context = self.create_base_context(config_data);
        context.insert("page_title", "Tags");
        context.insert("all_tags", &all_tags);
        let rel_path = format!("{}/index.html", self.folio.config.tag_dir);
        self.write_page("tags.html", &context, &rel_path)?;

        tracing::info!("Generated {} tag pages", tags_map.len());
        Ok(())
    }

    /// Generate the Atom feed
    fn generate_atom_feed(&self, posts: &[Post]) -> Result<()> {
        let config = &self.folio.config;
        let base_url = config.url.trim_end_matches('/');

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
            base_url
        ));
        feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
        feed.push_str(&format!(
            "  <updated>{}</updated>\n",
            posts
                .first()
                .map(|p| p.date.to_rfc3339())
                .unwrap_or_else(|| chrono::Local::now().to_rfc3339())
        ));
        feed.push_str(&format!("  <id>{}/</id>\n", base_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        // Most recent posts only
        for post in posts.iter().take(20) {
            let href = full_url_for(config, &post.path);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", href));
            feed.push_str(&format!("    <id>{}</id>\n", href));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                post.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                post.updated.unwrap_or(post.date).to_rfc3339()
            ));
            let content = convert_relative_urls_to_absolute(&post.content, base_url);
            let clean_content = strip_invalid_xml_chars(&content);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                clean_content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        let output_path = self.folio.public_dir.join("atom.xml");
        fs::write(&output_path, feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Copy source assets (images, css, etc.) to the public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.folio.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Markdown is processed separately
            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            // Skip post sources and the projects data file
            if path
                .components()
                .any(|c| c.as_os_str() == "_posts" || c.as_os_str() == "_drafts")
            {
                continue;
            }
            let relative = path.strip_prefix(source_dir)?;
            if relative.to_string_lossy() == self.folio.config.projects_file {
                continue;
            }

            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert relative URLs in HTML content to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip control characters that XML 1.0 forbids
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLoader;
    use crate::Folio;
    use std::fs;

    fn write_post(dir: &std::path::Path, name: &str, title: &str, date: &str) {
        let posts_dir = dir.join("source/_posts");
        fs::create_dir_all(&posts_dir).unwrap();
        fs::write(
            posts_dir.join(name),
            format!(
                "---\ntitle: {}\ndate: {}\nsummary: About {}\ntags: [rust]\n---\nBody of {}.\n",
                title, date, title, title
            ),
        )
        .unwrap();
    }

    fn generate_site(dir: &std::path::Path) -> Folio {
        let folio = Folio::new(dir).unwrap();
        let loader = ContentLoader::new(&folio);
        let posts = loader.load_posts().unwrap();
        let projects = loader.load_projects().unwrap();
        let generator = Generator::new(&folio).unwrap();
        generator.generate(&posts, &projects).unwrap();
        folio
    }

    #[test]
    fn test_empty_site_renders_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let folio = generate_site(dir.path());

        let home = fs::read_to_string(folio.public_dir.join("index.html")).unwrap();
        assert!(home.contains("No posts found."));
        assert!(!home.contains("post-list"));
        assert!(!home.contains("All Posts"));
    }

    #[test]
    fn test_home_caps_posts_and_links_to_all() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=7 {
            write_post(
                dir.path(),
                &format!("post-{}.md", day),
                &format!("Post {}", day),
                &format!("2024-01-0{}", day),
            );
        }
        let folio = generate_site(dir.path());

        let home = fs::read_to_string(folio.public_dir.join("index.html")).unwrap();
        // Display cap is 5: the two oldest posts are not on the home page
        assert!(home.contains("Post 7"));
        assert!(home.contains("Post 3"));
        assert!(!home.contains("Post 2</a>"));
        assert!(!home.contains("Post 1</a>"));
        assert!(home.contains("All Posts"));
        assert!(!home.contains("No posts found."));
    }

    #[test]
    fn test_home_under_cap_has_no_all_posts_link() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=3 {
            write_post(
                dir.path(),
                &format!("post-{}.md", day),
                &format!("Post {}", day),
                &format!("2024-01-0{}", day),
            );
        }
        let folio = generate_site(dir.path());

        let home = fs::read_to_string(folio.public_dir.join("index.html")).unwrap();
        assert!(home.contains("Post 1"));
        assert!(home.contains("Post 3"));
        assert!(!home.contains("All Posts"));
    }

    #[test]
    fn test_newsletter_block_follows_provider() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: Site\nnewsletter:\n  provider: buttondown\n",
        )
        .unwrap();
        let folio = generate_site(dir.path());
        let home = fs::read_to_string(folio.public_dir.join("index.html")).unwrap();
        assert!(home.contains("newsletter-form"));

        let dir2 = tempfile::tempdir().unwrap();
        let folio2 = generate_site(dir2.path());
        let home2 = fs::read_to_string(folio2.public_dir.join("index.html")).unwrap();
        assert!(!home2.contains("newsletter-form"));
    }

    #[test]
    fn test_analytics_snippet_injected_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: Site\nanalytics:\n  app_key: abc123\n  endpoint: https://c.example.com\n",
        )
        .unwrap();
        let folio = generate_site(dir.path());
        let home = fs::read_to_string(folio.public_dir.join("index.html")).unwrap();
        assert!(home.contains("Countly.app_key = 'abc123'"));
        assert!(home.contains("track_pageview"));

        let dir2 = tempfile::tempdir().unwrap();
        let folio2 = generate_site(dir2.path());
        let home2 = fs::read_to_string(folio2.public_dir.join("index.html")).unwrap();
        assert!(!home2.contains("Countly"));
    }

    #[test]
    fn test_post_blog_tag_and_feed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "hello.md", "Hello", "2024-01-15");
        fs::create_dir_all(dir.path().join("source")).unwrap();
        fs::write(
            dir.path().join("source/projects.yml"),
            "- title: Apalis\n  description: Jobs\n  link: https://example.com\n",
        )
        .unwrap();
        let folio = generate_site(dir.path());

        let post = fs::read_to_string(folio.public_dir.join("blog/hello/index.html")).unwrap();
        assert!(post.contains("Hello"));
        assert!(post.contains("Body of Hello."));

        let blog = fs::read_to_string(folio.public_dir.join("blog/index.html")).unwrap();
        assert!(blog.contains("Hello"));

        let tag = fs::read_to_string(folio.public_dir.join("tags/rust/index.html")).unwrap();
        assert!(tag.contains("Hello"));

        let projects =
            fs::read_to_string(folio.public_dir.join("projects/index.html")).unwrap();
        assert!(projects.contains("Apalis"));

        let feed = fs::read_to_string(folio.public_dir.join("atom.xml")).unwrap();
        assert!(feed.contains("<entry>"));
        assert!(feed.contains("Hello"));
    }

    #[test]
    fn test_blog_pagination() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "per_page: 2\n").unwrap();
        for day in 1..=5 {
            write_post(
                dir.path(),
                &format!("post-{}.md", day),
                &format!("Post {}", day),
                &format!("2024-01-0{}", day),
            );
        }
        let folio = generate_site(dir.path());

        assert!(folio.public_dir.join("blog/index.html").exists());
        assert!(folio.public_dir.join("blog/page/2/index.html").exists());
        assert!(folio.public_dir.join("blog/page/3/index.html").exists());
        assert!(!folio.public_dir.join("blog/page/4").exists());

        let page2 = fs::read_to_string(folio.public_dir.join("blog/page/2/index.html")).unwrap();
        assert!(page2.contains("2 / 3"));
    }

    #[test]
    fn test_assets_copied() {
        let dir = tempfile::tempdir().unwrap();
        let css_dir = dir.path().join("source/css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("style.css"), "body {}").unwrap();
        let folio = generate_site(dir.path());
        assert!(folio.public_dir.join("css/style.css").exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & <b>"), "a &amp; &lt;b&gt;");
    }
}
