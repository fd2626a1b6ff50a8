//! Analytics snippet generation
//!
//! The SDK is loaded lazily in the browser; tracking directives issued
//! before it arrives sit in a command queue that the SDK drains on init.
//! The queue here is a typed list of [`AnalyticsCommand`] values rendered
//! into the pre-init script, so the set of directives a page ships is fixed
//! at generate time. Script load is deferred and fire-and-forget: a failed
//! load leaves analytics uninitialized and the page unaffected.

use crate::config::AnalyticsConfig;

/// A tracking directive understood by the analytics SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsCommand {
    TrackSessions,
    TrackPageview,
    TrackClicks,
    TrackScrolls,
    TrackLinks,
    CollectFromForms,
}

impl AnalyticsCommand {
    /// All directives, in the order the snippet queues them
    pub const ALL: [AnalyticsCommand; 6] = [
        AnalyticsCommand::TrackSessions,
        AnalyticsCommand::TrackPageview,
        AnalyticsCommand::TrackClicks,
        AnalyticsCommand::TrackScrolls,
        AnalyticsCommand::TrackLinks,
        AnalyticsCommand::CollectFromForms,
    ];

    /// Wire name of the directive
    pub fn directive(&self) -> &'static str {
        match self {
            AnalyticsCommand::TrackSessions => "track_sessions",
            AnalyticsCommand::TrackPageview => "track_pageview",
            AnalyticsCommand::TrackClicks => "track_clicks",
            AnalyticsCommand::TrackScrolls => "track_scrolls",
            AnalyticsCommand::TrackLinks => "track_links",
            AnalyticsCommand::CollectFromForms => "collect_from_forms",
        }
    }
}

/// Typed command queue flushed by the SDK once it has loaded
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<AnalyticsCommand>,
}

impl CommandQueue {
    /// An empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// The full tracking set queued on every page
    pub fn standard() -> Self {
        Self {
            commands: AnalyticsCommand::ALL.to_vec(),
        }
    }

    /// Append a directive
    pub fn push(&mut self, command: AnalyticsCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[AnalyticsCommand] {
        &self.commands
    }

    /// Render the queue as pre-init push statements
    fn to_script(&self) -> String {
        let mut script = String::new();
        for command in &self.commands {
            script.push_str(&format!(
                "Countly.q.push(['{}']);\n",
                command.directive()
            ));
        }
        script
    }
}

/// Deferred analytics snippet injected into every generated page
pub struct Snippet<'a> {
    config: &'a AnalyticsConfig,
    queue: CommandQueue,
}

impl<'a> Snippet<'a> {
    /// Snippet with the standard tracking set
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self {
            config,
            queue: CommandQueue::standard(),
        }
    }

    /// Snippet with a custom command queue
    pub fn with_queue(config: &'a AnalyticsConfig, queue: CommandQueue) -> Self {
        Self { config, queue }
    }

    /// Render the snippet HTML, or an empty string when analytics is not
    /// configured
    pub fn render(&self) -> String {
        if !self.config.enabled() {
            return String::new();
        }

        format!(
            r#"<script>
var Countly = Countly || {{}};
Countly.q = Countly.q || [];
Countly.app_key = '{app_key}';
Countly.url = '{endpoint}';
{queue}</script>
<script defer src="{script_url}" onload="Countly.init()"></script>
"#,
            app_key = js_escape(&self.config.app_key),
            endpoint = js_escape(&self.config.endpoint),
            queue = self.queue.to_script(),
            script_url = self.config.script_url,
        )
    }
}

/// Escape a value for embedding in a single-quoted JS string
fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('<', "\\x3c")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalyticsConfig {
        AnalyticsConfig {
            app_key: "abc123".to_string(),
            endpoint: "https://countly.example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_directive_names() {
        assert_eq!(AnalyticsCommand::TrackSessions.directive(), "track_sessions");
        assert_eq!(
            AnalyticsCommand::CollectFromForms.directive(),
            "collect_from_forms"
        );
    }

    #[test]
    fn test_standard_queue_has_all_directives() {
        let queue = CommandQueue::standard();
        assert_eq!(queue.commands().len(), 6);
    }

    #[test]
    fn test_snippet_queues_all_directives() {
        let config = config();
        let html = Snippet::new(&config).render();
        assert!(html.contains("Countly.app_key = 'abc123'"));
        assert!(html.contains("Countly.url = 'https://countly.example.com'"));
        for command in AnalyticsCommand::ALL {
            assert!(html.contains(&format!("Countly.q.push(['{}'])", command.directive())));
        }
        assert!(html.contains("<script defer src="));
        assert!(html.contains("countly.min.js"));
    }

    #[test]
    fn test_snippet_empty_without_app_key() {
        let config = AnalyticsConfig::default();
        assert_eq!(Snippet::new(&config).render(), "");
    }

    #[test]
    fn test_custom_queue() {
        let config = config();
        let mut queue = CommandQueue::new();
        queue.push(AnalyticsCommand::TrackPageview);
        let html = Snippet::with_queue(&config, queue).render();
        assert!(html.contains("track_pageview"));
        assert!(!html.contains("track_clicks"));
    }

    #[test]
    fn test_app_key_is_escaped() {
        let config = AnalyticsConfig {
            app_key: "ab'c</script>".to_string(),
            ..Default::default()
        };
        let html = Snippet::new(&config).render();
        assert!(html.contains("ab\\'c\\x3c/script>"));
    }
}
