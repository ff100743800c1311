//! Robots.txt rule matching
//!
//! Thin wrapper over the robotstxt crate's matcher.

use robotstxt::DefaultMatcher;

/// Robots.txt rules for one origin
#[derive(Debug, Clone)]
pub struct RobotRules {
    /// Raw robots.txt content; empty allows everything
    content: String,
}

impl RobotRules {
    /// Builds rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules that allow every URL
    ///
    /// Used when the origin has no robots.txt or it could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks whether `url` may be fetched by the crawler named `product_token`
    pub fn is_allowed(&self, url: &str, product_token: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token, url)
    }
}
