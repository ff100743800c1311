//! Robots.txt handling module
//!
//! Worker tasks consult a [`RobotsPolicy`] before fetching a page. Rules are
//! fetched once per origin and cached for a day.

mod cache;
mod rules;

pub use cache::CachedRobots;
pub use rules::RobotRules;

use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Decides whether worker tasks may fetch a URL
pub struct RobotsPolicy {
    enabled: bool,
    product_token: String,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsPolicy {
    /// Creates a policy that obeys robots.txt for the given crawler name
    pub fn new(enabled: bool, product_token: impl Into<String>) -> Self {
        Self {
            enabled,
            product_token: product_token.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A policy that allows everything without fetching robots.txt
    pub fn disabled() -> Self {
        Self::new(false, String::new())
    }

    /// Checks `url` against its origin's robots.txt, fetching it if needed
    pub async fn allows(&self, client: &Client, url: &Url) -> bool {
        if !self.enabled {
            return true;
        }

        let origin = url.origin().ascii_serialization();

        if let Some(rules) = self.cached(&origin) {
            tracing::debug!("Using cached robots.txt for {}", origin);
            return rules.is_allowed(url.as_str(), &self.product_token);
        }

        let rules = fetch_robots(client, url).await;
        let allowed = rules.is_allowed(url.as_str(), &self.product_token);

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(origin, CachedRobots::new(rules));

        allowed
    }

    fn cached(&self, origin: &str) -> Option<RobotRules> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(origin)
            .filter(|entry| !entry.is_stale())
            .map(|entry| entry.rules.clone())
    }
}

/// Fetches robots.txt for the origin of `page`
///
/// Any failure (network error, non-2xx status, unreadable body) yields
/// rules that allow everything.
pub async fn fetch_robots(client: &Client, page: &Url) -> RobotRules {
    let robots_url = match page.join("/robots.txt") {
        Ok(url) => url,
        Err(_) => return RobotRules::allow_all(),
    };

    tracing::debug!("Fetching {}", robots_url);

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => RobotRules::from_content(&body),
            Err(e) => {
                tracing::debug!("Unreadable robots.txt at {}: {}", robots_url, e);
                RobotRules::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!(
                "No robots.txt at {} (HTTP {})",
                robots_url,
                response.status().as_u16()
            );
            RobotRules::allow_all()
        }
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}", robots_url, e);
            RobotRules::allow_all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_disabled_policy_never_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
            .expect(0)
            .mount(&server)
            .await;

        let policy = RobotsPolicy::disabled();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        assert!(policy.allows(&Client::new(), &url).await);
    }

    #[tokio::test]
    async fn test_disallowed_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(true, "TestBot");
        let client = Client::new();
        let admin = Url::parse(&format!("{}/admin", server.uri())).unwrap();
        let home = Url::parse(&format!("{}/", server.uri())).unwrap();

        assert!(!policy.allows(&client, &admin).await);
        // Second lookup is served from the cache
        assert!(policy.allows(&client, &home).await);
    }

    #[tokio::test]
    async fn test_missing_robots_allows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(true, "TestBot");
        let url = Url::parse(&format!("{}/anything", server.uri())).unwrap();
        assert!(policy.allows(&Client::new(), &url).await);
    }
}
