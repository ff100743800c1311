//! HTTP fetcher for worker tasks
//!
//! This module handles:
//! - Building HTTP clients with the configured user agent string
//! - GET requests for the task's target page (redirects followed)
//! - Error classification for failed fetches

use crate::config::UserAgentConfig;
use crate::worker::WorkerError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed before a fetch fails
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against this
    pub final_url: Url,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sitelint::config::UserAgentConfig;
/// use sitelint::worker::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Sitelint".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page for a worker task
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | Any other status | `WorkerError::Http` |
/// | Timeout, refused connection, redirect chain > 10, unreadable body | `WorkerError::Fetch` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, WorkerError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| WorkerError::Fetch {
            url: url.to_string(),
            message: describe(&e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(WorkerError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| WorkerError::Fetch {
        url: url.to_string(),
        message: describe(&e),
    })?;

    Ok(FetchedPage {
        final_url,
        body,
    })
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        format!("More than {} redirects", MAX_REDIRECTS)
    } else {
        error.to_string()
    }
}
