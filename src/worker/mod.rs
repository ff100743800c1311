//! Worker tasks
//!
//! A worker task fetches one page and writes its findings to the record
//! store, tagged with the task's job id:
//! - link extraction writes one [`crate::LinkRecord`] per anchor
//! - grammar checking writes one [`crate::ErrorRecord`] per checker match
//!
//! The pool decides where a task runs; this module only knows how to run it.

mod checker;
mod fetcher;
mod grammar;
mod links;

pub use checker::{normalize_language, CheckerError, GrammarChecker, GrammarMatch, LanguageToolChecker};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use grammar::{check_page, split_lines, strip_markup};
pub use links::{extract_links, ExtractedLink};

use crate::config::Config;
use crate::job::{ErrorTaskRequest, LinkTaskRequest, TaskRequest};
use crate::robots::RobotsPolicy;
use crate::storage::{NewLink, RecordStore, StorageError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a worker task ends in the failed state
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Fetching {url} is disallowed by robots.txt")]
    RobotsDenied { url: String },

    #[error("Link task for {url} has no job id")]
    MissingJobId { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Everything a worker task needs to run
pub struct WorkerContext {
    pub client: Client,
    pub store: Arc<dyn RecordStore>,
    pub checker: Arc<dyn GrammarChecker>,
    pub robots: RobotsPolicy,
}

impl WorkerContext {
    /// Builds a context from configuration, sharing `store` with the caller
    pub fn from_config(config: &Config, store: Arc<dyn RecordStore>) -> crate::Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.worker.request_timeout_secs),
        )?;
        let endpoint = Url::parse(&config.checker.endpoint)?;
        let checker = Arc::new(LanguageToolChecker::new(client.clone(), endpoint));
        let robots = RobotsPolicy::new(config.worker.obey_robots, &config.user_agent.crawler_name);

        Ok(Self {
            client,
            store,
            checker,
            robots,
        })
    }
}

/// Runs a task to completion, returning the number of records written
pub async fn run_task(context: &WorkerContext, request: &TaskRequest) -> Result<usize, WorkerError> {
    match request {
        TaskRequest::Links(request) => run_link_task(context, request).await,
        TaskRequest::Errors(request) => run_error_task(context, request).await,
    }
}

async fn fetch_allowed(context: &WorkerContext, url: &Url) -> Result<FetchedPage, WorkerError> {
    if !context.robots.allows(&context.client, url).await {
        return Err(WorkerError::RobotsDenied {
            url: url.to_string(),
        });
    }
    fetch_page(&context.client, url).await
}

async fn run_link_task(
    context: &WorkerContext,
    request: &LinkTaskRequest,
) -> Result<usize, WorkerError> {
    let job_id = request.job_id.ok_or_else(|| WorkerError::MissingJobId {
        url: request.url.to_string(),
    })?;

    let page = fetch_allowed(context, &request.url).await?;
    let links = extract_links(&page.body, &page.final_url);

    for link in &links {
        context.store.insert_link(&NewLink {
            job_id,
            text: link.text.clone(),
            url: link.url.clone(),
        })?;
    }

    tracing::info!(
        "Extracted {} links from {} (job {})",
        links.len(),
        page.final_url,
        job_id
    );
    Ok(links.len())
}

async fn run_error_task(
    context: &WorkerContext,
    request: &ErrorTaskRequest,
) -> Result<usize, WorkerError> {
    let page = fetch_allowed(context, &request.url).await?;
    let errors = check_page(
        context.checker.as_ref(),
        &page.body,
        request.url.as_str(),
        &request.language,
        request.job_id,
    )
    .await;

    for error in &errors {
        context.store.insert_error(error)?;
    }

    tracing::info!(
        "Found {} grammar errors on {} (job {})",
        errors.len(),
        request.url,
        request.job_id
    );
    Ok(errors.len())
}
