//! Typed task requests
//!
//! Pools only carry string parameters; these types are the validated form
//! on either side of that boundary.

use crate::{JobError, JobResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Language used for grammar checks when the caller gives none
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// The two kinds of worker task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Links,
    Errors,
}

impl WorkerKind {
    /// Name the task is registered under in the pool
    pub fn task_name(&self) -> &'static str {
        match self {
            WorkerKind::Links => "link_spider",
            WorkerKind::Errors => "spell_checker",
        }
    }

    pub fn from_task_name(name: &str) -> Option<Self> {
        match name {
            "link_spider" => Some(WorkerKind::Links),
            "spell_checker" => Some(WorkerKind::Errors),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

/// Extract every hyperlink from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTaskRequest {
    pub url: Url,
    /// Filled in by the dispatcher when absent
    pub job_id: Option<Uuid>,
}

impl LinkTaskRequest {
    pub fn new(url: &str) -> JobResult<Self> {
        Ok(Self {
            url: parse_target(url)?,
            job_id: None,
        })
    }

    pub fn with_job_id(mut self, job_id: Uuid) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

/// Grammar-check every line of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTaskRequest {
    pub url: Url,
    pub language: String,
    pub job_id: Uuid,
}

impl ErrorTaskRequest {
    /// A blank or missing language falls back to [`DEFAULT_LANGUAGE`]
    pub fn new(url: &str, language: Option<&str>, job_id: Uuid) -> JobResult<Self> {
        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(language) => parse_language(language)?,
            None => DEFAULT_LANGUAGE.to_string(),
        };
        Ok(Self {
            url: parse_target(url)?,
            language,
            job_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    Links(LinkTaskRequest),
    Errors(ErrorTaskRequest),
}

impl TaskRequest {
    pub fn kind(&self) -> WorkerKind {
        match self {
            TaskRequest::Links(_) => WorkerKind::Links,
            TaskRequest::Errors(_) => WorkerKind::Errors,
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            TaskRequest::Links(r) => &r.url,
            TaskRequest::Errors(r) => &r.url,
        }
    }

    pub fn job_id(&self) -> Option<Uuid> {
        match self {
            TaskRequest::Links(r) => r.job_id,
            TaskRequest::Errors(r) => Some(r.job_id),
        }
    }

    /// Validates untyped parameters for a task of the given kind
    ///
    /// `url` is required for both kinds; error tasks also require `job_id`.
    pub fn from_params(kind: WorkerKind, params: &HashMap<String, String>) -> JobResult<Self> {
        let url = params.get("url").map(String::as_str).unwrap_or("");
        let job_id = params.get("job_id").map(|raw| parse_job_id(raw)).transpose()?;

        match kind {
            WorkerKind::Links => Ok(TaskRequest::Links(LinkTaskRequest {
                url: parse_target(url)?,
                job_id,
            })),
            WorkerKind::Errors => {
                let job_id = job_id.ok_or_else(|| {
                    JobError::InvalidParameters("missing required parameter 'job_id'".to_string())
                })?;
                let language = params.get("language").map(String::as_str);
                Ok(TaskRequest::Errors(ErrorTaskRequest::new(url, language, job_id)?))
            }
        }
    }

    /// Flattens the request into pool parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("url".to_string(), self.url().to_string())];
        if let Some(job_id) = self.job_id() {
            params.push(("job_id".to_string(), job_id.to_string()));
        }
        if let TaskRequest::Errors(r) = self {
            params.push(("language".to_string(), r.language.clone()));
        }
        params
    }
}

/// Parses a target page URL, accepting only absolute http(s) URLs
fn parse_target(raw: &str) -> JobResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(JobError::InvalidParameters(
            "missing required parameter 'url'".to_string(),
        ));
    }

    let url = Url::parse(raw)
        .map_err(|e| JobError::InvalidParameters(format!("invalid url '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(JobError::InvalidParameters(format!(
            "url must be an absolute http(s) URL: {}",
            raw
        ))),
    }
}

fn parse_job_id(raw: &str) -> JobResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| JobError::InvalidParameters(format!("invalid job_id '{}': {}", raw, e)))
}

fn parse_language(language: &str) -> JobResult<String> {
    if language
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(language.to_string())
    } else {
        Err(JobError::InvalidParameters(format!(
            "invalid language '{}'",
            language
        )))
    }
}
