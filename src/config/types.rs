use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitelint
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    pub output: OutputConfig,
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the endpoints listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Which worker pool implementation executes tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolBackend {
    /// Tasks run on tokio tasks inside this process
    Local,
    /// Tasks are scheduled on a Scrapyd-compatible daemon
    Scrapyd,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_backend")]
    pub backend: PoolBackend,

    /// Base URL of the remote job-queue service (scrapyd backend only)
    #[serde(default = "default_pool_endpoint")]
    pub endpoint: String,

    /// Queue (project) name tasks are submitted to
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Number of tasks the local pool runs at once
    #[serde(rename = "max-concurrent-tasks", default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: u32,

    /// Number of terminal task states the local pool remembers
    #[serde(rename = "task-retention", default = "default_task_retention")]
    pub task_retention: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_pool_endpoint(),
            queue: default_queue(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            task_retention: default_task_retention(),
        }
    }
}

/// Poll loop cadence for the blocking discipline
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Delay before the second poll (0 polls in a tight loop)
    #[serde(rename = "initial-interval-ms", default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    /// Upper bound on the delay between polls
    #[serde(rename = "max-interval-ms", default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Growth factor applied to the delay after every poll
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Give up waiting after this long (unbounded when absent)
    #[serde(rename = "timeout-ms", default)]
    pub timeout_ms: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            timeout_ms: None,
        }
    }
}

impl PollingConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler (also the robots.txt product token)
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Worker task behavior
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Skip pages disallowed by the site's robots.txt
    #[serde(rename = "obey-robots", default = "default_true")]
    pub obey_robots: bool,

    /// Per-request timeout for page fetches
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            obey_robots: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Grammar checker service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    /// Base URL of a LanguageTool-compatible HTTP server
    #[serde(default = "default_checker_endpoint")]
    pub endpoint: String,

    /// Language used when a request does not name one
    #[serde(rename = "default-language", default = "default_language")]
    pub default_language: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_checker_endpoint(),
            default_language: default_language(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite record store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Records older than this are removed by `purge`
    #[serde(rename = "retention-hours", default)]
    pub retention_hours: Option<u64>,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_backend() -> PoolBackend {
    PoolBackend::Local
}

fn default_pool_endpoint() -> String {
    "http://localhost:6800".to_string()
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_max_concurrent_tasks() -> u32 {
    4
}

fn default_task_retention() -> usize {
    1024
}

fn default_initial_interval_ms() -> u64 {
    50
}

fn default_max_interval_ms() -> u64 {
    2000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_checker_endpoint() -> String {
    "http://localhost:8081".to_string()
}

fn default_language() -> String {
    crate::job::DEFAULT_LANGUAGE.to_string()
}
