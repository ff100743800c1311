//! Shared fixtures

use async_trait::async_trait;
use serde_json::json;
use sitelint::config::{parse_config, Config};
use sitelint::pool::{PoolError, WorkerPool};
use sitelint::storage::SqliteStore;
use sitelint::{JobService, PollPolicy};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration for a local pool whose checker lives at `checker_endpoint`
pub fn test_config(checker_endpoint: &str) -> Config {
    let toml = format!(
        r#"
[pool]
backend = "local"
queue = "default"
max-concurrent-tasks = 4

[polling]
initial-interval-ms = 5
max-interval-ms = 20
timeout-ms = 10000

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[worker]
obey-robots = false
request-timeout-secs = 5

[checker]
endpoint = "{}"

[output]
database-path = ":memory:"
"#,
        checker_endpoint
    );
    parse_config(&toml).expect("test config should be valid")
}

/// A service backed by an in-process pool and an in-memory store
pub fn local_service(checker_endpoint: &str) -> (Arc<JobService>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::new_in_memory().expect("in-memory store"));
    let service = JobService::with_store(&test_config(checker_endpoint), store.clone())
        .expect("service should build");
    (Arc::new(service), store)
}

/// A service backed by a [`FakePool`]
pub fn fake_service(pool: Arc<FakePool>) -> (Arc<JobService>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::new_in_memory().expect("in-memory store"));
    let policy = PollPolicy::tight().with_timeout(Duration::from_millis(200));
    let service = JobService::new(pool, "default", store.clone(), policy);
    (Arc::new(service), store)
}

/// Mounts a LanguageTool `/v2/check` mock that reports no matches
pub async fn mount_clean_checker(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .mount(server)
        .await;
}

/// Mounts `body` as an HTML page at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Pool double with fixed answers
pub struct FakePool {
    pub status: String,
    pub unreachable: bool,
    pub scheduled: Mutex<Vec<String>>,
}

impl FakePool {
    pub fn reporting(status: &str) -> Self {
        Self {
            status: status.to_string(),
            unreachable: false,
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            status: String::new(),
            unreachable: true,
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkerPool for FakePool {
    async fn schedule(
        &self,
        _queue: &str,
        task_name: &str,
        _params: &[(String, String)],
    ) -> Result<String, PoolError> {
        if self.unreachable {
            return Err(PoolError::Unreachable("connection refused".to_string()));
        }
        let mut scheduled = self.scheduled.lock().unwrap();
        scheduled.push(task_name.to_string());
        Ok(format!("fake-{}", scheduled.len()))
    }

    async fn status(&self, _queue: &str, _task_id: &str) -> Result<String, PoolError> {
        if self.unreachable {
            return Err(PoolError::Unreachable("connection refused".to_string()));
        }
        Ok(self.status.clone())
    }
}
