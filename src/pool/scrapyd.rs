//! Scrapyd-backed worker pool
//!
//! The queue name is the Scrapyd project; task names are spider names and
//! task parameters become spider arguments.

use crate::pool::{PoolError, WorkerPool};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub struct ScrapydPool {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    status: String,
    #[serde(default)]
    jobid: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListJobsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    pending: Vec<JobEntry>,
    #[serde(default)]
    running: Vec<JobEntry>,
    #[serde(default)]
    finished: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    id: String,
}

impl ScrapydPool {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn api_url(&self, resource: &str) -> Result<Url, PoolError> {
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(resource)
            .map_err(|e| PoolError::Protocol(format!("bad endpoint {}: {}", self.endpoint, e)))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, PoolError> {
        let status = response.status();
        if !status.is_success() {
            return Err(PoolError::Unreachable(format!("HTTP {}", status.as_u16())));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PoolError::Protocol(e.to_string()))
    }
}

fn rejected(message: Option<String>) -> PoolError {
    PoolError::Rejected(message.unwrap_or_else(|| "no message".to_string()))
}

#[async_trait]
impl WorkerPool for ScrapydPool {
    async fn schedule(
        &self,
        queue: &str,
        task_name: &str,
        params: &[(String, String)],
    ) -> Result<String, PoolError> {
        let mut form: Vec<(&str, &str)> = vec![("project", queue), ("spider", task_name)];
        form.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self
            .client
            .post(self.api_url("schedule.json")?)
            .form(&form)
            .send()
            .await
            .map_err(|e| PoolError::Unreachable(e.to_string()))?;

        let body: ScheduleResponse = Self::read_json(response).await?;
        if body.status != "ok" {
            return Err(rejected(body.message));
        }
        body.jobid
            .ok_or_else(|| PoolError::Protocol("schedule.json returned no jobid".to_string()))
    }

    async fn status(&self, queue: &str, task_id: &str) -> Result<String, PoolError> {
        let mut url = self.api_url("listjobs.json")?;
        url.query_pairs_mut().append_pair("project", queue);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PoolError::Unreachable(e.to_string()))?;

        let body: ListJobsResponse = Self::read_json(response).await?;
        if body.status != "ok" {
            return Err(rejected(body.message));
        }

        let lists = [
            ("pending", &body.pending),
            ("running", &body.running),
            ("finished", &body.finished),
        ];
        Ok(lists
            .iter()
            .find(|(_, jobs)| jobs.iter().any(|job| job.id == task_id))
            .map(|(name, _)| name.to_string())
            .unwrap_or_default())
    }
}
