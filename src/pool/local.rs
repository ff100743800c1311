//! In-process worker pool
//!
//! Tasks run as tokio tasks, at most `max_concurrent` at a time. Task states
//! are kept in memory; once more than `retention` tasks are known, the
//! oldest finished ones are forgotten and report as unknown. Finished tasks
//! whose outcome has already been read by `status` go first.

use crate::job::{TaskRequest, WorkerKind};
use crate::pool::{PoolError, WorkerPool};
use crate::state::TaskState;
use crate::worker::{run_task, WorkerContext};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use uuid::Uuid;

pub struct LocalPool {
    queue: String,
    context: Arc<WorkerContext>,
    permits: Arc<Semaphore>,
    tasks: Arc<Mutex<TaskTable>>,
}

struct TaskTable {
    states: HashMap<String, TaskState>,
    order: VecDeque<String>,
    /// Terminal tasks whose state has been returned by `status`
    reported: HashSet<String>,
    retention: usize,
}

impl TaskTable {
    fn new(retention: usize) -> Self {
        Self {
            states: HashMap::new(),
            order: VecDeque::new(),
            reported: HashSet::new(),
            retention: retention.max(1),
        }
    }

    fn insert(&mut self, task_id: &str) {
        self.states.insert(task_id.to_string(), TaskState::Pending);
        self.order.push_back(task_id.to_string());
        self.evict();
    }

    fn set(&mut self, task_id: &str, state: TaskState) {
        if let Some(current) = self.states.get_mut(task_id) {
            *current = state;
        }
        if state.is_terminal() {
            self.evict();
        }
    }

    /// Returns a task's state, remembering that a terminal state was seen
    fn report(&mut self, task_id: &str) -> Option<TaskState> {
        let state = *self.states.get(task_id)?;
        if state.is_terminal() {
            self.reported.insert(task_id.to_string());
        }
        Some(state)
    }

    /// Drops terminal tasks while over retention, oldest reported ones first
    fn evict(&mut self) {
        while self.states.len() > self.retention {
            let is_done = |id: &String| {
                self.states
                    .get(id)
                    .map(TaskState::is_terminal)
                    .unwrap_or(true)
            };
            let victim = self
                .order
                .iter()
                .position(|id| is_done(id) && self.reported.contains(id))
                .or_else(|| self.order.iter().position(is_done));
            let Some(index) = victim else {
                break;
            };
            if let Some(id) = self.order.remove(index) {
                self.states.remove(&id);
                self.reported.remove(&id);
            }
        }
    }
}

fn lock(tasks: &Mutex<TaskTable>) -> MutexGuard<'_, TaskTable> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalPool {
    pub fn new(
        queue: impl Into<String>,
        context: Arc<WorkerContext>,
        max_concurrent: usize,
        retention: usize,
    ) -> Self {
        Self {
            queue: queue.into(),
            context,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: Arc::new(Mutex::new(TaskTable::new(retention))),
        }
    }

    fn spawn(&self, task_id: String, request: TaskRequest) {
        let context = Arc::clone(&self.context);
        let permits = Arc::clone(&self.permits);
        let tasks = Arc::clone(&self.tasks);
        let id = task_id.clone();

        let worker = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return TaskState::Failed;
            };
            lock(&tasks).set(&id, TaskState::Running);
            tracing::debug!("Task {} running", id);

            match run_task(&context, &request).await {
                Ok(written) => {
                    tracing::debug!("Task {} finished with {} records", id, written);
                    TaskState::Finished
                }
                Err(e) => {
                    tracing::warn!("Task {} failed: {}", id, e);
                    TaskState::Failed
                }
            }
        });

        let tasks = Arc::clone(&self.tasks);
        tokio::spawn(async move {
            let state = match worker.await {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Task {} aborted: {}", task_id, e);
                    TaskState::Failed
                }
            };
            lock(&tasks).set(&task_id, state);
        });
    }
}

#[async_trait]
impl WorkerPool for LocalPool {
    async fn schedule(
        &self,
        queue: &str,
        task_name: &str,
        params: &[(String, String)],
    ) -> Result<String, PoolError> {
        if queue != self.queue {
            return Err(PoolError::Rejected(format!("unknown queue '{}'", queue)));
        }
        let kind = WorkerKind::from_task_name(task_name)
            .ok_or_else(|| PoolError::Rejected(format!("unknown task '{}'", task_name)))?;

        let params: HashMap<String, String> = params.iter().cloned().collect();
        let request = TaskRequest::from_params(kind, &params)
            .map_err(|e| PoolError::Rejected(e.to_string()))?;

        let task_id = Uuid::new_v4().to_string();
        lock(&self.tasks).insert(&task_id);
        self.spawn(task_id.clone(), request);

        Ok(task_id)
    }

    async fn status(&self, queue: &str, task_id: &str) -> Result<String, PoolError> {
        if queue != self.queue {
            return Err(PoolError::Rejected(format!("unknown queue '{}'", queue)));
        }
        Ok(lock(&self.tasks)
            .report(task_id)
            .map(|state| state.as_str().to_string())
            .unwrap_or_default())
    }
}
