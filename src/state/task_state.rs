/// Task lifecycle states reported by a worker pool
///
/// Backends describe task progress with their own vocabulary; everything is
/// normalized into these four states at the pool boundary.
use serde::Serialize;
use std::fmt;

/// Represents the current lifecycle state of a dispatched task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task is queued and waiting for a worker
    Pending,

    /// Task is executing
    Running,

    /// Task completed; its records are all written
    Finished,

    /// Task stopped without completing
    Failed,
}

impl TaskState {
    /// Returns true once no further polling is needed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Canonical lowercase name (`pending`, `running`, `finished`, `failed`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }

    /// Normalizes a backend state string
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns None for anything unrecognized, including the empty string
    /// job-queue clients report for task ids they do not know.
    pub fn from_backend(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "scheduled" => Some(Self::Pending),
            "running" | "started" | "active" => Some(Self::Running),
            "finished" | "done" | "complete" | "completed" | "success" => Some(Self::Finished),
            "failed" | "error" | "errored" | "cancelled" | "canceled" | "crashed" => {
                Some(Self::Failed)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
