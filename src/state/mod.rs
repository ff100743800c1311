//! State module for tracking task progress
//!
//! `TaskState` is the single lifecycle vocabulary shared by the worker pools,
//! the poller and the aggregator.

mod task_state;

pub use task_state::TaskState;
