//! Repository port for task persistence, lookup and the audit event log.

use crate::task::domain::{DedupKey, ScheduleDay, Task, TaskEvent, TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Task rows and their events are written together: every method that
/// changes a task also appends its event in the same atomic unit.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its creation event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateDedupKey`] when another task
    /// already holds the dedup key, or [`TaskRepositoryError::DuplicateTask`]
    /// when the task ID already exists. Nothing is written in either case.
    async fn insert(&self, task: &Task, created: &TaskEvent) -> TaskRepositoryResult<()>;

    /// Persists a transition and appends its event.
    ///
    /// The row is only updated while its stored status still equals
    /// `expected`, which serialises concurrent writers on the same task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::Conflict`] when another writer changed the
    /// status first. Neither the row nor the log changes in those cases.
    async fn record_transition(
        &self,
        task: &Task,
        expected: TaskStatus,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns `OPEN` daily tasks whose dedup key does not end with `:{today}`.
    async fn find_stale_daily(&self, today: ScheduleDay) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks whose dedup key ends with `:{day}`, in any status.
    async fn find_by_dedup_day(&self, day: ScheduleDay) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the events of a task, oldest first.
    async fn events_for_task(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task with the same dedup key already exists.
    #[error("duplicate dedup key: {0}")]
    DuplicateDedupKey(DedupKey),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer changed the task status first.
    #[error("task {task_id} is no longer in status {expected}")]
    Conflict {
        /// Task that lost the race.
        task_id: TaskId,
        /// Status the writer expected to replace.
        expected: TaskStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
