//! Error types for task domain validation and parsing.

use super::{TaskEventId, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status change is not an edge of the lifecycle graph.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status the task is currently in.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
    },

    /// An event sequence is not a valid walk of the lifecycle graph.
    #[error("event {event_id} does not follow the recorded history of task {task_id}")]
    InconsistentHistory {
        /// Task whose history was replayed.
        task_id: TaskId,
        /// First event that could not be applied.
        event_id: TaskEventId,
    },

    /// An identifier was empty after trimming.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Human-readable identifier kind, such as `stand`.
        kind: &'static str,
    },

    /// A dedup key did not follow the `PREFIX:subject:YYYY-MM-DD` shape.
    #[error("invalid dedup key '{0}'")]
    InvalidDedupKey(String),

    /// A weight was negative or not finite.
    #[error("invalid weight {0} kg, expected a finite non-negative value")]
    InvalidWeight(String),

    /// A schedule day could not be parsed.
    #[error("invalid schedule day '{0}', expected YYYY-MM-DD")]
    InvalidScheduleDay(String),
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);
