//! Read-only repository port over the task audit log.

use super::domain::{ActivityFilter, PageRequest, TaskSummary, TimeWindow};
use crate::task::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity repository operations.
pub type ActivityRepositoryResult<T> = Result<T, ActivityRepositoryError>;

/// Query contract for the activity feed and summaries.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Returns one page of matching events, newest first, and the total
    /// number of matching events.
    async fn query_events(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> ActivityRepositoryResult<(Vec<TaskEvent>, u64)>;

    /// Summarises tasks created within `window`.
    async fn summarize(&self, window: TimeWindow) -> ActivityRepositoryResult<TaskSummary>;
}

/// Errors returned by activity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
