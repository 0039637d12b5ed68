//! Activity feed and summary service.

use super::{
    domain::{ActivityFilter, ActivityPage, PageRequest, TaskSummary, TimeWindow},
    ports::{ActivityRepository, ActivityRepositoryError},
};
use crate::task::domain::{
    DepartmentId, HallId, MaterialId, ScheduleDay, StationId, TaskDomainError, TaskId,
    TaskStatus, UserId,
};
use chrono::FixedOffset;
use std::sync::Arc;
use thiserror::Error;

/// Caller-facing activity query expressed in business-timezone days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// First day to include.
    pub from: Option<ScheduleDay>,
    /// Last day to include.
    pub to: Option<ScheduleDay>,
    /// Restricts to a single task.
    pub task_id: Option<TaskId>,
    /// Material filter.
    pub material_id: Option<MaterialId>,
    /// Station filter.
    pub station_id: Option<StationId>,
    /// Hall filter.
    pub hall_id: Option<HallId>,
    /// Acting user filter.
    pub actor_user_id: Option<UserId>,
    /// Acting department filter.
    pub actor_department_id: Option<DepartmentId>,
    /// Resulting status filter.
    pub action: Option<TaskStatus>,
    /// Requested page.
    pub page: PageRequest,
}

/// Errors returned by the activity service.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The day range ends before it starts.
    #[error("invalid day range: {from} is after {to}")]
    InvalidRange {
        /// First requested day.
        from: ScheduleDay,
        /// Last requested day.
        to: ScheduleDay,
    },
    /// A day could not be mapped to an instant.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ActivityRepositoryError),
}

/// Result type for activity service operations.
pub type ActivityResult<T> = Result<T, ActivityError>;

/// Read-only reporting over tasks and their audit events.
pub struct ActivityService<A>
where
    A: ActivityRepository,
{
    repository: Arc<A>,
    offset: FixedOffset,
}

impl<A> Clone for ActivityService<A>
where
    A: ActivityRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            offset: self.offset,
        }
    }
}

impl<A> ActivityService<A>
where
    A: ActivityRepository,
{
    /// Creates a service interpreting days at `offset`.
    #[must_use]
    pub const fn new(repository: Arc<A>, offset: FixedOffset) -> Self {
        Self { repository, offset }
    }

    /// Returns one page of the activity feed, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidRange`] for an inverted range and
    /// [`ActivityError::Repository`] when the query fails.
    pub async fn activity(&self, query: ActivityQuery) -> ActivityResult<ActivityPage> {
        let filter = ActivityFilter {
            window: self.window(query.from, query.to)?,
            task_id: query.task_id,
            material_id: query.material_id,
            station_id: query.station_id,
            hall_id: query.hall_id,
            actor_user_id: query.actor_user_id,
            actor_department_id: query.actor_department_id,
            action: query.action,
        };
        let (events, total) = self.repository.query_events(&filter, query.page).await?;
        Ok(ActivityPage {
            events,
            pagination: query.page.paginate(total),
        })
    }

    /// Summarises tasks created between `from` and `to`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidRange`] for an inverted range and
    /// [`ActivityError::Repository`] when the query fails.
    pub async fn summary(
        &self,
        from: Option<ScheduleDay>,
        to: Option<ScheduleDay>,
    ) -> ActivityResult<TaskSummary> {
        let window = self.window(from, to)?;
        Ok(self.repository.summarize(window).await?)
    }

    /// Maps an inclusive day range onto a half-open UTC window.
    fn window(
        &self,
        from: Option<ScheduleDay>,
        to: Option<ScheduleDay>,
    ) -> ActivityResult<TimeWindow> {
        if let (Some(first), Some(last)) = (from, to) {
            if first > last {
                return Err(ActivityError::InvalidRange {
                    from: first,
                    to: last,
                });
            }
        }
        let start = from.map(|day| day.start_utc(self.offset)).transpose()?;
        let end = to
            .and_then(ScheduleDay::succ)
            .map(|day| day.start_utc(self.offset))
            .transpose()?;
        Ok(TimeWindow {
            from: start,
            before: end,
        })
    }
}
