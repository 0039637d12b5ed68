//! Service layer for task creation, status transitions and history lookup.

use crate::task::{
    domain::{
        ActorSnapshot, DedupKey, EventMeta, NewTask, ParseTaskStatusError, ScheduleDay, Task,
        TaskDomainError, TaskEvent, TaskId, TaskLocation, TaskStatus, TaskType, WeightKg,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a manual task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    location: TaskLocation,
    scheduled_for: Option<DateTime<Utc>>,
    dedup_key: Option<String>,
    actor: ActorSnapshot,
}

impl CreateTaskRequest {
    /// Creates a request for a task at the given location.
    #[must_use]
    pub fn new(location: TaskLocation) -> Self {
        Self {
            location,
            scheduled_for: None,
            dedup_key: None,
            actor: ActorSnapshot::system(),
        }
    }

    /// Sets when the collection is due.
    #[must_use]
    pub const fn with_scheduled_for(mut self, scheduled_for: DateTime<Utc>) -> Self {
        self.scheduled_for = Some(scheduled_for);
        self
    }

    /// Sets a caller-chosen dedup key.
    #[must_use]
    pub fn with_dedup_key(mut self, dedup_key: impl Into<String>) -> Self {
        self.dedup_key = Some(dedup_key.into());
        self
    }

    /// Sets the creating actor.
    #[must_use]
    pub fn with_actor(mut self, actor: ActorSnapshot) -> Self {
        self.actor = actor;
        self
    }
}

/// Request payload for moving a task to another status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_status: String,
    actor: ActorSnapshot,
    meta: EventMeta,
    weight: Option<WeightKg>,
}

impl TransitionTaskRequest {
    /// Creates a request to move `task_id` to `target_status`.
    ///
    /// The actor defaults to the system marker until [`Self::with_actor`]
    /// supplies the caller's identity.
    #[must_use]
    pub fn new(task_id: TaskId, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            target_status: target_status.into(),
            actor: ActorSnapshot::system(),
            meta: EventMeta::new(),
            weight: None,
        }
    }

    /// Sets the acting identity captured on the event.
    #[must_use]
    pub fn with_actor(mut self, actor: ActorSnapshot) -> Self {
        self.actor = actor;
        self
    }

    /// Sets the event metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: EventMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Records a weight with the transition.
    #[must_use]
    pub const fn with_weight(mut self, weight: WeightKg) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Returns the target task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// A successful transition: the updated task and the event it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// Task after the transition.
    pub task: Task,
    /// Audit event appended for the transition.
    pub event: TaskEvent,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The requested target status string is not a known status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Returns `true` when the error is a dedup-key collision.
    #[must_use]
    pub const fn is_duplicate_dedup_key(&self) -> bool {
        matches!(
            self,
            Self::Repository(TaskRepositoryError::DuplicateDedupKey(_))
        )
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the clock used to stamp tasks and events.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates a manual task and records its creation event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an invalid dedup key and
    /// [`TaskLifecycleError::Repository`] when persistence fails, including
    /// dedup-key collisions.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let dedup_key = request.dedup_key.map(DedupKey::new).transpose()?;
        let new_task = NewTask {
            task_type: TaskType::Manual,
            dedup_key,
            location: request.location,
            scheduled_for: request.scheduled_for,
        };
        self.create(new_task, request.actor, EventMeta::new()).await
    }

    /// Creates an `OPEN` task of any type and records its creation event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails,
    /// including [`TaskRepositoryError::DuplicateDedupKey`].
    pub async fn create(
        &self,
        new_task: NewTask,
        actor: ActorSnapshot,
        meta: EventMeta,
    ) -> TaskLifecycleResult<Task> {
        let task = Task::new(new_task, &*self.clock);
        let event = TaskEvent::created(&task, actor, meta);
        self.repository.insert(&task, &event).await?;
        debug!(
            task_id = %task.id(),
            task_type = %task.task_type(),
            dedup_key = task.dedup_key().map(DedupKey::as_str),
            "task created"
        );
        Ok(task)
    }

    /// Validates and applies a status transition, appending one event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] for an unknown target,
    /// [`TaskLifecycleError::NotFound`] for an unknown task,
    /// [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::InvalidTransition`] when the graph forbids the
    /// change, and [`TaskLifecycleError::Repository`] for conflicts and
    /// persistence failures.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let TransitionTaskRequest {
            task_id,
            target_status,
            actor,
            meta,
            weight,
        } = request;
        let target = TaskStatus::try_from(target_status.as_str())?;

        let mut task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))?;

        let from = task.transition_to(target, weight, &*self.clock)?;
        let event_meta = match weight {
            Some(recorded) if meta.weight_kg.is_none() => meta.with_weight_kg(recorded.value()),
            _ => meta,
        };
        let event = TaskEvent::transitioned(&task, from, actor, event_meta);
        self.repository
            .record_transition(&task, from, &event)
            .await?;

        info!(
            task_id = %task_id,
            from = %from,
            to = %target,
            actor_role = %event.actor().role,
            "task transitioned"
        );
        Ok(TransitionOutcome { task, event })
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Returns the audit history of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn history(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<TaskEvent>> {
        if self.repository.find_by_id(task_id).await?.is_none() {
            return Err(TaskLifecycleError::NotFound(task_id));
        }
        Ok(self.repository.events_for_task(task_id).await?)
    }

    /// Returns tasks whose dedup key belongs to `day`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn tasks_for_day(&self, day: ScheduleDay) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_dedup_day(day).await?)
    }

    /// Returns `OPEN` daily tasks left over from days other than `today`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn stale_daily_tasks(&self, today: ScheduleDay) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_stale_daily(today).await?)
    }
}
