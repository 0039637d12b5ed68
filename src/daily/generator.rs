//! Idempotent daily task generation.
//!
//! A run cancels `OPEN` daily tasks left over from earlier days and creates
//! one `OPEN` task per eligible stand for the current business day. The
//! dedup-key constraint of the task store is the only authority on whether
//! a stand already has today's task, so concurrent or repeated runs never
//! produce duplicates.

use crate::stand::{domain::Stand, ports::StandRepository};
use crate::task::{
    domain::{
        ActorSnapshot, DedupKey, EventMeta, NewTask, ScheduleDay, Task, TaskStatus, TaskType,
    },
    ports::TaskRepository,
    services::{TaskLifecycleError, TaskLifecycleService, TransitionTaskRequest},
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use mockable::Clock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Reason recorded on events of auto-cancelled stale tasks.
pub const AUTO_CANCEL_REASON: &str = "Auto-cancelled: New daily task generated";

/// Step of a run at which a failure was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    /// Looking up stale daily tasks.
    LookupStale,
    /// Cancelling one stale task.
    Cancel,
    /// Looking up eligible stands.
    LookupStands,
    /// Creating one stand's task.
    Create,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LookupStale => "lookup_stale",
            Self::Cancel => "cancel",
            Self::LookupStands => "lookup_stands",
            Self::Create => "create",
        };
        f.write_str(label)
    }
}

/// One item a run could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFailure {
    /// Step that failed.
    pub stage: GenerationStage,
    /// Task or stand the step was working on, if any.
    pub subject: Option<String>,
    /// Error description.
    pub message: String,
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    /// Business day the run generated tasks for.
    pub day: ScheduleDay,
    /// Stale tasks moved to `CANCELLED`.
    pub cancelled: u32,
    /// Tasks created.
    pub created: u32,
    /// Eligible stands that already had today's task.
    pub already_present: u32,
    /// Items that failed; they never abort the rest of the run.
    pub failures: Vec<GenerationFailure>,
}

impl GenerationSummary {
    const fn new(day: ScheduleDay) -> Self {
        Self {
            day,
            cancelled: 0,
            created: 0,
            already_present: 0,
            failures: Vec::new(),
        }
    }

    fn record_failure(
        &mut self,
        stage: GenerationStage,
        subject: Option<String>,
        err: &impl fmt::Display,
    ) {
        warn!(
            stage = %stage,
            subject = subject.as_deref(),
            error = %err,
            "daily generation step failed"
        );
        self.failures.push(GenerationFailure {
            stage,
            subject,
            message: err.to_string(),
        });
    }
}

/// A job the scheduler can run on its single slot.
#[async_trait]
pub trait GenerationJob: Send + Sync {
    /// Runs one generation pass for the current instant.
    async fn run_now(&self) -> GenerationSummary;
}

/// Daily task generator.
pub struct DailyTaskGenerator<R, S, C>
where
    R: TaskRepository,
    S: StandRepository,
    C: Clock + Send + Sync,
{
    lifecycle: TaskLifecycleService<R, C>,
    stands: Arc<S>,
    offset: FixedOffset,
}

impl<R, S, C> Clone for DailyTaskGenerator<R, S, C>
where
    R: TaskRepository,
    S: StandRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            stands: Arc::clone(&self.stands),
            offset: self.offset,
        }
    }
}

impl<R, S, C> DailyTaskGenerator<R, S, C>
where
    R: TaskRepository,
    S: StandRepository,
    C: Clock + Send + Sync,
{
    /// Creates a generator whose business day is evaluated at `offset`.
    #[must_use]
    pub const fn new(
        lifecycle: TaskLifecycleService<R, C>,
        stands: Arc<S>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            lifecycle,
            stands,
            offset,
        }
    }

    /// Returns the business day containing `reference`.
    #[must_use]
    pub fn day_of(&self, reference: DateTime<Utc>) -> ScheduleDay {
        ScheduleDay::from_reference(reference, self.offset)
    }

    /// Runs generation for the business day containing `reference`.
    ///
    /// Individual failures are collected in the summary and never stop the
    /// remaining work. A run repeated for the same day changes nothing.
    pub async fn run(&self, reference: DateTime<Utc>) -> GenerationSummary {
        let today = self.day_of(reference);
        let mut summary = GenerationSummary::new(today);

        self.cancel_stale(today, &mut summary).await;
        self.create_for_eligible(today, &mut summary).await;

        info!(
            day = %summary.day,
            cancelled = summary.cancelled,
            created = summary.created,
            already_present = summary.already_present,
            failures = summary.failures.len(),
            "daily task generation finished"
        );
        summary
    }

    async fn cancel_stale(&self, today: ScheduleDay, summary: &mut GenerationSummary) {
        let stale = match self.lifecycle.stale_daily_tasks(today).await {
            Ok(stale) => stale,
            Err(err) => {
                summary.record_failure(GenerationStage::LookupStale, None, &err);
                return;
            }
        };

        for task in stale {
            let request = TransitionTaskRequest::new(task.id(), TaskStatus::Cancelled.as_str())
                .with_meta(EventMeta::new().with_reason(AUTO_CANCEL_REASON));
            match self.lifecycle.transition_task(request).await {
                Ok(_) => summary.cancelled = summary.cancelled.saturating_add(1),
                Err(err) => summary.record_failure(
                    GenerationStage::Cancel,
                    Some(task.id().to_string()),
                    &err,
                ),
            }
        }
    }

    async fn create_for_eligible(&self, today: ScheduleDay, summary: &mut GenerationSummary) {
        let stands = match self.stands.find_eligible_for_daily().await {
            Ok(stands) => stands,
            Err(err) => {
                summary.record_failure(GenerationStage::LookupStands, None, &err);
                return;
            }
        };
        let scheduled_for = match today.start_utc(self.offset) {
            Ok(start) => Some(start),
            Err(err) => {
                summary.record_failure(GenerationStage::Create, None, &err);
                None
            }
        };

        for stand in stands {
            match self.create_for_stand(&stand, today, scheduled_for).await {
                Ok(_) => summary.created = summary.created.saturating_add(1),
                Err(err) if err.is_duplicate_dedup_key() => {
                    summary.already_present = summary.already_present.saturating_add(1);
                }
                Err(err) => summary.record_failure(
                    GenerationStage::Create,
                    Some(stand.id().to_string()),
                    &err,
                ),
            }
        }
    }

    async fn create_for_stand(
        &self,
        stand: &Stand,
        today: ScheduleDay,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Result<Task, TaskLifecycleError> {
        let new_task = NewTask {
            task_type: TaskType::DailyFull,
            dedup_key: Some(DedupKey::daily(stand.id(), today)?),
            location: stand.location(),
            scheduled_for,
        };
        self.lifecycle
            .create(new_task, ActorSnapshot::system(), EventMeta::new())
            .await
    }
}

#[async_trait]
impl<R, S, C> GenerationJob for DailyTaskGenerator<R, S, C>
where
    R: TaskRepository,
    S: StandRepository,
    C: Clock + Send + Sync,
{
    async fn run_now(&self) -> GenerationSummary {
        let reference = self.lifecycle.clock().utc();
        self.run(reference).await
    }
}
