//! Shared handler state.

use crate::activity::{ports::ActivityRepository, services::ActivityService};
use crate::daily::{DailyScheduler, DailyTaskGenerator};
use crate::stand::ports::StandRepository;
use crate::task::{ports::TaskRepository, services::TaskLifecycleService};
use chrono::FixedOffset;
use mockable::Clock;
use std::sync::Arc;

/// Store backing both the task lifecycle and the activity feed.
pub trait TaskStore: TaskRepository + ActivityRepository + 'static {}

impl<T> TaskStore for T where T: TaskRepository + ActivityRepository + 'static {}

/// Scheduler type served by the API.
pub type ApiScheduler<R, S, C> = DailyScheduler<DailyTaskGenerator<R, S, C>>;

/// Services shared by all handlers.
pub struct AppState<R, S, C>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    lifecycle: TaskLifecycleService<R, C>,
    activity: ActivityService<R>,
    scheduler: Arc<ApiScheduler<R, S, C>>,
    offset: FixedOffset,
    admin_token: Option<Arc<str>>,
}

impl<R, S, C> Clone for AppState<R, S, C>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            activity: self.activity.clone(),
            scheduler: Arc::clone(&self.scheduler),
            offset: self.offset,
            admin_token: self.admin_token.clone(),
        }
    }
}

impl<R, S, C> AppState<R, S, C>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates handler state without an admin token.
    #[must_use]
    pub const fn new(
        lifecycle: TaskLifecycleService<R, C>,
        activity: ActivityService<R>,
        scheduler: Arc<ApiScheduler<R, S, C>>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            lifecycle,
            activity,
            scheduler,
            offset,
            admin_token: None,
        }
    }

    /// Sets the bearer token accepted by admin endpoints; `None` refuses
    /// every admin call.
    #[must_use]
    pub fn with_admin_token(mut self, token: Option<Arc<str>>) -> Self {
        self.admin_token = token;
        self
    }

    /// Returns the task lifecycle service.
    #[must_use]
    pub const fn lifecycle(&self) -> &TaskLifecycleService<R, C> {
        &self.lifecycle
    }

    /// Returns the activity service.
    #[must_use]
    pub const fn activity(&self) -> &ActivityService<R> {
        &self.activity
    }

    /// Returns the generation scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<ApiScheduler<R, S, C>> {
        &self.scheduler
    }

    /// Returns the business timezone.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns `true` when `presented` equals the configured admin token.
    #[must_use]
    pub fn admin_token_matches(&self, presented: &str) -> bool {
        self.admin_token
            .as_deref()
            .is_some_and(|expected| !expected.is_empty() && tokens_match(expected, presented))
    }
}

/// Compares tokens without short-circuiting on the first differing byte.
fn tokens_match(expected: &str, presented: &str) -> bool {
    let (left, right) = (expected.as_bytes(), presented.as_bytes());
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
