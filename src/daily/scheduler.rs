//! Single-slot driver that runs daily generation on a timer and on demand.

use super::generator::{GenerationJob, GenerationSummary};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Delay before the first run after startup.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(5);

/// Period between scheduled runs.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// What caused a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// First run after startup.
    Startup,
    /// Periodic timer tick.
    Interval,
    /// Explicit request, such as the admin endpoint.
    Manual,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Startup => "startup",
            Self::Interval => "interval",
            Self::Manual => "manual",
        };
        f.write_str(label)
    }
}

/// Errors returned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Another run holds the slot; the trigger was dropped.
    #[error("a daily generation run is already in progress")]
    RunInProgress,
    /// The run task ended without producing a summary.
    #[error("the daily generation run was aborted")]
    RunAborted,
    /// The configured interval was zero.
    #[error("scheduler interval must be greater than zero")]
    ZeroInterval,
}

/// Timer settings for [`DailyScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    startup_delay: Duration,
    interval: Duration,
}

impl ScheduleSettings {
    /// Creates validated timer settings.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroInterval`] when `interval` is zero.
    pub const fn new(
        startup_delay: Duration,
        interval: Duration,
    ) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        Ok(Self {
            startup_delay,
            interval,
        })
    }

    /// Returns the delay before the first run.
    #[must_use]
    pub const fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    /// Returns the period between runs.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            startup_delay: DEFAULT_STARTUP_DELAY,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Runs a [`GenerationJob`] at most once at a time.
///
/// Triggers that arrive while a run holds the slot are dropped rather than
/// queued; the next tick reconciles whatever they would have done. Each run
/// executes on its own task and keeps the slot until it finishes, even when
/// the caller stops waiting.
pub struct DailyScheduler<J>
where
    J: GenerationJob,
{
    job: Arc<J>,
    settings: ScheduleSettings,
    run_slot: Arc<Mutex<()>>,
}

impl<J> DailyScheduler<J>
where
    J: GenerationJob,
{
    /// Creates a scheduler for `job`.
    #[must_use]
    pub fn new(job: J, settings: ScheduleSettings) -> Self {
        Self {
            job: Arc::new(job),
            settings,
            run_slot: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the timer settings.
    #[must_use]
    pub const fn settings(&self) -> ScheduleSettings {
        self.settings
    }

    /// Returns `true` while a run holds the slot.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_slot.try_lock().is_err()
    }
}

impl<J> DailyScheduler<J>
where
    J: GenerationJob + 'static,
{
    /// Runs the job now unless another run is in progress.
    ///
    /// The run is spawned onto the runtime; dropping the returned future
    /// abandons only the wait for its summary.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::RunInProgress`] when the slot is taken and
    /// [`SchedulerError::RunAborted`] when the run task panicked or was
    /// cancelled by runtime shutdown.
    pub async fn trigger(
        &self,
        source: TriggerSource,
    ) -> Result<GenerationSummary, SchedulerError> {
        let Ok(slot) = Arc::clone(&self.run_slot).try_lock_owned() else {
            debug!(source = %source, "generation run already in progress");
            return Err(SchedulerError::RunInProgress);
        };
        info!(source = %source, "daily task generation started");

        let job = Arc::clone(&self.job);
        let run = tokio::spawn(async move {
            let summary = job.run_now().await;
            drop(slot);
            summary
        });
        run.await.map_err(|err| {
            error!(source = %source, error = %err, "daily task generation run aborted");
            SchedulerError::RunAborted
        })
    }

    /// Starts the timer loop: one run after the startup delay, then one per
    /// interval.
    ///
    /// The loop runs until the returned handle is aborted.
    #[must_use]
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let first = Instant::now() + self.settings.startup_delay;
            let mut ticks = tokio::time::interval_at(first, self.settings.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                startup_delay_secs = self.settings.startup_delay.as_secs(),
                interval_secs = self.settings.interval.as_secs(),
                "daily scheduler started"
            );

            let mut source = TriggerSource::Startup;
            loop {
                ticks.tick().await;
                if let Err(err) = self.trigger(source).await {
                    warn!(source = %source, error = %err, "scheduled run skipped");
                }
                source = TriggerSource::Interval;
            }
        })
    }
}
