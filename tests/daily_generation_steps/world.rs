//! Shared world state for daily generation BDD scenarios.

use std::sync::Arc;

use crate::test_helpers::{ManualClock, business_offset, utc};
use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use rstest::fixture;
use wastetrack::daily::{DailyTaskGenerator, GenerationSummary};
use wastetrack::stand::adapters::memory::InMemoryStandRepository;
use wastetrack::task::{
    adapters::memory::InMemoryTaskRepository, domain::ScheduleDay, services::TaskLifecycleService,
};

/// Generator type used by the BDD world.
pub type TestGenerator =
    DailyTaskGenerator<InMemoryTaskRepository, InMemoryStandRepository, ManualClock>;

/// Scenario world for daily generation behaviour tests.
pub struct GenerationWorld {
    pub stands: Arc<InMemoryStandRepository>,
    pub clock: Arc<ManualClock>,
    pub lifecycle: TaskLifecycleService<InMemoryTaskRepository, ManualClock>,
    pub generator: TestGenerator,
    pub last_summary: Option<GenerationSummary>,
}

impl GenerationWorld {
    /// Creates a world with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let stands = Arc::new(InMemoryStandRepository::new());
        let clock = Arc::new(ManualClock::at(utc(2025, 12, 12, 6, 0)));
        let lifecycle = TaskLifecycleService::new(tasks, Arc::clone(&clock));
        let generator =
            DailyTaskGenerator::new(lifecycle.clone(), Arc::clone(&stands), business_offset());

        Self {
            stands,
            clock,
            lifecycle,
            generator,
            last_summary: None,
        }
    }

    /// Moves the clock to 06:00 UTC on `day`.
    pub fn set_business_day(&self, day: &str) -> eyre::Result<()> {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")?;
        let morning = NaiveTime::from_hms_opt(6, 0, 0)
            .ok_or_else(|| eyre::eyre!("invalid time of day"))?;
        self.clock.set(date.and_time(morning).and_utc());
        Ok(())
    }

    /// Returns the business day the clock currently falls on.
    pub fn today(&self) -> ScheduleDay {
        self.generator.day_of(self.clock.utc())
    }

    /// Returns the summary of the most recent run or fails the step.
    pub fn summary(&self) -> eyre::Result<&GenerationSummary> {
        self.last_summary
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no generation run in scenario world"))
    }
}

impl Default for GenerationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> GenerationWorld {
    GenerationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
