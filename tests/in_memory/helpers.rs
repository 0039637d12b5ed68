//! In-memory service stack shared by the integration tests in this suite.

use std::sync::Arc;

use crate::test_helpers::{ManualClock, business_offset, utc};
use rstest::fixture;
use wastetrack::activity::services::ActivityService;
use wastetrack::daily::DailyTaskGenerator;
use wastetrack::stand::{
    adapters::memory::InMemoryStandRepository, domain::Stand, ports::StandRepository,
};
use wastetrack::task::{
    adapters::memory::InMemoryTaskRepository, domain::ScheduleDay,
    services::TaskLifecycleService,
};

/// Lifecycle service over the in-memory task store.
pub type Lifecycle = TaskLifecycleService<InMemoryTaskRepository, ManualClock>;

/// Generator over the in-memory stores.
pub type Generator = DailyTaskGenerator<InMemoryTaskRepository, InMemoryStandRepository, ManualClock>;

/// Services wired to shared in-memory stores and a manual clock.
pub struct Stack {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub stands: Arc<InMemoryStandRepository>,
    pub clock: Arc<ManualClock>,
    pub lifecycle: Lifecycle,
    pub generator: Generator,
    pub activity: ActivityService<InMemoryTaskRepository>,
}

impl Stack {
    /// Stores each stand, failing the test on error.
    pub async fn seed(&self, stands: impl IntoIterator<Item = Stand>) -> eyre::Result<()> {
        for stand in stands {
            self.stands.store(&stand).await?;
        }
        Ok(())
    }
}

/// Provides a fresh stack with the clock at 06:00 UTC on 2025-12-12.
#[fixture]
pub fn stack() -> Stack {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let stands = Arc::new(InMemoryStandRepository::new());
    let clock = Arc::new(ManualClock::at(utc(2025, 12, 12, 6, 0)));
    let lifecycle = TaskLifecycleService::new(Arc::clone(&tasks), Arc::clone(&clock));
    Stack {
        generator: DailyTaskGenerator::new(
            lifecycle.clone(),
            Arc::clone(&stands),
            business_offset(),
        ),
        activity: ActivityService::new(Arc::clone(&tasks), business_offset()),
        lifecycle,
        tasks,
        stands,
        clock,
    }
}

/// Parses a `YYYY-MM-DD` day.
pub fn day(value: &str) -> ScheduleDay {
    ScheduleDay::parse(value).expect("valid day")
}
