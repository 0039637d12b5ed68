//! Shared world state for task status transition BDD scenarios.

use std::sync::Arc;

use crate::test_helpers::{ManualClock, utc};
use rstest::fixture;
use wastetrack::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService, TransitionOutcome},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, ManualClock>;

/// Scenario world for task transition behaviour tests.
pub struct TaskTransitionWorld {
    pub service: TestTaskService,
    pub task: Option<Task>,
    pub last_transition_result: Option<Result<TransitionOutcome, TaskLifecycleError>>,
}

impl TaskTransitionWorld {
    /// Creates a world with no task yet.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(ManualClock::at(utc(2025, 12, 12, 8, 0))),
        );

        Self {
            service,
            task: None,
            last_transition_result: None,
        }
    }

    /// Returns the scenario task or fails the step.
    pub fn task(&self) -> eyre::Result<&Task> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for TaskTransitionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskTransitionWorld {
    TaskTransitionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
