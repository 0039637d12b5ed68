//! Daily task generation and the scheduler that drives it.
//!
//! [`generator::DailyTaskGenerator`] holds the idempotent generation logic;
//! [`scheduler::DailyScheduler`] runs it after startup, on an interval and on
//! demand, one run at a time.

pub mod generator;
pub mod scheduler;

pub use generator::{
    AUTO_CANCEL_REASON, DailyTaskGenerator, GenerationFailure, GenerationJob, GenerationStage,
    GenerationSummary,
};
pub use scheduler::{DailyScheduler, ScheduleSettings, SchedulerError, TriggerSource};
