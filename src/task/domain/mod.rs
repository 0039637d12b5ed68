//! Domain model for collection task lifecycle management.
//!
//! The task domain models the eight-status collection lifecycle, its
//! append-only audit events and the dedup keys used by daily generation,
//! while keeping all infrastructure concerns outside of the domain boundary.

mod error;
mod event;
mod ids;
mod schedule;
mod status;
mod task;

pub use error::{ParseTaskStatusError, ParseTaskTypeError, TaskDomainError};
pub use event::{
    ActorRole, ActorSnapshot, EventMeta, PersistedTaskEventData, SYSTEM_ROLE, TaskEvent,
    replay_status,
};
pub use ids::{DepartmentId, HallId, MaterialId, StandId, StationId, TaskEventId, TaskId, UserId};
pub use schedule::{DedupKey, ScheduleDay};
pub use status::{TaskStatus, TaskType};
pub use task::{NewTask, PersistedTaskData, StageTimestamps, Task, TaskLocation, WeightKg};
