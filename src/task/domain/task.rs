//! Task aggregate root and related lifecycle value types.

use super::{
    DedupKey, HallId, MaterialId, StandId, StationId, TaskDomainError, TaskId, TaskStatus,
    TaskType,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a task's container is collected from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLocation {
    /// Stand the container belongs to.
    pub stand_id: Option<StandId>,
    /// Station the stand is attached to.
    pub station_id: Option<StationId>,
    /// Material collected at the stand.
    pub material_id: Option<MaterialId>,
    /// Hall containing the station.
    pub hall_id: Option<HallId>,
}

impl TaskLocation {
    /// Creates an empty location.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            stand_id: None,
            station_id: None,
            material_id: None,
            hall_id: None,
        }
    }

    /// Sets the stand.
    #[must_use]
    pub fn with_stand(mut self, stand_id: StandId) -> Self {
        self.stand_id = Some(stand_id);
        self
    }

    /// Sets the station.
    #[must_use]
    pub fn with_station(mut self, station_id: StationId) -> Self {
        self.station_id = Some(station_id);
        self
    }

    /// Sets the material.
    #[must_use]
    pub fn with_material(mut self, material_id: MaterialId) -> Self {
        self.material_id = Some(material_id);
        self
    }

    /// Sets the hall.
    #[must_use]
    pub fn with_hall(mut self, hall_id: HallId) -> Self {
        self.hall_id = Some(hall_id);
        self
    }
}

/// Instants at which a task reached each lifecycle stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimestamps {
    /// Set on `PICKED_UP`.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// Set on `IN_TRANSIT`.
    pub in_transit_at: Option<DateTime<Utc>>,
    /// Set on `DROPPED_OFF`.
    pub dropped_off_at: Option<DateTime<Utc>>,
    /// Set on `TAKEN_OVER`.
    pub taken_over_at: Option<DateTime<Utc>>,
    /// Set on `WEIGHED`.
    pub weighed_at: Option<DateTime<Utc>>,
    /// Set on `DISPOSED`.
    pub disposed_at: Option<DateTime<Utc>>,
    /// Set on `CANCELLED`.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl StageTimestamps {
    /// Returns the instant the given stage was reached, if recorded.
    ///
    /// `OPEN` has no stage timestamp; its instant is the creation time.
    #[must_use]
    pub const fn reached_at(&self, status: TaskStatus) -> Option<DateTime<Utc>> {
        match status {
            TaskStatus::Open => None,
            TaskStatus::PickedUp => self.picked_up_at,
            TaskStatus::InTransit => self.in_transit_at,
            TaskStatus::DroppedOff => self.dropped_off_at,
            TaskStatus::TakenOver => self.taken_over_at,
            TaskStatus::Weighed => self.weighed_at,
            TaskStatus::Disposed => self.disposed_at,
            TaskStatus::Cancelled => self.cancelled_at,
        }
    }

    fn record(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        let slot = match status {
            TaskStatus::Open => return,
            TaskStatus::PickedUp => &mut self.picked_up_at,
            TaskStatus::InTransit => &mut self.in_transit_at,
            TaskStatus::DroppedOff => &mut self.dropped_off_at,
            TaskStatus::TakenOver => &mut self.taken_over_at,
            TaskStatus::Weighed => &mut self.weighed_at,
            TaskStatus::Disposed => &mut self.disposed_at,
            TaskStatus::Cancelled => &mut self.cancelled_at,
        };
        *slot = Some(at);
    }
}

/// Weighed mass of a container in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WeightKg(f64);

impl WeightKg {
    /// Creates a validated weight.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidWeight`] when the value is negative,
    /// NaN or infinite.
    pub fn new(value: f64) -> Result<Self, TaskDomainError> {
        if !value.is_finite() || value.is_sign_negative() {
            return Err(TaskDomainError::InvalidWeight(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the weight in kilograms.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for WeightKg {
    type Error = TaskDomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeightKg> for f64 {
    fn from(weight: WeightKg) -> Self {
        weight.0
    }
}

impl fmt::Display for WeightKg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Origin classification.
    pub task_type: TaskType,
    /// Optional uniqueness token.
    pub dedup_key: Option<DedupKey>,
    /// Collection location.
    pub location: TaskLocation,
    /// When the collection is due.
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    status: TaskStatus,
    task_type: TaskType,
    dedup_key: Option<DedupKey>,
    location: TaskLocation,
    scheduled_for: Option<DateTime<Utc>>,
    stages: StageTimestamps,
    weight_kg: Option<WeightKg>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted task type.
    pub task_type: TaskType,
    /// Persisted dedup key, if any.
    pub dedup_key: Option<DedupKey>,
    /// Persisted location.
    pub location: TaskLocation,
    /// Persisted schedule instant.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Persisted stage timestamps.
    pub stages: StageTimestamps,
    /// Persisted weight.
    pub weight_kg: Option<WeightKg>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `OPEN` task.
    #[must_use]
    pub fn new(params: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            status: TaskStatus::Open,
            task_type: params.task_type,
            dedup_key: params.dedup_key,
            location: params.location,
            scheduled_for: params.scheduled_for,
            stages: StageTimestamps::default(),
            weight_kg: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            status: data.status,
            task_type: data.task_type,
            dedup_key: data.dedup_key,
            location: data.location,
            scheduled_for: data.scheduled_for,
            stages: data.stages,
            weight_kg: data.weight_kg,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the dedup key, if any.
    #[must_use]
    pub const fn dedup_key(&self) -> Option<&DedupKey> {
        self.dedup_key.as_ref()
    }

    /// Returns the collection location.
    #[must_use]
    pub const fn location(&self) -> &TaskLocation {
        &self.location
    }

    /// Returns when the collection is due.
    #[must_use]
    pub const fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        self.scheduled_for
    }

    /// Returns the stage timestamps.
    #[must_use]
    pub const fn stages(&self) -> &StageTimestamps {
        &self.stages
    }

    /// Returns the recorded weight, if any.
    #[must_use]
    pub const fn weight_kg(&self) -> Option<WeightKg> {
        self.weight_kg
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` for an `OPEN` daily task whose key belongs to another day.
    #[must_use]
    pub fn is_stale_daily(&self, today: super::ScheduleDay) -> bool {
        self.status == TaskStatus::Open
            && self.task_type == TaskType::DailyFull
            && !self.dedup_key.as_ref().is_some_and(|key| key.is_for_day(today))
    }

    /// Moves the task to `target`, stamping the matching stage timestamp.
    ///
    /// A supplied weight is recorded alongside the transition. Returns the
    /// status the task was in before the call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when `target` is not an
    /// edge of the lifecycle graph from the current status. The task is left
    /// untouched in that case.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        weight: Option<WeightKg>,
        clock: &impl Clock,
    ) -> Result<TaskStatus, TaskDomainError> {
        let from = self.status;
        if !from.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from,
                to: target,
            });
        }

        let timestamp = clock.utc();
        self.status = target;
        self.stages.record(target, timestamp);
        if weight.is_some() {
            self.weight_kg = weight;
        }
        self.updated_at = timestamp;
        Ok(from)
    }
}
