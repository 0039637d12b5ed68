//! Append-only audit events recorded for every task status change.

use super::{
    DepartmentId, HallId, MaterialId, StandId, StationId, Task, TaskDomainError, TaskEventId,
    TaskId, TaskLocation, TaskStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Role name recorded for actions performed by the system itself.
pub const SYSTEM_ROLE: &str = "SYSTEM";

/// Role of an actor at the time of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorRole(String);

impl ActorRole {
    /// Creates a role, normalising surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyIdentifier`] when the role is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyIdentifier { kind: "role" });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the system role.
    #[must_use]
    pub fn system() -> Self {
        Self(SYSTEM_ROLE.to_owned())
    }

    /// Returns the role as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of whoever performed an action, frozen at the moment of the action.
///
/// The snapshot is never re-derived from live user or department records, so
/// later role changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Acting user; `None` for system actions.
    pub user_id: Option<UserId>,
    /// Role held when acting.
    pub role: ActorRole,
    /// Department the user belonged to when acting.
    pub department_id: Option<DepartmentId>,
}

impl ActorSnapshot {
    /// Returns the system actor marker.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: None,
            role: ActorRole::system(),
            department_id: None,
        }
    }

    /// Captures a human actor.
    #[must_use]
    pub const fn user(
        user_id: UserId,
        role: ActorRole,
        department_id: Option<DepartmentId>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            role,
            department_id,
        }
    }

    /// Returns `true` for the system actor marker.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.user_id.is_none() && self.role.as_str() == SYSTEM_ROLE
    }
}

/// Free-form context attached to an event.
///
/// Location and weight keys are typed so the activity feed can filter on
/// them; any other caller-supplied keys are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Stand of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand_id: Option<StandId>,
    /// Station of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<StationId>,
    /// Material of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<MaterialId>,
    /// Hall of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hall_id: Option<HallId>,
    /// Weight recorded with the action, in kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Human-readable reason, used for cancellations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Additional caller-supplied keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventMeta {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the weight.
    #[must_use]
    pub const fn with_weight_kg(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Adds an arbitrary key.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Fills location keys that the caller left unset from the task location.
    #[must_use]
    pub fn with_location_defaults(mut self, location: &TaskLocation) -> Self {
        if self.stand_id.is_none() {
            self.stand_id.clone_from(&location.stand_id);
        }
        if self.station_id.is_none() {
            self.station_id.clone_from(&location.station_id);
        }
        if self.material_id.is_none() {
            self.material_id.clone_from(&location.material_id);
        }
        if self.hall_id.is_none() {
            self.hall_id.clone_from(&location.hall_id);
        }
        self
    }
}

/// Immutable audit record of a task status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    id: TaskEventId,
    task_id: TaskId,
    from_status: Option<TaskStatus>,
    to_status: TaskStatus,
    actor: ActorSnapshot,
    meta: EventMeta,
    occurred_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted event.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskEventData {
    /// Persisted event identifier.
    pub id: TaskEventId,
    /// Owning task.
    pub task_id: TaskId,
    /// Status before the change; `None` for creation.
    pub from_status: Option<TaskStatus>,
    /// Status after the change.
    pub to_status: TaskStatus,
    /// Actor snapshot.
    pub actor: ActorSnapshot,
    /// Event metadata.
    pub meta: EventMeta,
    /// Instant of the change.
    pub occurred_at: DateTime<Utc>,
}

impl TaskEvent {
    /// Records the creation of `task`.
    #[must_use]
    pub fn created(task: &Task, actor: ActorSnapshot, meta: EventMeta) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id: task.id(),
            from_status: None,
            to_status: task.status(),
            actor,
            meta: meta.with_location_defaults(task.location()),
            occurred_at: task.created_at(),
        }
    }

    /// Records a transition of `task` out of `from` into its current status.
    #[must_use]
    pub fn transitioned(
        task: &Task,
        from: TaskStatus,
        actor: ActorSnapshot,
        meta: EventMeta,
    ) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id: task.id(),
            from_status: Some(from),
            to_status: task.status(),
            actor,
            meta: meta.with_location_defaults(task.location()),
            occurred_at: task.updated_at(),
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskEventData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            from_status: data.from_status,
            to_status: data.to_status,
            actor: data.actor,
            meta: data.meta,
            occurred_at: data.occurred_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> TaskEventId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the status before the change; `None` for creation.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the status after the change.
    #[must_use]
    pub const fn to_status(&self) -> TaskStatus {
        self.to_status
    }

    /// Returns the actor snapshot.
    #[must_use]
    pub const fn actor(&self) -> &ActorSnapshot {
        &self.actor
    }

    /// Returns the event metadata.
    #[must_use]
    pub const fn meta(&self) -> &EventMeta {
        &self.meta
    }

    /// Returns the instant of the change.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Reconstructs a task's status by replaying its events oldest first.
///
/// Returns `Ok(None)` for an empty history.
///
/// # Errors
///
/// Returns [`TaskDomainError::InconsistentHistory`] when an event does not
/// continue from the status reached so far, or when it is not an edge of the
/// lifecycle graph.
pub fn replay_status(events: &[TaskEvent]) -> Result<Option<TaskStatus>, TaskDomainError> {
    let mut current: Option<TaskStatus> = None;
    for event in events {
        let applies = match (current, event.from_status) {
            (None, None) => event.to_status == TaskStatus::Open,
            (Some(reached), Some(from)) => reached == from && from.can_transition_to(event.to_status),
            _ => false,
        };
        if !applies {
            return Err(TaskDomainError::InconsistentHistory {
                task_id: event.task_id,
                event_id: event.id,
            });
        }
        current = Some(event.to_status);
    }
    Ok(current)
}
