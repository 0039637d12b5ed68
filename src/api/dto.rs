//! JSON request and response bodies.
//!
//! Field names are camelCase on the wire.

use super::error::ApiError;
use crate::activity::{
    domain::{ActivityPage, PageRequest, Pagination},
    services::ActivityQuery,
};
use crate::task::domain::{
    ActorRole, ActorSnapshot, DepartmentId, EventMeta, HallId, MaterialId, ScheduleDay, StandId,
    StationId, Task, TaskEvent, TaskId, TaskLocation, TaskStatus, UserId, WeightKg,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Current status.
    pub status: TaskStatus,
    /// Origin classification.
    pub task_type: String,
    /// Uniqueness token.
    pub dedup_key: Option<String>,
    /// Stand reference.
    pub stand_id: Option<StandId>,
    /// Station reference.
    pub station_id: Option<StationId>,
    /// Material reference.
    pub material_id: Option<MaterialId>,
    /// Hall reference.
    pub hall_id: Option<HallId>,
    /// When the collection is due.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Stage timestamp for `PICKED_UP`.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `IN_TRANSIT`.
    pub in_transit_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `DROPPED_OFF`.
    pub dropped_off_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `TAKEN_OVER`.
    pub taken_over_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `WEIGHED`.
    pub weighed_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `DISPOSED`.
    pub disposed_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `CANCELLED`.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Recorded weight.
    pub weight_kg: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        let location = task.location();
        let stages = task.stages();
        Self {
            id: task.id(),
            status: task.status(),
            task_type: task.task_type().as_str().to_owned(),
            dedup_key: task.dedup_key().map(|key| key.as_str().to_owned()),
            stand_id: location.stand_id.clone(),
            station_id: location.station_id.clone(),
            material_id: location.material_id.clone(),
            hall_id: location.hall_id.clone(),
            scheduled_for: task.scheduled_for(),
            picked_up_at: stages.picked_up_at,
            in_transit_at: stages.in_transit_at,
            dropped_off_at: stages.dropped_off_at,
            taken_over_at: stages.taken_over_at,
            weighed_at: stages.weighed_at,
            disposed_at: stages.disposed_at,
            cancelled_at: stages.cancelled_at,
            weight_kg: task.weight_kg().map(WeightKg::value),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Actor snapshot on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorBody {
    /// Acting user; absent for system actions.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Role held when acting.
    pub role: String,
    /// Department of the acting user.
    #[serde(default)]
    pub department_id: Option<String>,
}

impl ActorBody {
    /// Validates the body into a domain snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for blank identifiers or role.
    pub fn into_snapshot(self) -> Result<ActorSnapshot, ApiError> {
        Ok(ActorSnapshot {
            user_id: self.user_id.map(UserId::new).transpose()?,
            role: ActorRole::new(self.role)?,
            department_id: self.department_id.map(DepartmentId::new).transpose()?,
        })
    }
}

impl From<&ActorSnapshot> for ActorBody {
    fn from(actor: &ActorSnapshot) -> Self {
        Self {
            user_id: actor.user_id.as_ref().map(|id| id.as_str().to_owned()),
            role: actor.role.as_str().to_owned(),
            department_id: actor.department_id.as_ref().map(|id| id.as_str().to_owned()),
        }
    }
}

/// Audit event as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEventResponse {
    /// Event identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: TaskId,
    /// Status before the change; `null` for creation.
    pub from_status: Option<TaskStatus>,
    /// Status after the change.
    pub to_status: TaskStatus,
    /// Actor snapshot.
    pub actor: ActorBody,
    /// Event metadata.
    pub meta: EventMeta,
    /// Instant of the change.
    pub occurred_at: DateTime<Utc>,
}

impl From<&TaskEvent> for TaskEventResponse {
    fn from(event: &TaskEvent) -> Self {
        Self {
            id: event.id().into_inner(),
            task_id: event.task_id(),
            from_status: event.from_status(),
            to_status: event.to_status(),
            actor: ActorBody::from(event.actor()),
            meta: event.meta().clone(),
            occurred_at: event.occurred_at(),
        }
    }
}

/// Response of a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    /// Task after the transition.
    pub task: TaskResponse,
    /// Event appended for the transition.
    pub event: TaskEventResponse,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Stand reference.
    #[serde(default)]
    pub stand_id: Option<String>,
    /// Station reference.
    #[serde(default)]
    pub station_id: Option<String>,
    /// Material reference.
    #[serde(default)]
    pub material_id: Option<String>,
    /// Hall reference.
    #[serde(default)]
    pub hall_id: Option<String>,
    /// When the collection is due.
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional uniqueness token.
    #[serde(default)]
    pub dedup_key: Option<String>,
    /// Creating actor; the system actor when absent.
    #[serde(default)]
    pub actor: Option<ActorBody>,
}

impl CreateTaskBody {
    /// Validates the location fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for blank identifiers.
    pub fn location(&self) -> Result<TaskLocation, ApiError> {
        Ok(TaskLocation {
            stand_id: self.stand_id.clone().map(StandId::new).transpose()?,
            station_id: self.station_id.clone().map(StationId::new).transpose()?,
            material_id: self.material_id.clone().map(MaterialId::new).transpose()?,
            hall_id: self.hall_id.clone().map(HallId::new).transpose()?,
        })
    }
}

/// Body of `POST /api/tasks/{id}/transition`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    /// Target status name, such as `PICKED_UP`.
    pub to_status: String,
    /// Acting identity.
    pub actor: ActorBody,
    /// Event metadata.
    #[serde(default)]
    pub meta: EventMeta,
    /// Weight recorded with the transition.
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// Query string of `GET /api/activity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    /// One-based page.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// First day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub to: Option<String>,
    /// Material filter.
    pub material_id: Option<String>,
    /// Station filter.
    pub station_id: Option<String>,
    /// Hall filter.
    pub hall_id: Option<String>,
    /// Acting user filter.
    pub user_id: Option<String>,
    /// Acting department filter.
    pub department_id: Option<String>,
    /// Resulting status filter.
    pub action: Option<String>,
    /// Task filter.
    pub task_id: Option<Uuid>,
}

impl ActivityParams {
    /// Validates the parameters into a service query.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for malformed days, identifiers or
    /// statuses.
    pub fn into_query(self) -> Result<ActivityQuery, ApiError> {
        let action = self
            .action
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;
        Ok(ActivityQuery {
            from: parse_day(self.from.as_deref())?,
            to: parse_day(self.to.as_deref())?,
            task_id: self.task_id.map(TaskId::from_uuid),
            material_id: self.material_id.map(MaterialId::new).transpose()?,
            station_id: self.station_id.map(StationId::new).transpose()?,
            hall_id: self.hall_id.map(HallId::new).transpose()?,
            actor_user_id: self.user_id.map(UserId::new).transpose()?,
            actor_department_id: self.department_id.map(DepartmentId::new).transpose()?,
            action,
            page: PageRequest::new(self.page, self.limit),
        })
    }
}

/// Query string of `GET /api/stats/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DayRangeParams {
    /// First day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub to: Option<String>,
}

impl DayRangeParams {
    /// Parses both ends of the range.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for malformed days.
    pub fn days(&self) -> Result<(Option<ScheduleDay>, Option<ScheduleDay>), ApiError> {
        Ok((parse_day(self.from.as_deref())?, parse_day(self.to.as_deref())?))
    }
}

fn parse_day(value: Option<&str>) -> Result<Option<ScheduleDay>, ApiError> {
    Ok(value.map(ScheduleDay::parse).transpose()?)
}

/// Body of `GET /api/activity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityResponse {
    /// Events on the page, newest first.
    pub events: Vec<TaskEventResponse>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

impl From<ActivityPage> for ActivityResponse {
    fn from(page: ActivityPage) -> Self {
        Self {
            events: page.events.iter().map(TaskEventResponse::from).collect(),
            pagination: page.pagination,
        }
    }
}

/// Body of `GET /api/daily-tasks/today`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayResponse {
    /// Current business day.
    pub day: ScheduleDay,
    /// Tasks whose dedup key belongs to the day.
    pub tasks: Vec<TaskResponse>,
}
