//! Conversions between task domain values and Diesel rows.

use super::models::{NewTaskEventRow, NewTaskRow, TaskEventRow, TaskRow, TaskTransitionChangeset};
use crate::task::domain::{
    ActorRole, ActorSnapshot, DedupKey, DepartmentId, EventMeta, HallId, MaterialId,
    ParseTaskStatusError, ParseTaskTypeError, PersistedTaskData, PersistedTaskEventData,
    StageTimestamps, StandId, StationId, Task, TaskDomainError, TaskEvent, TaskEventId, TaskId,
    TaskLocation, TaskStatus, TaskType, UserId, WeightKg,
};
use thiserror::Error;

/// A stored row could not be turned back into a domain value.
#[derive(Debug, Error)]
pub(super) enum RowDecodeError {
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
    #[error(transparent)]
    TaskType(#[from] ParseTaskTypeError),
    #[error("event metadata: {0}")]
    Meta(#[from] serde_json::Error),
}

pub(super) fn task_to_new_row(task: &Task) -> NewTaskRow {
    let location = task.location();
    NewTaskRow {
        id: task.id().into_inner(),
        status: task.status().as_str().to_owned(),
        task_type: task.task_type().as_str().to_owned(),
        dedup_key: task.dedup_key().map(|key| key.as_str().to_owned()),
        stand_id: location.stand_id.as_ref().map(|id| id.as_str().to_owned()),
        station_id: location.station_id.as_ref().map(|id| id.as_str().to_owned()),
        material_id: location.material_id.as_ref().map(|id| id.as_str().to_owned()),
        hall_id: location.hall_id.as_ref().map(|id| id.as_str().to_owned()),
        scheduled_for: task.scheduled_for(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn task_to_changeset(task: &Task) -> TaskTransitionChangeset {
    let stages = task.stages();
    TaskTransitionChangeset {
        status: task.status().as_str().to_owned(),
        picked_up_at: stages.picked_up_at,
        in_transit_at: stages.in_transit_at,
        dropped_off_at: stages.dropped_off_at,
        taken_over_at: stages.taken_over_at,
        weighed_at: stages.weighed_at,
        disposed_at: stages.disposed_at,
        cancelled_at: stages.cancelled_at,
        weight_kg: task.weight_kg().map(WeightKg::value),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(row: TaskRow) -> Result<Task, RowDecodeError> {
    let location = TaskLocation {
        stand_id: row.stand_id.map(StandId::new).transpose()?,
        station_id: row.station_id.map(StationId::new).transpose()?,
        material_id: row.material_id.map(MaterialId::new).transpose()?,
        hall_id: row.hall_id.map(HallId::new).transpose()?,
    };
    let stages = StageTimestamps {
        picked_up_at: row.picked_up_at,
        in_transit_at: row.in_transit_at,
        dropped_off_at: row.dropped_off_at,
        taken_over_at: row.taken_over_at,
        weighed_at: row.weighed_at,
        disposed_at: row.disposed_at,
        cancelled_at: row.cancelled_at,
    };

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        status: TaskStatus::try_from(row.status.as_str())?,
        task_type: TaskType::try_from(row.task_type.as_str())?,
        dedup_key: row.dedup_key.map(DedupKey::new).transpose()?,
        location,
        scheduled_for: row.scheduled_for,
        stages,
        weight_kg: row.weight_kg.map(WeightKg::new).transpose()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(super) fn event_to_new_row(event: &TaskEvent) -> Result<NewTaskEventRow, RowDecodeError> {
    let actor = event.actor();
    Ok(NewTaskEventRow {
        id: event.id().into_inner(),
        task_id: event.task_id().into_inner(),
        from_status: event.from_status().map(|status| status.as_str().to_owned()),
        to_status: event.to_status().as_str().to_owned(),
        actor_user_id: actor.user_id.as_ref().map(|id| id.as_str().to_owned()),
        actor_role: actor.role.as_str().to_owned(),
        actor_department_id: actor.department_id.as_ref().map(|id| id.as_str().to_owned()),
        meta: serde_json::to_value(event.meta())?,
        occurred_at: event.occurred_at(),
    })
}

pub(super) fn row_to_event(row: TaskEventRow) -> Result<TaskEvent, RowDecodeError> {
    let actor = ActorSnapshot {
        user_id: row.actor_user_id.map(UserId::new).transpose()?,
        role: ActorRole::new(row.actor_role)?,
        department_id: row.actor_department_id.map(DepartmentId::new).transpose()?,
    };
    let from_status = row
        .from_status
        .as_deref()
        .map(TaskStatus::try_from)
        .transpose()?;

    Ok(TaskEvent::from_persisted(PersistedTaskEventData {
        id: TaskEventId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        from_status,
        to_status: TaskStatus::try_from(row.to_status.as_str())?,
        actor,
        meta: serde_json::from_value::<EventMeta>(row.meta)?,
        occurred_at: row.occurred_at,
    }))
}
