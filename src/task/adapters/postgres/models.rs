//! Diesel row models for task and audit event persistence.

use super::schema::{task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Lifecycle status.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub status: String,
    /// Origin classification.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub task_type: String,
    /// Optional uniqueness token.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub dedup_key: Option<String>,
    /// Stand reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub stand_id: Option<String>,
    /// Station reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub station_id: Option<String>,
    /// Material reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub material_id: Option<String>,
    /// Hall reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub hall_id: Option<String>,
    /// When the collection is due.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Stage timestamp for `PICKED_UP`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub picked_up_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `IN_TRANSIT`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub in_transit_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `DROPPED_OFF`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub dropped_off_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `TAKEN_OVER`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub taken_over_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `WEIGHED`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub weighed_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `DISPOSED`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub disposed_at: Option<DateTime<Utc>>,
    /// Stage timestamp for `CANCELLED`.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Recorded weight in kilograms.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Float8>)]
    pub weight_kg: Option<f64>,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Origin classification.
    pub task_type: String,
    /// Optional uniqueness token.
    pub dedup_key: Option<String>,
    /// Stand reference.
    pub stand_id: Option<String>,
    /// Station reference.
    pub station_id: Option<String>,
    /// Material reference.
    pub material_id: Option<String>,
    /// Hall reference.
    pub hall_id: Option<String>,
    /// When the collection is due.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Columns rewritten by a status transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskTransitionChangeset {
    /// New lifecycle status.
    pub status: String,
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
    /// Recorded weight in kilograms.
    pub weight_kg: Option<f64>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for audit events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Status before the change.
    pub from_status: Option<String>,
    /// Status after the change.
    pub to_status: String,
    /// Acting user.
    pub actor_user_id: Option<String>,
    /// Role held when acting.
    pub actor_role: String,
    /// Department of the acting user.
    pub actor_department_id: Option<String>,
    /// Event metadata object.
    pub meta: Value,
    /// Instant of the change.
    pub occurred_at: DateTime<Utc>,
}

/// Insert model for audit events.
///
/// `sequence_number` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Status before the change.
    pub from_status: Option<String>,
    /// Status after the change.
    pub to_status: String,
    /// Acting user.
    pub actor_user_id: Option<String>,
    /// Role held when acting.
    pub actor_role: String,
    /// Department of the acting user.
    pub actor_department_id: Option<String>,
    /// Event metadata object.
    pub meta: Value,
    /// Instant of the change.
    pub occurred_at: DateTime<Utc>,
}

/// Task count per status, read by the summary query.
#[derive(Debug, Clone, QueryableByName)]
pub struct StatusCountRow {
    /// Lifecycle status.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub status: String,
    /// Number of tasks in the status.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub task_count: i64,
}

/// Weight total per material, read by the summary query.
#[derive(Debug, Clone, QueryableByName)]
pub struct MaterialWeightRow {
    /// Material reference.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub material_id: String,
    /// Sum of recorded weights.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Float8>)]
    pub total_weight: Option<f64>,
}
