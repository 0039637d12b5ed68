//! Request handlers.

use super::{
    dto::{
        ActivityParams, ActivityResponse, CreateTaskBody, DayRangeParams, TaskEventResponse,
        TaskResponse, TodayResponse, TransitionBody, TransitionResponse,
    },
    error::ApiError,
    state::{AppState, TaskStore},
};
use crate::activity::domain::TaskSummary;
use crate::daily::{GenerationSummary, TriggerSource};
use crate::stand::ports::StandRepository;
use crate::task::{
    domain::{ScheduleDay, TaskId, WeightKg},
    services::{CreateTaskRequest, TransitionTaskRequest},
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::Response;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// `GET /health`.
#[expect(clippy::unused_async, reason = "axum routes take async handlers")]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Rejects requests without the configured `Authorization: Bearer` token.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the header is missing, malformed
/// or carries another token.
pub async fn require_admin<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    request: Request,
    next: Next,
) -> ApiResult<Response>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .is_some_and(|token| state.admin_token_matches(token.trim()));
    if !authorized {
        warn!(path = %request.uri().path(), "rejected admin request");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// `POST /api/admin/daily-tasks/run`.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] while another run holds the slot.
pub async fn run_daily_tasks<R, S, C>(
    State(state): State<AppState<R, S, C>>,
) -> ApiResult<Json<GenerationSummary>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let summary = state.scheduler().trigger(TriggerSource::Manual).await?;
    Ok(Json(summary))
}

/// `GET /api/daily-tasks/today`.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] when the lookup fails.
pub async fn today_tasks<R, S, C>(
    State(state): State<AppState<R, S, C>>,
) -> ApiResult<Json<TodayResponse>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let day = ScheduleDay::from_reference(state.lifecycle().clock().utc(), state.offset());
    let tasks = state.lifecycle().tasks_for_day(day).await?;
    Ok(Json(TodayResponse {
        day,
        tasks: tasks.iter().map(TaskResponse::from).collect(),
    }))
}

/// `GET /api/activity`.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for malformed parameters.
pub async fn activity<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    params: Result<Query<ActivityParams>, QueryRejection>,
) -> ApiResult<Json<ActivityResponse>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Query(raw) = params?;
    let page = state.activity().activity(raw.into_query()?).await?;
    Ok(Json(ActivityResponse::from(page)))
}

/// `GET /api/stats/summary`.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for malformed or inverted ranges.
pub async fn summary<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    params: Result<Query<DayRangeParams>, QueryRejection>,
) -> ApiResult<Json<TaskSummary>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Query(range) = params?;
    let (from, to) = range.days()?;
    Ok(Json(state.activity().summary(from, to).await?))
}

/// `POST /api/tasks`.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for invalid bodies and
/// [`ApiError::Conflict`] for a dedup-key collision.
pub async fn create_task<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(payload) = body?;
    let mut request = CreateTaskRequest::new(payload.location()?);
    if let Some(scheduled_for) = payload.scheduled_for {
        request = request.with_scheduled_for(scheduled_for);
    }
    if let Some(dedup_key) = payload.dedup_key {
        request = request.with_dedup_key(dedup_key);
    }
    if let Some(actor) = payload.actor {
        request = request.with_actor(actor.into_snapshot()?);
    }

    let task = state.lifecycle().create_task(request).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// `GET /api/tasks/{id}`.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown task.
pub async fn get_task<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskResponse>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Path(raw_id) = id?;
    let task_id = TaskId::from_uuid(raw_id);
    let task = state
        .lifecycle()
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("task not found: {task_id}")))?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `GET /api/tasks/{id}/events`.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown task.
pub async fn task_events<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<TaskEventResponse>>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Path(raw_id) = id?;
    let events = state.lifecycle().history(TaskId::from_uuid(raw_id)).await?;
    Ok(Json(events.iter().map(TaskEventResponse::from).collect()))
}

/// `POST /api/tasks/{id}/transition`.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown task,
/// [`ApiError::Unprocessable`] for a transition outside the lifecycle graph
/// and [`ApiError::Conflict`] when another writer moved the task first.
pub async fn transition_task<R, S, C>(
    State(state): State<AppState<R, S, C>>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> ApiResult<Json<TransitionResponse>>
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Path(raw_id) = id?;
    let Json(payload) = body?;
    let mut request = TransitionTaskRequest::new(TaskId::from_uuid(raw_id), payload.to_status)
        .with_actor(payload.actor.into_snapshot()?)
        .with_meta(payload.meta);
    if let Some(weight_kg) = payload.weight_kg {
        request = request.with_weight(WeightKg::new(weight_kg)?);
    }

    let outcome = state.lifecycle().transition_task(request).await?;
    Ok(Json(TransitionResponse {
        task: TaskResponse::from(&outcome.task),
        event: TaskEventResponse::from(&outcome.event),
    }))
}
