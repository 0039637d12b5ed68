//! HTTP surface.
//!
//! JSON endpoints over the task lifecycle, daily generation and activity
//! services. Errors render as `{"error": {"code", "message"}}`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, TaskStore};

use crate::stand::ports::StandRepository;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use mockable::Clock;
use tower_http::trace::TraceLayer;

/// Builds the application router.
#[must_use]
pub fn router<R, S, C>(state: AppState<R, S, C>) -> Router
where
    R: TaskStore,
    S: StandRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let admin = Router::new()
        .route(
            "/api/admin/daily-tasks/run",
            post(handlers::run_daily_tasks::<R, S, C>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_admin::<R, S, C>,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/daily-tasks/today", get(handlers::today_tasks::<R, S, C>))
        .route("/api/activity", get(handlers::activity::<R, S, C>))
        .route("/api/stats/summary", get(handlers::summary::<R, S, C>))
        .route("/api/tasks", post(handlers::create_task::<R, S, C>))
        .route("/api/tasks/{id}", get(handlers::get_task::<R, S, C>))
        .route("/api/tasks/{id}/events", get(handlers::task_events::<R, S, C>))
        .route(
            "/api/tasks/{id}/transition",
            post(handlers::transition_task::<R, S, C>),
        )
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
