//! `PostgreSQL` repository implementation for tasks and their audit log.

use super::{
    models::{TaskEventRow, TaskRow},
    rows::{event_to_new_row, row_to_event, row_to_task, task_to_changeset, task_to_new_row},
    schema::{task_events, tasks},
};
use crate::database::PgPool;
use crate::task::{
    domain::{DedupKey, ScheduleDay, Task, TaskEvent, TaskId, TaskStatus, TaskType},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const DEDUP_KEY_INDEX: &str = "idx_tasks_dedup_key_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(super) const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &Task, created: &TaskEvent) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let dedup_key = task.dedup_key().cloned();
        let task_row = task_to_new_row(task);
        let event_row = event_to_new_row(created).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&task_row)
                    .execute(tx)
                    .map_err(|err| map_insert_error(err, task_id, dedup_key.as_ref()))?;
                diesel::insert_into(task_events::table)
                    .values(&event_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn record_transition(
        &self,
        task: &Task,
        expected: TaskStatus,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = task_to_changeset(task);
        let event_row = event_to_new_row(event).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::status.eq(expected.as_str())),
                )
                .set(&changeset)
                .execute(tx)?;

                if updated == 0 {
                    let exists = tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .select(tasks::id)
                        .first::<uuid::Uuid>(tx)
                        .optional()?;
                    return Err(match exists {
                        Some(_) => TaskRepositoryError::Conflict { task_id, expected },
                        None => TaskRepositoryError::NotFound(task_id),
                    });
                }

                diesel::insert_into(task_events::table)
                    .values(&event_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(decode_task).transpose()
        })
        .await
    }

    async fn find_stale_daily(&self, today: ScheduleDay) -> TaskRepositoryResult<Vec<Task>> {
        let pattern = day_suffix_pattern(today);
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT * FROM tasks ",
                "WHERE status = $1 AND task_type = $2 ",
                "AND (dedup_key IS NULL OR dedup_key NOT LIKE $3) ",
                "ORDER BY created_at, id",
            ))
            .bind::<diesel::sql_types::Text, _>(TaskStatus::Open.as_str())
            .bind::<diesel::sql_types::Text, _>(TaskType::DailyFull.as_str())
            .bind::<diesel::sql_types::Text, _>(pattern)
            .load::<TaskRow>(connection)?;
            rows.into_iter().map(decode_task).collect()
        })
        .await
    }

    async fn find_by_dedup_day(&self, day: ScheduleDay) -> TaskRepositoryResult<Vec<Task>> {
        let pattern = day_suffix_pattern(day);
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::dedup_key.like(pattern))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(decode_task).collect()
        })
        .await
    }

    async fn events_for_task(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .filter(task_events::task_id.eq(id.into_inner()))
                .order((
                    task_events::occurred_at.asc(),
                    task_events::sequence_number.asc(),
                ))
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)?;
            rows.into_iter()
                .map(|row| row_to_event(row).map_err(TaskRepositoryError::persistence))
                .collect()
        })
        .await
    }
}

fn decode_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    row_to_task(row).map_err(TaskRepositoryError::persistence)
}

/// `LIKE` pattern matching keys that end with `:{day}`.
///
/// Dates never contain `%` or `_`, so no escaping is needed.
fn day_suffix_pattern(day: ScheduleDay) -> String {
    format!("%:{day}")
}

fn map_insert_error(
    err: DieselError,
    task_id: TaskId,
    dedup_key: Option<&DedupKey>,
) -> TaskRepositoryError {
    match (err, dedup_key) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info), Some(key))
            if is_dedup_key_unique_violation(info.as_ref()) =>
        {
            TaskRepositoryError::DuplicateDedupKey(key.clone())
        }
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), _) => {
            TaskRepositoryError::DuplicateTask(task_id)
        }
        (other, _) => TaskRepositoryError::persistence(other),
    }
}

fn is_dedup_key_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == DEDUP_KEY_INDEX)
}
