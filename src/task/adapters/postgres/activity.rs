//! Activity feed and summary queries over the `PostgreSQL` audit log.

use super::{
    models::{MaterialWeightRow, StatusCountRow, TaskEventRow},
    repository::PostgresTaskRepository,
    rows::row_to_event,
    schema::task_events,
};
use crate::activity::{
    domain::{ActivityFilter, PageRequest, TaskSummary, TimeWindow},
    ports::{ActivityRepository, ActivityRepositoryError, ActivityRepositoryResult},
};
use crate::task::domain::{MaterialId, TaskEvent, TaskStatus};
use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable, Text, Timestamptz};

impl PostgresTaskRepository {
    async fn run_query<F, T>(&self, f: F) -> ActivityRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActivityRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool().clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ActivityRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ActivityRepositoryError::persistence)?
    }
}

#[async_trait]
impl ActivityRepository for PostgresTaskRepository {
    async fn query_events(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> ActivityRepositoryResult<(Vec<TaskEvent>, u64)> {
        let criteria = filter.clone();
        let limit = i64::from(page.limit());
        let offset = i64::try_from(page.offset()).map_err(ActivityRepositoryError::persistence)?;

        self.run_query(move |connection| {
            let matching = filtered_events(&criteria)
                .count()
                .get_result::<i64>(connection)
                .map_err(ActivityRepositoryError::persistence)?;
            let rows = filtered_events(&criteria)
                .order((
                    task_events::occurred_at.desc(),
                    task_events::sequence_number.desc(),
                ))
                .limit(limit)
                .offset(offset)
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)
                .map_err(ActivityRepositoryError::persistence)?;

            let events = rows
                .into_iter()
                .map(|row| row_to_event(row).map_err(ActivityRepositoryError::persistence))
                .collect::<ActivityRepositoryResult<Vec<_>>>()?;
            let total = u64::try_from(matching).map_err(ActivityRepositoryError::persistence)?;
            Ok((events, total))
        })
        .await
    }

    async fn summarize(&self, window: TimeWindow) -> ActivityRepositoryResult<TaskSummary> {
        self.run_query(move |connection| {
            let status_rows = diesel::sql_query(concat!(
                "SELECT status, COUNT(*) AS task_count FROM tasks ",
                "WHERE ($1 IS NULL OR created_at >= $1) ",
                "AND ($2 IS NULL OR created_at < $2) ",
                "GROUP BY status",
            ))
            .bind::<Nullable<Timestamptz>, _>(window.from)
            .bind::<Nullable<Timestamptz>, _>(window.before)
            .load::<StatusCountRow>(connection)
            .map_err(ActivityRepositoryError::persistence)?;

            let weight_rows = diesel::sql_query(concat!(
                "SELECT material_id, SUM(weight_kg) AS total_weight FROM tasks ",
                "WHERE material_id IS NOT NULL AND weight_kg IS NOT NULL ",
                "AND ($1 IS NULL OR created_at >= $1) ",
                "AND ($2 IS NULL OR created_at < $2) ",
                "GROUP BY material_id",
            ))
            .bind::<Nullable<Timestamptz>, _>(window.from)
            .bind::<Nullable<Timestamptz>, _>(window.before)
            .load::<MaterialWeightRow>(connection)
            .map_err(ActivityRepositoryError::persistence)?;

            build_summary(status_rows, weight_rows)
        })
        .await
    }
}

type MetaPredicate = Box<dyn BoxableExpression<task_events::table, Pg, SqlType = Bool>>;

fn filtered_events(filter: &ActivityFilter) -> task_events::BoxedQuery<'static, Pg> {
    let mut query = task_events::table.into_boxed();
    if let Some(from) = filter.window.from {
        query = query.filter(task_events::occurred_at.ge(from));
    }
    if let Some(before) = filter.window.before {
        query = query.filter(task_events::occurred_at.lt(before));
    }
    if let Some(task_id) = filter.task_id {
        query = query.filter(task_events::task_id.eq(task_id.into_inner()));
    }
    if let Some(status) = filter.action {
        query = query.filter(task_events::to_status.eq(status.as_str()));
    }
    if let Some(user_id) = &filter.actor_user_id {
        query = query.filter(task_events::actor_user_id.eq(user_id.as_str().to_owned()));
    }
    if let Some(department_id) = &filter.actor_department_id {
        query = query.filter(
            task_events::actor_department_id.eq(department_id.as_str().to_owned()),
        );
    }
    if let Some(material_id) = &filter.material_id {
        query = query.filter(meta_equals("materialId", material_id.as_str()));
    }
    if let Some(station_id) = &filter.station_id {
        query = query.filter(meta_equals("stationId", station_id.as_str()));
    }
    if let Some(hall_id) = &filter.hall_id {
        query = query.filter(meta_equals("hallId", hall_id.as_str()));
    }
    query
}

/// `meta->>'{key}' = $value`; `key` is always a compile-time constant.
fn meta_equals(key: &'static str, value: &str) -> MetaPredicate {
    Box::new(sql::<Bool>(&format!("meta->>'{key}' = ")).bind::<Text, _>(value.to_owned()))
}

fn build_summary(
    status_rows: Vec<StatusCountRow>,
    weight_rows: Vec<MaterialWeightRow>,
) -> ActivityRepositoryResult<TaskSummary> {
    let mut summary = TaskSummary::default();
    for row in status_rows {
        let status = TaskStatus::try_from(row.status.as_str())
            .map_err(ActivityRepositoryError::persistence)?;
        let count = u64::try_from(row.task_count).map_err(ActivityRepositoryError::persistence)?;
        summary.total = summary.total.saturating_add(count);
        summary.by_status.insert(status, count);
    }
    for row in weight_rows {
        let material_id =
            MaterialId::new(row.material_id).map_err(ActivityRepositoryError::persistence)?;
        summary
            .weight_kg_by_material
            .insert(material_id, row.total_weight.unwrap_or_default());
    }
    Ok(summary)
}
