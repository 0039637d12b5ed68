//! Per-test `PostgreSQL` schemas for adapter integration tests.
//!
//! Each test runs inside its own freshly migrated schema selected through
//! the connection `search_path`, so tests never observe each other's rows.
//! The tests are `#[ignore]`d by default; run them with
//! `cargo test -- --ignored` and `WASTETRACK_TEST_DATABASE_URL` set. An
//! ignored test run without the variable fails instead of passing empty.

use std::sync::Arc;

use crate::test_helpers::{ManualClock, business_offset, utc};
use diesel::connection::SimpleConnection;
use eyre::WrapErr;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use uuid::Uuid;
use wastetrack::activity::services::ActivityService;
use wastetrack::daily::DailyTaskGenerator;
use wastetrack::database::{PgPool, apply_migrations};
use wastetrack::stand::adapters::postgres::PostgresStandRepository;
use wastetrack::task::{adapters::postgres::PostgresTaskRepository, services::TaskLifecycleService};

/// Environment variable naming the server used by these tests.
pub const TEST_DATABASE_URL_ENV: &str = "WASTETRACK_TEST_DATABASE_URL";

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// A migrated schema that is dropped when the value goes out of scope.
pub struct TestSchema {
    url: String,
    name: String,
    pool: PgPool,
}

impl TestSchema {
    /// Returns the pool bound to this schema.
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        let dropped = PgConnection::establish(&self.url)
            .map_err(eyre::Report::from)
            .and_then(|mut connection| {
                connection
                    .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
                    .map_err(eyre::Report::from)
            });
        if let Err(err) = dropped {
            tracing::warn!(schema = %self.name, error = %err, "failed to drop test schema");
        }
    }
}

/// Creates and migrates a schema on the configured test server.
pub async fn test_schema() -> eyre::Result<TestSchema> {
    let url = std::env::var(TEST_DATABASE_URL_ENV)
        .wrap_err_with(|| format!("{TEST_DATABASE_URL_ENV} must name a PostgreSQL server"))?;
    let name = format!("wastetrack_test_{}", Uuid::new_v4().simple());

    let schema = tokio::task::spawn_blocking(move || -> eyre::Result<TestSchema> {
        let mut admin = PgConnection::establish(&url)?;
        admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;

        let pool = Pool::builder()
            .max_size(4)
            .connection_customizer(Box::new(SearchPath(name.clone())))
            .build(ConnectionManager::<PgConnection>::new(url.clone()))?;
        let mut connection = pool.get()?;
        apply_migrations(&mut connection)?;
        Ok(TestSchema { url, name, pool })
    })
    .await??;
    Ok(schema)
}

/// Postgres-backed lifecycle service.
pub type Lifecycle = TaskLifecycleService<PostgresTaskRepository, ManualClock>;

/// Services wired to one test schema.
pub struct PgStack {
    pub tasks: Arc<PostgresTaskRepository>,
    pub stands: Arc<PostgresStandRepository>,
    pub clock: Arc<ManualClock>,
    pub lifecycle: Lifecycle,
    pub generator: DailyTaskGenerator<PostgresTaskRepository, PostgresStandRepository, ManualClock>,
    pub activity: ActivityService<PostgresTaskRepository>,
    _schema: TestSchema,
}

/// Builds a stack on a fresh schema with the clock at 06:00 UTC on
/// 2025-12-12.
pub async fn pg_stack() -> eyre::Result<PgStack> {
    let schema = test_schema().await?;
    let tasks = Arc::new(PostgresTaskRepository::new(schema.pool()));
    let stands = Arc::new(PostgresStandRepository::new(schema.pool()));
    let clock = Arc::new(ManualClock::at(utc(2025, 12, 12, 6, 0)));
    let lifecycle = TaskLifecycleService::new(Arc::clone(&tasks), Arc::clone(&clock));
    Ok(PgStack {
        generator: DailyTaskGenerator::new(
            lifecycle.clone(),
            Arc::clone(&stands),
            business_offset(),
        ),
        activity: ActivityService::new(Arc::clone(&tasks), business_offset()),
        lifecycle,
        tasks,
        stands,
        clock,
        _schema: schema,
    })
}
