//! `PostgreSQL` connection pooling and schema bootstrap shared by adapters.
//!
//! Diesel connections are synchronous; each adapter offloads its queries to
//! [`tokio::task::spawn_blocking`] with a clone of the shared [`PgPool`].

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema migrations in application order, as `(name, up.sql)` pairs.
pub const MIGRATIONS: [(&str, &str); 2] = [
    (
        "2026-10-01-000000_create_stands_and_tasks",
        include_str!("../migrations/2026-10-01-000000_create_stands_and_tasks/up.sql"),
    ),
    (
        "2026-10-01-000001_create_task_events",
        include_str!("../migrations/2026-10-01-000001_create_task_events/up.sql"),
    ),
];

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Applies every migration in [`MIGRATIONS`] that has not run yet.
///
/// Applied names are recorded in `schema_migrations_applied`; each migration
/// runs in its own transaction together with its bookkeeping row.
///
/// # Errors
///
/// Returns the underlying Diesel error when a migration fails; earlier
/// migrations stay applied.
pub fn apply_migrations(connection: &mut PgConnection) -> QueryResult<()> {
    connection.batch_execute(concat!(
        "CREATE TABLE IF NOT EXISTS schema_migrations_applied (",
        "name VARCHAR(255) PRIMARY KEY, ",
        "applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW())",
    ))?;

    for (name, sql) in MIGRATIONS {
        if migration_applied(connection, name)? {
            continue;
        }
        connection.transaction::<_, diesel::result::Error, _>(|tx| {
            tx.batch_execute(sql)?;
            diesel::sql_query("INSERT INTO schema_migrations_applied (name) VALUES ($1)")
                .bind::<diesel::sql_types::Text, _>(name)
                .execute(tx)?;
            Ok(())
        })?;
        tracing::info!(migration = name, "applied schema migration");
    }
    Ok(())
}

fn migration_applied(connection: &mut PgConnection, name: &str) -> QueryResult<bool> {
    #[derive(diesel::QueryableByName)]
    struct ExistsRow {
        #[diesel(sql_type = diesel::sql_types::Bool)]
        applied: bool,
    }

    let row = diesel::sql_query(
        "SELECT EXISTS (SELECT 1 FROM schema_migrations_applied WHERE name = $1) AS applied",
    )
    .bind::<diesel::sql_types::Text, _>(name)
    .get_result::<ExistsRow>(connection)?;
    Ok(row.applied)
}
