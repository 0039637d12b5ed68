//! `PostgreSQL` repository implementation for stands.

use super::{models::StandRow, schema::stands};
use crate::database::PgPool;
use crate::stand::{
    domain::Stand,
    ports::{StandRepository, StandRepositoryError, StandRepositoryResult},
};
use crate::task::domain::{HallId, MaterialId, StandId, StationId, TaskDomainError};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed stand repository.
#[derive(Debug, Clone)]
pub struct PostgresStandRepository {
    pool: PgPool,
}

impl PostgresStandRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StandRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StandRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StandRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StandRepositoryError::persistence)?
    }
}

#[async_trait]
impl StandRepository for PostgresStandRepository {
    async fn store(&self, stand: &Stand) -> StandRepositoryResult<()> {
        let row = to_row(stand);
        let stand_id = stand.id().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(stands::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StandRepositoryError::DuplicateStand(stand_id)
                    }
                    _ => StandRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, stand: &Stand) -> StandRepositoryResult<()> {
        let row = to_row(stand);
        let stand_id = stand.id().clone();
        self.run_blocking(move |connection| {
            let updated = diesel::update(stands::table.find(row.id.clone()))
                .set((&row, stands::updated_at.eq(diesel::dsl::now)))
                .execute(connection)
                .map_err(StandRepositoryError::persistence)?;
            if updated == 0 {
                return Err(StandRepositoryError::NotFound(stand_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &StandId) -> StandRepositoryResult<Option<Stand>> {
        let lookup = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = stands::table
                .find(lookup)
                .select(StandRow::as_select())
                .first::<StandRow>(connection)
                .optional()
                .map_err(StandRepositoryError::persistence)?;
            row.map(row_to_stand).transpose()
        })
        .await
    }

    async fn find_eligible_for_daily(&self) -> StandRepositoryResult<Vec<Stand>> {
        self.run_blocking(move |connection| {
            let rows = stands::table
                .filter(stands::daily_full.eq(true))
                .filter(stands::is_active.eq(true))
                .order(stands::id.asc())
                .select(StandRow::as_select())
                .load::<StandRow>(connection)
                .map_err(StandRepositoryError::persistence)?;
            rows.into_iter().map(row_to_stand).collect()
        })
        .await
    }
}

fn to_row(stand: &Stand) -> StandRow {
    StandRow {
        id: stand.id().as_str().to_owned(),
        station_id: stand.station_id().as_str().to_owned(),
        material_id: stand.material_id().as_str().to_owned(),
        hall_id: stand.hall_id().map(|hall| hall.as_str().to_owned()),
        daily_full: stand.daily_full(),
        is_active: stand.is_active(),
    }
}

fn row_to_stand(row: StandRow) -> StandRepositoryResult<Stand> {
    decode_stand(row).map_err(StandRepositoryError::persistence)
}

fn decode_stand(row: StandRow) -> Result<Stand, TaskDomainError> {
    let hall_id = row.hall_id.map(HallId::new).transpose()?;
    Ok(Stand::new(
        StandId::new(row.id)?,
        StationId::new(row.station_id)?,
        MaterialId::new(row.material_id)?,
    )
    .with_optional_hall(hall_id)
    .with_daily_full(row.daily_full)
    .with_active(row.is_active))
}
