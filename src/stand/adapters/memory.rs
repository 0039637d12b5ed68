//! In-memory stand repository for tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::stand::{
    domain::Stand,
    ports::{StandRepository, StandRepositoryError, StandRepositoryResult},
};
use crate::task::domain::StandId;

/// Thread-safe in-memory stand repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStandRepository {
    stands: Arc<RwLock<BTreeMap<StandId, Stand>>>,
}

impl InMemoryStandRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> StandRepositoryError {
    StandRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl StandRepository for InMemoryStandRepository {
    async fn store(&self, stand: &Stand) -> StandRepositoryResult<()> {
        let mut stands = self.stands.write().map_err(lock_error)?;
        if stands.contains_key(stand.id()) {
            return Err(StandRepositoryError::DuplicateStand(stand.id().clone()));
        }
        stands.insert(stand.id().clone(), stand.clone());
        Ok(())
    }

    async fn update(&self, stand: &Stand) -> StandRepositoryResult<()> {
        let mut stands = self.stands.write().map_err(lock_error)?;
        let slot = stands
            .get_mut(stand.id())
            .ok_or_else(|| StandRepositoryError::NotFound(stand.id().clone()))?;
        *slot = stand.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &StandId) -> StandRepositoryResult<Option<Stand>> {
        let stands = self.stands.read().map_err(lock_error)?;
        Ok(stands.get(id).cloned())
    }

    async fn find_eligible_for_daily(&self) -> StandRepositoryResult<Vec<Stand>> {
        let stands = self.stands.read().map_err(lock_error)?;
        Ok(stands
            .values()
            .filter(|stand| stand.is_eligible_for_daily())
            .cloned()
            .collect())
    }
}
