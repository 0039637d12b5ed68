//! Repository port for stand lookup.

use super::domain::Stand;
use crate::task::domain::StandId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for stand repository operations.
pub type StandRepositoryResult<T> = Result<T, StandRepositoryError>;

/// Stand persistence contract.
///
/// Stands are administered elsewhere; the generator only reads them. The
/// write methods exist for seeding and tests.
#[async_trait]
pub trait StandRepository: Send + Sync {
    /// Stores a new stand.
    ///
    /// # Errors
    ///
    /// Returns [`StandRepositoryError::DuplicateStand`] when the ID exists.
    async fn store(&self, stand: &Stand) -> StandRepositoryResult<()>;

    /// Persists changes to an existing stand.
    ///
    /// # Errors
    ///
    /// Returns [`StandRepositoryError::NotFound`] when the stand does not
    /// exist.
    async fn update(&self, stand: &Stand) -> StandRepositoryResult<()>;

    /// Finds a stand by identifier.
    async fn find_by_id(&self, id: &StandId) -> StandRepositoryResult<Option<Stand>>;

    /// Returns stands with `daily_full` and `is_active` both set, ordered by ID.
    async fn find_eligible_for_daily(&self) -> StandRepositoryResult<Vec<Stand>>;
}

/// Errors returned by stand repository implementations.
#[derive(Debug, Clone, Error)]
pub enum StandRepositoryError {
    /// A stand with the same identifier already exists.
    #[error("duplicate stand identifier: {0}")]
    DuplicateStand(StandId),

    /// The stand was not found.
    #[error("stand not found: {0}")]
    NotFound(StandId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StandRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
