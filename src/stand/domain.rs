//! Collection stand as read by daily task generation.

use crate::task::domain::{HallId, MaterialId, StandId, StationId, TaskLocation};
use serde::{Deserialize, Serialize};

/// Collection stand holding one material container at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stand {
    id: StandId,
    station_id: StationId,
    material_id: MaterialId,
    hall_id: Option<HallId>,
    daily_full: bool,
    is_active: bool,
}

impl Stand {
    /// Creates an active stand that is not yet flagged for daily collection.
    #[must_use]
    pub const fn new(id: StandId, station_id: StationId, material_id: MaterialId) -> Self {
        Self {
            id,
            station_id,
            material_id,
            hall_id: None,
            daily_full: false,
            is_active: true,
        }
    }

    /// Sets the hall containing the stand's station.
    #[must_use]
    pub fn with_hall(mut self, hall_id: HallId) -> Self {
        self.hall_id = Some(hall_id);
        self
    }

    /// Sets or clears the hall.
    #[must_use]
    pub fn with_optional_hall(mut self, hall_id: Option<HallId>) -> Self {
        self.hall_id = hall_id;
        self
    }

    /// Sets whether the stand is emptied every day.
    #[must_use]
    pub const fn with_daily_full(mut self, daily_full: bool) -> Self {
        self.daily_full = daily_full;
        self
    }

    /// Sets whether the stand is in service.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns the stand identifier.
    #[must_use]
    pub const fn id(&self) -> &StandId {
        &self.id
    }

    /// Returns the station identifier.
    #[must_use]
    pub const fn station_id(&self) -> &StationId {
        &self.station_id
    }

    /// Returns the material identifier.
    #[must_use]
    pub const fn material_id(&self) -> &MaterialId {
        &self.material_id
    }

    /// Returns the hall identifier, if known.
    #[must_use]
    pub const fn hall_id(&self) -> Option<&HallId> {
        self.hall_id.as_ref()
    }

    /// Returns the daily collection flag.
    #[must_use]
    pub const fn daily_full(&self) -> bool {
        self.daily_full
    }

    /// Returns the in-service flag.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns `true` when the generator should create a task for this stand.
    #[must_use]
    pub const fn is_eligible_for_daily(&self) -> bool {
        self.daily_full && self.is_active
    }

    /// Sets the in-service flag.
    pub const fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Sets the daily collection flag.
    pub const fn set_daily_full(&mut self, daily_full: bool) {
        self.daily_full = daily_full;
    }

    /// Returns the task location for containers at this stand.
    #[must_use]
    pub fn location(&self) -> TaskLocation {
        TaskLocation {
            stand_id: Some(self.id.clone()),
            station_id: Some(self.station_id.clone()),
            material_id: Some(self.material_id.clone()),
            hall_id: self.hall_id.clone(),
        }
    }
}
