//! Task status lifecycle and task type classification.

use super::{ParseTaskStatusError, ParseTaskTypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection task lifecycle status.
///
/// Variants are declared in lifecycle order, so the derived [`Ord`] sorts
/// statuses the way a task progresses through them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is waiting for a driver to collect the container.
    Open,
    /// Container has been picked up at the stand.
    PickedUp,
    /// Container is on its way to the collection point.
    InTransit,
    /// Container has been dropped off at the collection point.
    DroppedOff,
    /// Collection point staff have taken over the container.
    TakenOver,
    /// Container contents have been weighed.
    Weighed,
    /// Material has been disposed of.
    Disposed,
    /// Task was cancelled before completion.
    Cancelled,
}

impl TaskStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Open,
        Self::PickedUp,
        Self::InTransit,
        Self::DroppedOff,
        Self::TakenOver,
        Self::Weighed,
        Self::Disposed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::PickedUp => "PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::DroppedOff => "DROPPED_OFF",
            Self::TakenOver => "TAKEN_OVER",
            Self::Weighed => "WEIGHED",
            Self::Disposed => "DISPOSED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns `true` when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disposed | Self::Cancelled)
    }

    /// Returns the forward successor on the happy path, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::PickedUp),
            Self::PickedUp => Some(Self::InTransit),
            Self::InTransit => Some(Self::DroppedOff),
            Self::DroppedOff => Some(Self::TakenOver),
            Self::TakenOver => Some(Self::Weighed),
            Self::Weighed => Some(Self::Disposed),
            Self::Disposed | Self::Cancelled => None,
        }
    }

    /// Returns `true` when `target` is an edge of the lifecycle graph.
    ///
    /// Every non-terminal status may move to its forward successor or be
    /// cancelled. Terminal statuses accept nothing.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Cancelled || self.next() == Some(target)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

/// Origin classification of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Generated once per day for stands flagged `daily_full`.
    DailyFull,
    /// Created by a user on demand.
    Manual,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailyFull => "DAILY_FULL",
            Self::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY_FULL" => Ok(Self::DailyFull),
            "MANUAL" => Ok(Self::Manual),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}
