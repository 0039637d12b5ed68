//! Query, pagination and summary types for the activity feed.

use crate::task::domain::{
    DepartmentId, HallId, MaterialId, StationId, TaskEvent, TaskId, TaskStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Half-open time window `[from, before)`; open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub before: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Returns an unbounded window.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            before: None,
        }
    }

    /// Returns `true` when `instant` lies inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from)
            && self.before.is_none_or(|before| instant < before)
    }
}

/// Event filter applied by activity repositories.
///
/// Every populated field must match; location filters compare against the
/// event metadata, actor filters against the snapshot taken at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    /// Window on the event instant.
    pub window: TimeWindow,
    /// Restricts to a single task.
    pub task_id: Option<TaskId>,
    /// Material recorded in the event metadata.
    pub material_id: Option<MaterialId>,
    /// Station recorded in the event metadata.
    pub station_id: Option<StationId>,
    /// Hall recorded in the event metadata.
    pub hall_id: Option<HallId>,
    /// Acting user.
    pub actor_user_id: Option<UserId>,
    /// Acting user's department at the time of the action.
    pub actor_department_id: Option<DepartmentId>,
    /// Status the event moved the task into.
    pub action: Option<TaskStatus>,
}

impl ActivityFilter {
    /// Returns `true` when `event` satisfies every populated criterion.
    #[must_use]
    pub fn matches(&self, event: &TaskEvent) -> bool {
        let meta = event.meta();
        let actor = event.actor();
        self.window.contains(event.occurred_at())
            && self.task_id.is_none_or(|id| id == event.task_id())
            && matches_optional(self.material_id.as_ref(), meta.material_id.as_ref())
            && matches_optional(self.station_id.as_ref(), meta.station_id.as_ref())
            && matches_optional(self.hall_id.as_ref(), meta.hall_id.as_ref())
            && matches_optional(self.actor_user_id.as_ref(), actor.user_id.as_ref())
            && matches_optional(
                self.actor_department_id.as_ref(),
                actor.department_id.as_ref(),
            )
            && self.action.is_none_or(|status| status == event.to_status())
    }
}

fn matches_optional<T: PartialEq>(wanted: Option<&T>, actual: Option<&T>) -> bool {
    wanted.is_none_or(|value| actual == Some(value))
}

/// One-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a page request, clamping `page` to at least 1 and `limit` to
    /// `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns how many rows precede this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.limit))
    }

    /// Builds the pagination block for a result set of `total` rows.
    #[must_use]
    pub fn paginate(self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(u64::from(self.limit)),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned with a page of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Number of matching events across all pages.
    pub total: u64,
    /// Number of pages needed for `total` events.
    pub total_pages: u64,
}

/// One page of the activity feed, newest events first.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityPage {
    /// Events on this page.
    pub events: Vec<TaskEvent>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Aggregate view of tasks created within a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Number of tasks created in the window.
    pub total: u64,
    /// Task counts keyed by current status.
    pub by_status: BTreeMap<TaskStatus, u64>,
    /// Sum of recorded weights keyed by material.
    pub weight_kg_by_material: BTreeMap<MaterialId, f64>,
}
