//! Read-only analytics over collection tasks and their audit events.
//!
//! - Query and summary types in [`domain`]
//! - Repository contract in [`ports`]
//! - Day-range handling and pagination in [`services`]
//!
//! Adapters live next to the task adapters because the activity feed reads
//! the same rows the lifecycle engine writes.

pub mod domain;
pub mod ports;
pub mod services;
