//! Wastetrack: waste-collection task tracking backend.
//!
//! This crate generates the daily collection tasks for every stand flagged
//! for daily emptying, moves tasks through their eight-status lifecycle with
//! an append-only audit log, and reports activity over that log.
//!
//! # Architecture
//!
//! Wastetrack follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, status transitions and audit events
//! - [`stand`]: Stands read by daily generation
//! - [`daily`]: Idempotent daily generation and its scheduler
//! - [`activity`]: Activity feed and summaries over the audit log
//! - [`api`]: HTTP endpoints
//! - [`config`], [`database`], [`telemetry`]: Runtime wiring

pub mod activity;
pub mod api;
pub mod config;
pub mod daily;
pub mod database;
pub mod stand;
pub mod task;
pub mod telemetry;

#[cfg(test)]
mod test_support;
