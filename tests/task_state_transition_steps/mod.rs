//! Step definitions for task status transition scenarios.

mod given;
mod then;
mod when;
pub mod world;
