//! Adapter implementations of the task repository and activity ports.

pub mod memory;
pub mod postgres;
