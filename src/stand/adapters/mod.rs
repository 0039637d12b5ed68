//! Adapter implementations of the stand repository port.

pub mod memory;
pub mod postgres;
