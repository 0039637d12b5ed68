//! Collection task lifecycle.
//!
//! Tasks move through an eight-status lifecycle; every change is validated
//! against the status graph and recorded as an immutable audit event in the
//! same atomic unit as the task update. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
