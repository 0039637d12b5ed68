//! Collection stands read by daily task generation.
//!
//! Stands are administered by an external service; this module only models
//! the fields the generator needs and the repository used to read them.
//!
//! - Domain type in [`domain`]
//! - Port contract in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
