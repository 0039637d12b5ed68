//! `PostgreSQL` adapter for stand lookup.

mod models;
mod repository;
mod schema;

pub use repository::PostgresStandRepository;
