//! `PostgreSQL` adapters for task persistence and the activity feed.

mod activity;
mod models;
mod repository;
mod rows;
mod schema;

pub use repository::PostgresTaskRepository;
