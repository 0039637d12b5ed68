//! Diesel row models for stands.

use super::schema::stands;
use diesel::prelude::*;

/// Query result and insert row for stand records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = stands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct StandRow {
    /// Stand identifier.
    pub id: String,
    /// Station reference.
    pub station_id: String,
    /// Material reference.
    pub material_id: String,
    /// Hall reference.
    pub hall_id: Option<String>,
    /// Emptied every day.
    pub daily_full: bool,
    /// In service.
    pub is_active: bool,
}
