//! Fixtures shared by unit tests across modules.

use crate::stand::domain::Stand;
use crate::task::domain::{HallId, MaterialId, StandId, StationId};
use chrono::{DateTime, TimeZone, Utc};

#[path = "../tests/test_helpers/clock.rs"]
mod clock;

pub use clock::ManualClock;

/// Builds a UTC instant, panicking on an impossible date.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid UTC instant")
}

/// Builds an eligible stand `stand-{n}` at `station-{n}` collecting `material`.
pub fn daily_stand(n: u32, material: &str) -> Stand {
    Stand::new(
        StandId::new(format!("stand-{n}")).expect("valid stand id"),
        StationId::new(format!("station-{n}")).expect("valid station id"),
        MaterialId::new(material).expect("valid material id"),
    )
    .with_hall(HallId::new("hall-a").expect("valid hall id"))
    .with_daily_full(true)
}
