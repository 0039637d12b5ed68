//! Shared clock and fixture builders for integration tests.

mod clock;

pub use clock::ManualClock;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use wastetrack::stand::domain::Stand;
use wastetrack::task::domain::{HallId, MaterialId, StandId, StationId};

/// Builds a UTC instant.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid UTC instant")
}

/// Business offset used across integration tests (UTC+1).
pub fn business_offset() -> FixedOffset {
    FixedOffset::east_opt(3600).expect("valid offset")
}

/// Builds an active daily stand with the given identifier.
pub fn daily_stand(stand: &str, material: &str) -> Stand {
    Stand::new(
        StandId::new(stand).expect("valid stand id"),
        StationId::new(format!("station-of-{stand}")).expect("valid station id"),
        MaterialId::new(material).expect("valid material id"),
    )
    .with_hall(HallId::new("hall-1").expect("valid hall id"))
    .with_daily_full(true)
}
