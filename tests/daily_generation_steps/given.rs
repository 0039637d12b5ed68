//! Given steps for daily generation BDD scenarios.

use super::world::{GenerationWorld, run_async};
use crate::test_helpers::daily_stand;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use wastetrack::stand::{domain::Stand, ports::StandRepository};

fn store(world: &GenerationWorld, stand: &Stand) -> Result<(), eyre::Report> {
    run_async(world.stands.store(stand)).wrap_err("store scenario stand")
}

#[given(r#"the business day is "{day}""#)]
fn business_day_is(world: &mut GenerationWorld, day: String) -> Result<(), eyre::Report> {
    world.set_business_day(&day)
}

#[given(r#"daily stand "{stand}" for material "{material}""#)]
fn daily_stand_exists(
    world: &mut GenerationWorld,
    stand: String,
    material: String,
) -> Result<(), eyre::Report> {
    store(world, &daily_stand(&stand, &material))
}

#[given(r#"inactive daily stand "{stand}" for material "{material}""#)]
fn inactive_stand_exists(
    world: &mut GenerationWorld,
    stand: String,
    material: String,
) -> Result<(), eyre::Report> {
    store(world, &daily_stand(&stand, &material).with_active(false))
}

#[given(r#"regular stand "{stand}" for material "{material}""#)]
fn regular_stand_exists(
    world: &mut GenerationWorld,
    stand: String,
    material: String,
) -> Result<(), eyre::Report> {
    store(world, &daily_stand(&stand, &material).with_daily_full(false))
}
