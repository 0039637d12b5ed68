//! When steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use rstest_bdd_macros::when;
use wastetrack::task::{
    domain::{ActorRole, ActorSnapshot, DepartmentId, UserId, WeightKg},
    services::TransitionTaskRequest,
};

fn record(world: &mut TaskTransitionWorld, request: TransitionTaskRequest) {
    let result = run_async(world.service.transition_task(request));
    if let Ok(ref outcome) = result {
        world.task = Some(outcome.task.clone());
    }
    world.last_transition_result = Some(result);
}

#[when(r#"a driver moves the task to "{target_status}""#)]
fn driver_moves_task(
    world: &mut TaskTransitionWorld,
    target_status: String,
) -> Result<(), eyre::Report> {
    let driver = ActorSnapshot::user(
        UserId::new("u-drv")?,
        ActorRole::new("DRIVER")?,
        Some(DepartmentId::new("logistics")?),
    );
    let request =
        TransitionTaskRequest::new(world.task()?.id(), target_status).with_actor(driver);
    record(world, request);
    Ok(())
}

#[when("the yard weighs the task at {kilograms:f64} kg")]
fn yard_weighs_task(world: &mut TaskTransitionWorld, kilograms: f64) -> Result<(), eyre::Report> {
    let yard = ActorSnapshot::user(UserId::new("u-yard")?, ActorRole::new("YARD")?, None);
    let request = TransitionTaskRequest::new(world.task()?.id(), "WEIGHED")
        .with_actor(yard)
        .with_weight(WeightKg::new(kilograms)?);
    record(world, request);
    Ok(())
}
