//! Given steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use wastetrack::task::{
    domain::{MaterialId, StandId, TaskLocation},
    services::{CreateTaskRequest, TransitionTaskRequest},
};

#[given(r#"a manual task at stand "{stand}" for material "{material}""#)]
fn manual_task(
    world: &mut TaskTransitionWorld,
    stand: String,
    material: String,
) -> Result<(), eyre::Report> {
    let location = TaskLocation::empty()
        .with_stand(StandId::new(stand)?)
        .with_material(MaterialId::new(material)?);
    let created = run_async(world.service.create_task(CreateTaskRequest::new(location)))
        .wrap_err("create task for transition scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"the task has been moved to "{target_status}""#)]
fn task_has_been_moved(
    world: &mut TaskTransitionWorld,
    target_status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let outcome = run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, target_status)),
    )
    .wrap_err("transition task in scenario setup")?;

    world.task = Some(outcome.task);
    Ok(())
}
