//! Then steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use rstest_bdd_macros::then;
use wastetrack::task::{
    domain::{TaskDomainError, TaskStatus, UserId},
    services::TaskLifecycleError,
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskTransitionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let stored = run_async(world.service.find_by_id(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} disappeared"))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then(r#"the task history ends with "{from}" to "{to}" by user "{user}""#)]
fn history_ends_with(
    world: &TaskTransitionWorld,
    from: String,
    to: String,
    user: String,
) -> Result<(), eyre::Report> {
    let history = run_async(world.service.history(world.task()?.id()))?;
    let last = history
        .last()
        .ok_or_else(|| eyre::eyre!("task history is empty"))?;

    let matches = last.from_status().map(TaskStatus::as_str) == Some(from.as_str())
        && last.to_status().as_str() == to
        && last.actor().user_id.as_ref().map(UserId::as_str) == Some(user.as_str());
    if !matches {
        return Err(eyre::eyre!("unexpected last event {last:?}"));
    }
    Ok(())
}

#[then("the task history has {count:usize} event")]
fn history_has_events(world: &TaskTransitionWorld, count: usize) -> Result<(), eyre::Report> {
    let history = run_async(world.service.history(world.task()?.id()))?;
    if history.len() != count {
        return Err(eyre::eyre!(
            "expected {count} events, found {}",
            history.len()
        ));
    }
    Ok(())
}

#[then("the task weight is {kilograms:f64} kg")]
fn task_weight_is(world: &TaskTransitionWorld, kilograms: f64) -> Result<(), eyre::Report> {
    let recorded = world
        .task()?
        .weight_kg()
        .ok_or_else(|| eyre::eyre!("no weight recorded"))?;
    if recorded.value().total_cmp(&kilograms).is_ne() {
        return Err(eyre::eyre!("expected {kilograms} kg, found {}", recorded.value()));
    }
    Ok(())
}

#[then("the transition fails with an invalid transition error")]
fn transition_fails_with_invalid_transition(
    world: &TaskTransitionWorld,
) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidTransition { .. }
        ))
    ) {
        return Err(eyre::eyre!("expected InvalidTransition error, got {result:?}"));
    }
    Ok(())
}

#[then("the transition fails with an invalid status error")]
fn transition_fails_with_invalid_status(
    world: &TaskTransitionWorld,
) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(result, Err(TaskLifecycleError::InvalidStatus(_))) {
        return Err(eyre::eyre!("expected InvalidStatus error, got {result:?}"));
    }
    Ok(())
}
