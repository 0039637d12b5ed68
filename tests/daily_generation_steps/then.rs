//! Then steps for daily generation BDD scenarios.

use super::world::{GenerationWorld, run_async};
use rstest_bdd_macros::then;
use wastetrack::daily::AUTO_CANCEL_REASON;
use wastetrack::task::domain::{ScheduleDay, TaskStatus, TaskType};

fn expect_count(label: &str, expected: u32, actual: u32) -> Result<(), eyre::Report> {
    if expected != actual {
        return Err(eyre::eyre!("expected {expected} {label}, found {actual}"));
    }
    Ok(())
}

#[then("{count:u32} tasks were created")]
fn tasks_were_created(world: &GenerationWorld, count: u32) -> Result<(), eyre::Report> {
    let summary = world.summary()?;
    expect_count("created tasks", count, summary.created)?;
    if !summary.failures.is_empty() {
        return Err(eyre::eyre!("run reported failures: {:?}", summary.failures));
    }
    Ok(())
}

#[then("{count:u32} stands already had a task")]
fn stands_already_had_task(world: &GenerationWorld, count: u32) -> Result<(), eyre::Report> {
    expect_count("already present", count, world.summary()?.already_present)
}

#[then("{count:u32} stale tasks were cancelled")]
fn stale_tasks_were_cancelled(world: &GenerationWorld, count: u32) -> Result<(), eyre::Report> {
    expect_count("cancelled tasks", count, world.summary()?.cancelled)
}

#[then("{count:u32} stale task was cancelled")]
fn stale_task_was_cancelled(world: &GenerationWorld, count: u32) -> Result<(), eyre::Report> {
    expect_count("cancelled tasks", count, world.summary()?.cancelled)
}

#[then("today has {count:usize} open daily tasks")]
fn today_has_open_tasks(world: &GenerationWorld, count: usize) -> Result<(), eyre::Report> {
    let today = run_async(world.lifecycle.tasks_for_day(world.today()))?;
    let open = today
        .iter()
        .filter(|task| {
            task.status() == TaskStatus::Open && task.task_type() == TaskType::DailyFull
        })
        .count();
    if open != count || today.len() != count {
        return Err(eyre::eyre!(
            "expected {count} open daily tasks, found {open} of {}",
            today.len()
        ));
    }
    Ok(())
}

#[then(r#"every task of "{day}" is cancelled by the system"#)]
fn every_task_cancelled(world: &GenerationWorld, day: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.lifecycle.tasks_for_day(ScheduleDay::parse(&day)?))?;
    if tasks.is_empty() {
        return Err(eyre::eyre!("no tasks recorded for {day}"));
    }
    for task in tasks {
        if task.status() != TaskStatus::Cancelled {
            return Err(eyre::eyre!("task {} is {}", task.id(), task.status()));
        }
        let history = run_async(world.lifecycle.history(task.id()))?;
        let last = history
            .last()
            .ok_or_else(|| eyre::eyre!("task {} has no history", task.id()))?;
        if !last.actor().is_system() || last.meta().reason.as_deref() != Some(AUTO_CANCEL_REASON)
        {
            return Err(eyre::eyre!("unexpected cancellation event {last:?}"));
        }
    }
    Ok(())
}
