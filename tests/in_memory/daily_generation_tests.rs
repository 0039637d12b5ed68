//! Daily generation across days and under concurrent runs.

use std::sync::Arc;

use super::helpers::{Stack, day, stack};
use crate::test_helpers::{daily_stand, utc};
use eyre::ensure;
use rstest::rstest;
use wastetrack::daily::{DailyScheduler, GenerationJob, ScheduleSettings, TriggerSource};
use wastetrack::stand::ports::StandRepository;
use wastetrack::task::domain::{StandId, TaskStatus, TaskType};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn week_of_runs_keeps_one_open_task_per_stand(stack: Stack) -> eyre::Result<()> {
    stack
        .seed([daily_stand("stand-1", "glass"), daily_stand("stand-2", "paper")])
        .await?;

    for date in 12..=18 {
        stack.clock.set(utc(2025, 12, date, 5, 0));
        stack.generator.run_now().await;
        stack.clock.set(utc(2025, 12, date, 17, 0));
        let rerun = stack.generator.run_now().await;
        ensure!(rerun.created == 0 && rerun.cancelled == 0, "rerun on {date}: {rerun:?}");
    }

    let today = stack.lifecycle.tasks_for_day(day("2025-12-18")).await?;
    ensure!(today.len() == 2);
    ensure!(today.iter().all(|task| task.status() == TaskStatus::Open));
    let earlier = stack.lifecycle.tasks_for_day(day("2025-12-15")).await?;
    ensure!(earlier.iter().all(|task| task.status() == TaskStatus::Cancelled));
    ensure!(stack.lifecycle.stale_daily_tasks(day("2025-12-18")).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_runs_never_duplicate_a_stand(stack: Stack) -> eyre::Result<()> {
    stack
        .seed((1..=20).map(|n| daily_stand(&format!("stand-{n}"), "glass")))
        .await?;
    let generator = Arc::new(stack.generator.clone());

    let runs: Vec<_> = (0..8)
        .map(|_| {
            let racer = Arc::clone(&generator);
            tokio::spawn(async move { racer.run_now().await })
        })
        .collect();
    let mut created = 0;
    let mut already_present = 0;
    for run in runs {
        let summary = run.await?;
        ensure!(summary.failures.is_empty(), "{summary:?}");
        created += summary.created;
        already_present += summary.already_present;
    }

    ensure!(created == 20);
    ensure!(already_present == 20 * 7);
    ensure!(stack.lifecycle.tasks_for_day(day("2025-12-12")).await?.len() == 20);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_stand_gets_no_new_task(stack: Stack) -> eyre::Result<()> {
    stack
        .seed([daily_stand("stand-1", "glass"), daily_stand("stand-2", "paper")])
        .await?;
    stack.generator.run_now().await;

    let mut retired = stack
        .stands
        .find_by_id(&StandId::new("stand-2")?)
        .await?
        .ok_or_else(|| eyre::eyre!("stand-2 missing"))?;
    retired.set_active(false);
    stack.stands.update(&retired).await?;
    stack.clock.set(utc(2025, 12, 13, 6, 0));

    let summary = stack.generator.run_now().await;

    ensure!(summary.cancelled == 2);
    ensure!(summary.created == 1);
    let today = stack.lifecycle.tasks_for_day(day("2025-12-13")).await?;
    ensure!(today.len() == 1);
    ensure!(
        today
            .first()
            .and_then(|task| task.location().stand_id.clone())
            == Some(StandId::new("stand-1")?)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manual_tasks_are_never_auto_cancelled(stack: Stack) -> eyre::Result<()> {
    let manual = stack
        .lifecycle
        .create_task(wastetrack::task::services::CreateTaskRequest::new(
            daily_stand("stand-9", "glass").location(),
        ))
        .await?;
    stack.clock.set(utc(2025, 12, 14, 6, 0));

    let summary = stack.generator.run_now().await;

    ensure!(summary.cancelled == 0);
    let reloaded = stack
        .lifecycle
        .find_by_id(manual.id())
        .await?
        .ok_or_else(|| eyre::eyre!("manual task missing"))?;
    ensure!(reloaded.task_type() == TaskType::Manual);
    ensure!(reloaded.status() == TaskStatus::Open);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scheduler_manual_trigger_returns_summary(stack: Stack) -> eyre::Result<()> {
    stack.seed([daily_stand("stand-1", "glass")]).await?;
    let scheduler = DailyScheduler::new(stack.generator.clone(), ScheduleSettings::default());

    let first = scheduler.trigger(TriggerSource::Manual).await;
    let second = scheduler.trigger(TriggerSource::Manual).await?;

    ensure!(first.as_ref().map(|summary| summary.created) == Ok(1));
    ensure!(second.already_present == 1);
    Ok(())
}
