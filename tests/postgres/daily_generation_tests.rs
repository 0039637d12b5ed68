//! Daily generation against `PostgreSQL`, including racing generators.

use std::sync::Arc;

use crate::postgres::helpers::pg_stack;
use crate::test_helpers::{daily_stand, utc};
use eyre::ensure;
use rstest::rstest;
use wastetrack::daily::{AUTO_CANCEL_REASON, GenerationJob};
use wastetrack::stand::ports::StandRepository;
use wastetrack::task::domain::{ScheduleDay, TaskStatus};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires WASTETRACK_TEST_DATABASE_URL"]
async fn generation_is_idempotent_and_cancels_yesterday() -> eyre::Result<()> {
    let stack = pg_stack().await?;
    for stand in [daily_stand("stand-1", "glass"), daily_stand("stand-2", "paper")] {
        stack.stands.store(&stand).await?;
    }

    let first = stack.generator.run_now().await;
    let repeat = stack.generator.run_now().await;
    stack.stands.store(&daily_stand("stand-3", "metal")).await?;
    stack.clock.set(utc(2025, 12, 13, 6, 0));
    let next_day = stack.generator.run_now().await;

    ensure!(first.created == 2 && first.failures.is_empty(), "{first:?}");
    ensure!(repeat.created == 0 && repeat.already_present == 2, "{repeat:?}");
    ensure!(next_day.cancelled == 2 && next_day.created == 3, "{next_day:?}");

    let yesterday = stack
        .lifecycle
        .tasks_for_day(ScheduleDay::parse("2025-12-12")?)
        .await?;
    for task in yesterday {
        ensure!(task.status() == TaskStatus::Cancelled);
        let history = stack.lifecycle.history(task.id()).await?;
        let last = history.last().ok_or_else(|| eyre::eyre!("no history"))?;
        ensure!(last.meta().reason.as_deref() == Some(AUTO_CANCEL_REASON));
        ensure!(last.actor().is_system());
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires WASTETRACK_TEST_DATABASE_URL"]
async fn racing_generators_rely_on_unique_index() -> eyre::Result<()> {
    let stack = pg_stack().await?;
    for n in 1..=5 {
        stack
            .stands
            .store(&daily_stand(&format!("stand-{n}"), "glass"))
            .await?;
    }
    let generator = Arc::new(stack.generator.clone());

    let runs: Vec<_> = (0..4)
        .map(|_| {
            let racer = Arc::clone(&generator);
            tokio::spawn(async move { racer.run_now().await })
        })
        .collect();
    let mut created = 0;
    for run in runs {
        let summary = run.await?;
        ensure!(summary.failures.is_empty(), "{summary:?}");
        created += summary.created;
    }

    ensure!(created == 5);
    let today = stack
        .lifecycle
        .tasks_for_day(ScheduleDay::parse("2025-12-12")?)
        .await?;
    ensure!(today.len() == 5);
    Ok(())
}
