//! Activity feed over events written by generation and transitions.

use super::helpers::{Stack, day, stack};
use crate::test_helpers::{daily_stand, utc};
use eyre::ensure;
use rstest::rstest;
use wastetrack::activity::{domain::PageRequest, services::ActivityQuery};
use wastetrack::daily::{AUTO_CANCEL_REASON, GenerationJob};
use wastetrack::task::domain::{HallId, MaterialId, TaskStatus};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancellations_show_up_with_reason_and_location(stack: Stack) -> eyre::Result<()> {
    stack
        .seed([daily_stand("stand-1", "glass"), daily_stand("stand-2", "paper")])
        .await?;
    stack.generator.run_now().await;
    stack.clock.set(utc(2025, 12, 13, 6, 0));
    stack.generator.run_now().await;

    let cancelled = stack
        .activity
        .activity(ActivityQuery {
            action: Some(TaskStatus::Cancelled),
            material_id: Some(MaterialId::new("glass")?),
            ..ActivityQuery::default()
        })
        .await?;

    ensure!(cancelled.pagination.total == 1);
    let event = cancelled
        .events
        .first()
        .ok_or_else(|| eyre::eyre!("missing cancellation event"))?;
    ensure!(event.meta().reason.as_deref() == Some(AUTO_CANCEL_REASON));
    ensure!(event.meta().hall_id == Some(HallId::new("hall-1")?));
    ensure!(event.actor().is_system());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn feed_limits_to_requested_days(stack: Stack) -> eyre::Result<()> {
    stack.seed([daily_stand("stand-1", "glass")]).await?;
    for date in 12..=14 {
        stack.clock.set(utc(2025, 12, date, 6, 0));
        stack.generator.run_now().await;
    }

    let window = stack
        .activity
        .activity(ActivityQuery {
            from: Some(day("2025-12-13")),
            to: Some(day("2025-12-13")),
            ..ActivityQuery::default()
        })
        .await?;
    let everything = stack
        .activity
        .activity(ActivityQuery {
            page: PageRequest::new(Some(1), Some(2)),
            ..ActivityQuery::default()
        })
        .await?;

    // The 13th holds the cancellation of the 12th's task and the 13th's creation.
    ensure!(window.pagination.total == 2);
    ensure!(everything.pagination.total == 5);
    ensure!(everything.pagination.total_pages == 3);
    ensure!(everything.events.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summary_reflects_generated_tasks(stack: Stack) -> eyre::Result<()> {
    stack
        .seed([daily_stand("stand-1", "glass"), daily_stand("stand-2", "paper")])
        .await?;
    stack.generator.run_now().await;
    stack.clock.set(utc(2025, 12, 13, 6, 0));
    stack.generator.run_now().await;

    let whole = stack.activity.summary(None, None).await?;
    let thirteenth = stack
        .activity
        .summary(Some(day("2025-12-13")), Some(day("2025-12-13")))
        .await?;

    ensure!(whole.total == 4);
    ensure!(whole.by_status.get(&TaskStatus::Cancelled) == Some(&2));
    ensure!(whole.by_status.get(&TaskStatus::Open) == Some(&2));
    ensure!(thirteenth.total == 2);
    ensure!(thirteenth.weight_kg_by_material.is_empty());
    Ok(())
}
