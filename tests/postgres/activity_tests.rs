//! Activity feed SQL filters and summaries.

use crate::postgres::helpers::pg_stack;
use crate::test_helpers::{daily_stand, utc};
use chrono::Duration;
use eyre::ensure;
use rstest::rstest;
use wastetrack::activity::{domain::PageRequest, services::ActivityQuery};
use wastetrack::task::{
    domain::{
        ActorRole, ActorSnapshot, DepartmentId, HallId, MaterialId, ScheduleDay, StationId,
        TaskEvent, TaskStatus, UserId, WeightKg,
    },
    services::{CreateTaskRequest, TransitionTaskRequest},
};

fn driver() -> ActorSnapshot {
    ActorSnapshot::user(
        UserId::new("u-drv").expect("valid user id"),
        ActorRole::new("DRIVER").expect("valid role"),
        Some(DepartmentId::new("logistics").expect("valid department id")),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires WASTETRACK_TEST_DATABASE_URL"]
async fn feed_filters_match_in_memory_semantics() -> eyre::Result<()> {
    let stack = pg_stack().await?;
    let glass = stack
        .lifecycle
        .create_task(CreateTaskRequest::new(daily_stand("stand-1", "glass").location()))
        .await?;
    let paper = stack
        .lifecycle
        .create_task(CreateTaskRequest::new(daily_stand("stand-2", "paper").location()))
        .await?;
    for status in ["PICKED_UP", "IN_TRANSIT"] {
        stack.clock.advance(Duration::minutes(5));
        stack
            .lifecycle
            .transition_task(TransitionTaskRequest::new(glass.id(), status).with_actor(driver()))
            .await?;
    }

    let by_material = stack
        .activity
        .activity(ActivityQuery {
            material_id: Some(MaterialId::new("glass")?),
            ..ActivityQuery::default()
        })
        .await?;
    ensure!(by_material.pagination.total == 3);
    ensure!(
        by_material.events.first().map(TaskEvent::to_status)
            == Some(TaskStatus::InTransit)
    );

    let by_station_and_actor = stack
        .activity
        .activity(ActivityQuery {
            station_id: Some(StationId::new("station-of-stand-1")?),
            actor_department_id: Some(DepartmentId::new("logistics")?),
            action: Some(TaskStatus::PickedUp),
            ..ActivityQuery::default()
        })
        .await?;
    ensure!(by_station_and_actor.pagination.total == 1);

    let by_hall_and_task = stack
        .activity
        .activity(ActivityQuery {
            hall_id: Some(HallId::new("hall-1")?),
            task_id: Some(paper.id()),
            page: PageRequest::new(Some(1), Some(1)),
            ..ActivityQuery::default()
        })
        .await?;
    ensure!(by_hall_and_task.pagination.total == 1);
    ensure!(by_hall_and_task.pagination.total_pages == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires WASTETRACK_TEST_DATABASE_URL"]
async fn day_window_uses_business_offset() -> eyre::Result<()> {
    let stack = pg_stack().await?;
    // 23:30 UTC on the 12th falls on the 13th at UTC+1.
    stack.clock.set(utc(2025, 12, 12, 23, 30));
    stack
        .lifecycle
        .create_task(CreateTaskRequest::new(daily_stand("stand-1", "glass").location()))
        .await?;

    let twelfth = stack
        .activity
        .activity(ActivityQuery {
            from: Some(ScheduleDay::parse("2025-12-12")?),
            to: Some(ScheduleDay::parse("2025-12-12")?),
            ..ActivityQuery::default()
        })
        .await?;
    let thirteenth = stack
        .activity
        .activity(ActivityQuery {
            from: Some(ScheduleDay::parse("2025-12-13")?),
            ..ActivityQuery::default()
        })
        .await?;

    ensure!(twelfth.pagination.total == 0);
    ensure!(thirteenth.pagination.total == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires WASTETRACK_TEST_DATABASE_URL"]
async fn summary_groups_by_status_and_material() -> eyre::Result<()> {
    let stack = pg_stack().await?;
    for (stand, kilograms) in [("stand-1", 40.0), ("stand-2", 60.5)] {
        let task = stack
            .lifecycle
            .create_task(CreateTaskRequest::new(daily_stand(stand, "glass").location()))
            .await?;
        for status in ["PICKED_UP", "IN_TRANSIT", "DROPPED_OFF", "TAKEN_OVER"] {
            stack
                .lifecycle
                .transition_task(TransitionTaskRequest::new(task.id(), status))
                .await?;
        }
        stack
            .lifecycle
            .transition_task(
                TransitionTaskRequest::new(task.id(), "WEIGHED")
                    .with_weight(WeightKg::new(kilograms)?),
            )
            .await?;
    }
    stack
        .lifecycle
        .create_task(CreateTaskRequest::new(daily_stand("stand-3", "paper").location()))
        .await?;

    let summary = stack.activity.summary(None, None).await?;
    let outside = stack
        .activity
        .summary(Some(ScheduleDay::parse("2025-12-20")?), None)
        .await?;

    ensure!(summary.total == 3);
    ensure!(summary.by_status.get(&TaskStatus::Weighed) == Some(&2));
    ensure!(summary.by_status.get(&TaskStatus::Open) == Some(&1));
    let glass = summary
        .weight_kg_by_material
        .get(&MaterialId::new("glass")?)
        .copied()
        .ok_or_else(|| eyre::eyre!("no glass weight"))?;
    ensure!(glass.total_cmp(&100.5).is_eq(), "glass weighed {glass}");
    ensure!(outside.total == 0);
    Ok(())
}
