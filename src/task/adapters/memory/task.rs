//! In-memory repository for tasks and their audit log.
//!
//! A single `RwLock` guards tasks, the dedup-key index and the event log so
//! that a task change and its event are applied as one unit.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::activity::{
    domain::{ActivityFilter, PageRequest, TaskSummary, TimeWindow},
    ports::{ActivityRepository, ActivityRepositoryError, ActivityRepositoryResult},
};
use crate::task::{
    domain::{DedupKey, MaterialId, ScheduleDay, Task, TaskEvent, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    dedup_index: HashMap<DedupKey, TaskId>,
    events: Vec<TaskEvent>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_activity(&self) -> ActivityRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            ActivityRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Sorts tasks by creation time, then identifier, for stable listings.
fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task, created: &TaskEvent) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if let Some(key) = task.dedup_key() {
            if state.dedup_index.contains_key(key) {
                return Err(TaskRepositoryError::DuplicateDedupKey(key.clone()));
            }
            state.dedup_index.insert(key.clone(), task.id());
        }

        state.tasks.insert(task.id(), task.clone());
        state.events.push(created.clone());
        Ok(())
    }

    async fn record_transition(
        &self,
        task: &Task,
        expected: TaskStatus,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if stored.status() != expected {
            return Err(TaskRepositoryError::Conflict {
                task_id: task.id(),
                expected,
            });
        }

        *stored = task.clone();
        state.events.push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_stale_daily(&self, today: ScheduleDay) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(sorted(
            state
                .tasks
                .values()
                .filter(|task| task.is_stale_daily(today))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_dedup_day(&self, day: ScheduleDay) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(sorted(
            state
                .tasks
                .values()
                .filter(|task| task.dedup_key().is_some_and(|key| key.is_for_day(day)))
                .cloned()
                .collect(),
        ))
    }

    async fn events_for_task(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>> {
        let state = self.read()?;
        // The log is append-only, so insertion order already matches
        // occurrence order for events with equal instants.
        let mut events: Vec<TaskEvent> = state
            .events
            .iter()
            .filter(|event| event.task_id() == id)
            .cloned()
            .collect();
        events.sort_by_key(TaskEvent::occurred_at);
        Ok(events)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryTaskRepository {
    async fn query_events(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> ActivityRepositoryResult<(Vec<TaskEvent>, u64)> {
        let state = self.read_activity()?;
        let mut matching: Vec<&TaskEvent> = state
            .events
            .iter()
            .rev()
            .filter(|event| filter.matches(event))
            .collect();
        // Stable sort keeps newer inserts first among equal instants.
        matching.sort_by(|left, right| right.occurred_at().cmp(&left.occurred_at()));

        let total = u64::try_from(matching.len()).map_err(ActivityRepositoryError::persistence)?;
        let skip = usize::try_from(page.offset()).map_err(ActivityRepositoryError::persistence)?;
        let take = usize::try_from(page.limit()).map_err(ActivityRepositoryError::persistence)?;
        let events = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();
        Ok((events, total))
    }

    async fn summarize(&self, window: TimeWindow) -> ActivityRepositoryResult<TaskSummary> {
        let state = self.read_activity()?;
        let mut summary = TaskSummary::default();
        let mut weights: BTreeMap<MaterialId, Vec<f64>> = BTreeMap::new();
        for task in state
            .tasks
            .values()
            .filter(|task| window.contains(task.created_at()))
        {
            summary.total = summary.total.saturating_add(1);
            let count = summary.by_status.entry(task.status()).or_default();
            *count = count.saturating_add(1);

            if let (Some(material_id), Some(weight)) =
                (&task.location().material_id, task.weight_kg())
            {
                weights
                    .entry(material_id.clone())
                    .or_default()
                    .push(weight.value());
            }
        }
        summary.weight_kg_by_material = weights
            .into_iter()
            .map(|(material_id, values)| (material_id, values.into_iter().sum()))
            .collect();
        Ok(summary)
    }
}
