// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store
//!
//! A single mutex serializes every mutation, so read-modify-write on a
//! task is atomic and a shutdown between calls never observes a
//! half-applied commit.

use crate::store::{StoreError, StoreSnapshot, TaskStore};
use ramp_core::{Clock, Event, SystemClock, Task, TaskEvent, TaskId, TaskState, Worker, WorkerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct State {
    tasks: HashMap<TaskId, Task>,
    workers: HashMap<WorkerId, Worker>,
}

/// Mutex-serialized in-memory implementation of [`TaskStore`]
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    inner: Arc<Mutex<State>>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    /// Create an empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    /// Create an empty store with an injected clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    /// Fetch one task by id
    pub fn get_task(&self, id: &TaskId) -> Option<Task> {
        let state = self.lock();
        state.tasks.get(id).cloned()
    }

    /// Fetch one worker by id
    pub fn get_worker(&self, id: &WorkerId) -> Option<Worker> {
        let state = self.lock();
        state.workers.get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one event to one task inside the lock
    fn apply(&self, state: &mut State, id: &TaskId, event: TaskEvent) -> Result<Vec<Event>, StoreError> {
        let task = state
            .tasks
            .get(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        // An assignment must reference an active worker
        if let TaskEvent::Assign { worker } = &event {
            let record = state
                .workers
                .get(worker)
                .ok_or_else(|| StoreError::UnknownWorker(worker.clone()))?;
            if !record.active {
                return Err(StoreError::InactiveWorker(worker.clone()));
            }
        }

        let (task, events) = task.transition(event, &self.clock)?;
        state.tasks.insert(id.clone(), task);
        Ok(events)
    }
}

/// Order open tasks by effective time, unresolvable times last
fn sort_by_effective(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.effective_time().ok(), b.effective_time().ok()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

impl<C: Clock> TaskStore for MemoryStore<C> {
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let state = self.lock();
        Ok(StoreSnapshot {
            tasks: state.tasks.values().cloned().collect(),
            workers: state.workers.values().cloned().collect(),
        })
    }

    fn create_task(&self, task: Task) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.tasks.contains_key(&task.id) {
            return Err(StoreError::DuplicateTask(task.id));
        }
        state.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn remove_task(&self, id: &TaskId) -> Result<Task, StoreError> {
        let mut state = self.lock();
        state
            .tasks
            .remove(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))
    }

    fn put_worker(&self, worker: Worker) -> Result<Vec<Event>, StoreError> {
        let mut state = self.lock();
        let mut events = Vec::new();

        if !worker.active {
            // Keep the invariant that assignments reference active workers:
            // a deactivated worker's open tasks go back to the pool.
            let open: Vec<TaskId> = state
                .tasks
                .values()
                .filter(|t| t.is_open() && t.assigned_to.as_ref() == Some(&worker.id))
                .map(|t| t.id.clone())
                .collect();
            for id in open {
                events.extend(self.apply(&mut state, &id, TaskEvent::Release)?);
            }
        }

        if !events.is_empty() {
            tracing::info!(
                worker = %worker.id,
                released = events.len(),
                "worker deactivated; open tasks returned to pool"
            );
        }
        state.workers.insert(worker.id.clone(), worker);
        Ok(events)
    }

    fn transition(&self, id: &TaskId, event: TaskEvent) -> Result<Vec<Event>, StoreError> {
        let mut state = self.lock();
        self.apply(&mut state, id, event)
    }

    fn transition_if(
        &self,
        id: &TaskId,
        expected: TaskState,
        event: TaskEvent,
    ) -> Result<Vec<Event>, StoreError> {
        let mut state = self.lock();
        let found = state
            .tasks
            .get(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?
            .state;
        if found != expected {
            return Err(StoreError::Conflict {
                id: id.clone(),
                expected,
                found,
            });
        }
        self.apply(&mut state, id, event)
    }

    fn tasks_for_worker(&self, worker: &WorkerId) -> Result<Vec<Task>, StoreError> {
        let state = self.lock();
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.is_open() && t.assigned_to.as_ref() == Some(worker))
            .cloned()
            .collect();
        drop(state);
        sort_by_effective(&mut tasks);
        Ok(tasks)
    }

    fn unassigned_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.lock();
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.is_unassigned())
            .cloned()
            .collect();
        drop(state);
        sort_by_effective(&mut tasks);
        Ok(tasks)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
