// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store contract consumed by the engine and the surrounding system

use ramp_core::{Event, Task, TaskEvent, TaskId, TaskState, TransitionError, Worker, WorkerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One consistent read of every record, taken under the store's lock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub workers: Vec<Worker>,
}

/// Store-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("unknown worker: {0}")]
    UnknownWorker(WorkerId),

    #[error("worker is inactive: {0}")]
    InactiveWorker(WorkerId),

    /// Another writer changed the task since the caller last read it
    #[error("conflict on task {id}: expected {expected:?}, found {found:?}")]
    Conflict {
        id: TaskId,
        expected: TaskState,
        found: TaskState,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Task and worker persistence with atomic state transitions.
///
/// Implementations must serialize mutations: each call is one
/// read-modify-write that either fully applies or leaves the record
/// untouched. Manual overrides and the automatic passes both come through
/// here; there is no bypass path around the transition table.
pub trait TaskStore: Send + Sync {
    /// Read all records consistently
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    /// Ingest a new task (arrives unassigned from the importer)
    fn create_task(&self, task: Task) -> Result<(), StoreError>;

    /// Explicit external deletion; the engine itself never deletes
    fn remove_task(&self, id: &TaskId) -> Result<Task, StoreError>;

    /// Create or replace a worker record. Deactivating a worker releases
    /// that worker's open tasks back to the pool; the emitted events are
    /// returned.
    fn put_worker(&self, worker: Worker) -> Result<Vec<Event>, StoreError>;

    /// Apply a lifecycle event to a task
    fn transition(&self, id: &TaskId, event: TaskEvent) -> Result<Vec<Event>, StoreError>;

    /// Apply a lifecycle event only if the task is still in the state the
    /// caller observed; fails with [`StoreError::Conflict`] otherwise
    fn transition_if(
        &self,
        id: &TaskId,
        expected: TaskState,
        event: TaskEvent,
    ) -> Result<Vec<Event>, StoreError>;

    /// Non-complete tasks for one worker, ordered by effective time
    /// (unresolvable times last)
    fn tasks_for_worker(&self, worker: &WorkerId) -> Result<Vec<Task>, StoreError>;

    /// Non-complete unassigned tasks, ordered by effective time
    /// (unresolvable times last)
    fn unassigned_tasks(&self) -> Result<Vec<Task>, StoreError>;
}
