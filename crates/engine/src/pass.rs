// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One allocation pass: allocate, then reallocate
//!
//! Planning is pure and works on a consistent snapshot; each decision is
//! then applied as one state-guarded store transition. A decision that
//! lost a race against a manual edit is dropped with a warning - the next
//! pass replans from fresh state.

use crate::error::EngineError;
use ramp_core::{
    Allocator, Assignment, Clock, EngineConfig, Event, Reallocator, Release, TaskEvent, TaskId,
    TaskState,
};
use ramp_storage::TaskStore;

/// What one pass decided and applied
#[derive(Debug, Default)]
pub struct PassSummary {
    /// Assignments committed to the store
    pub assigned: Vec<Assignment>,
    /// Queued tasks returned to the pool
    pub released: Vec<Release>,
    /// Tasks skipped because their effective time did not resolve
    pub skipped: Vec<TaskId>,
    /// Decisions dropped because another writer got there first
    pub conflicts: usize,
    /// Events emitted by the applied transitions, in order
    pub events: Vec<Event>,
}

impl PassSummary {
    /// True when the pass changed nothing
    pub fn is_quiet(&self) -> bool {
        self.assigned.is_empty() && self.released.is_empty() && self.conflicts == 0
    }
}

/// Run one allocate-then-reallocate pass against the store.
pub fn run_pass<S, C>(
    store: &S,
    config: &EngineConfig,
    clock: &C,
) -> Result<PassSummary, EngineError>
where
    S: TaskStore + ?Sized,
    C: Clock,
{
    let now = clock.now();
    let mut summary = PassSummary::default();

    // Phase 1: allocation
    let snapshot = store.snapshot()?;
    let plan = Allocator::new(&config.allocation).plan(&snapshot.tasks, &snapshot.workers, now);
    summary.skipped = plan.skipped;

    for assignment in plan.assignments {
        let result = store.transition_if(
            &assignment.task,
            TaskState::Unassigned,
            TaskEvent::Assign {
                worker: assignment.worker.clone(),
            },
        );
        match result {
            Ok(events) => {
                summary.events.extend(events);
                summary.assigned.push(assignment);
            }
            Err(error) => {
                tracing::warn!(task = %assignment.task, %error, "assignment dropped");
                summary.conflicts += 1;
            }
        }
    }

    // Phase 2: reallocation, over the state the allocation left behind
    let snapshot = store.snapshot()?;
    let releases =
        Reallocator::new(&config.allocation).plan(&snapshot.tasks, &snapshot.workers, now);

    for release in releases {
        let result = store.transition_if(&release.task, TaskState::Assigned, TaskEvent::Release);
        match result {
            Ok(events) => {
                summary.events.extend(events);
                summary.released.push(release);
            }
            Err(error) => {
                tracing::warn!(task = %release.task, %error, "release dropped");
                summary.conflicts += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "pass_tests.rs"]
mod tests;
