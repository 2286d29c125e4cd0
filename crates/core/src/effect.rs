// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by state machine transitions
//!
//! Transitions return the events they produce; the engine (or a manual
//! caller) logs and forwards them. Events carry everything an observer
//! needs, so consumers never re-read the store to interpret one.

use crate::task::TaskId;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

/// Events emitted by task transitions and store operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Task committed to a worker
    TaskAssigned { id: TaskId, worker: WorkerId },
    /// Worker physically coupled to the aircraft for this task
    TaskHookedUp { id: TaskId },
    /// Task finished; completion timestamp recorded
    TaskCompleted { id: TaskId },
    /// Completed task reopened (undo), back on the worker's queue
    TaskReopened { id: TaskId },
    /// Task returned to the unassigned pool
    TaskReleased { id: TaskId, worker: WorkerId },
}

impl Event {
    /// Event name in `component:action` form, for log labels and filtering
    pub fn name(&self) -> &'static str {
        match self {
            Event::TaskAssigned { .. } => "task:assigned",
            Event::TaskHookedUp { .. } => "task:hooked-up",
            Event::TaskCompleted { .. } => "task:completed",
            Event::TaskReopened { .. } => "task:reopened",
            Event::TaskReleased { .. } => "task:released",
        }
    }

    /// The task this event concerns
    pub fn task_id(&self) -> &TaskId {
        match self {
            Event::TaskAssigned { id, .. }
            | Event::TaskHookedUp { id }
            | Event::TaskCompleted { id }
            | Event::TaskReopened { id }
            | Event::TaskReleased { id, .. } => id,
        }
    }
}
