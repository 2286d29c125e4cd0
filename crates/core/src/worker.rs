// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker roster records and derived workload snapshots
//!
//! The snapshot is the scorer's and reallocator's view of a worker: the
//! outstanding assigned tasks with resolved times, earliest first. It is
//! derived, never stored, and is folded forward inside an allocation pass
//! as commitments accumulate.

use crate::task::{Task, TaskId};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for a worker
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        WorkerId(s)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        WorkerId(s.to_string())
    }
}

/// A worker's shift window for the operational day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Shift {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// A rostered worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    /// Inactive workers are never allocation candidates
    pub active: bool,
    /// A worker without a shift window is never eligible
    pub shift: Option<Shift>,
}

impl Worker {
    /// Create an active worker with no shift window yet
    pub fn new(id: impl Into<WorkerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            shift: None,
        }
    }

    /// Set the shift window
    pub fn with_shift(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.shift = Some(Shift::new(start, end));
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// One outstanding assigned task as seen by the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub id: TaskId,
    pub effective: NaiveTime,
    pub aircraft_type: String,
    pub hooked_up: bool,
}

/// Derived view of a worker's outstanding work, earliest first
#[derive(Debug, Clone, Default)]
pub struct WorkerSnapshot {
    pending: Vec<PendingTask>,
}

impl WorkerSnapshot {
    /// Build the snapshot from the open task set.
    ///
    /// Tasks whose effective time passed more than `grace` ago are treated
    /// as underway and dropped from the view; tasks whose time cannot be
    /// resolved are skipped with a warning and retried on a later pass.
    pub fn build(worker_id: &WorkerId, tasks: &[Task], now: NaiveTime, grace: Duration) -> Self {
        let grace_mins = grace.as_secs() as i64 / 60;
        let mut pending = Vec::new();

        for task in tasks {
            if !task.is_open() || task.assigned_to.as_ref() != Some(worker_id) {
                continue;
            }
            let effective = match task.effective_time() {
                Ok(time) => time,
                Err(error) => {
                    tracing::warn!(task = %task.id, %error, "skipping task in snapshot");
                    continue;
                }
            };
            if now.signed_duration_since(effective).num_minutes() > grace_mins {
                continue;
            }
            pending.push(PendingTask {
                id: task.id.clone(),
                effective,
                aircraft_type: task.aircraft_type.clone(),
                hooked_up: task.is_hooked_up(),
            });
        }

        pending.sort_by(|a, b| a.effective.cmp(&b.effective).then(a.id.cmp(&b.id)));
        Self { pending }
    }

    /// The worker's current task: earliest outstanding
    pub fn current(&self) -> Option<&PendingTask> {
        self.pending.first()
    }

    /// The task queued directly behind the current one
    pub fn queued(&self) -> Option<&PendingTask> {
        self.pending.get(1)
    }

    /// Effective time of the latest outstanding commitment, or None when
    /// the worker is unoccupied
    pub fn last_committed(&self) -> Option<NaiveTime> {
        self.pending.last().map(|t| t.effective)
    }

    /// Aircraft type of the latest outstanding commitment
    pub fn last_aircraft_type(&self) -> Option<&str> {
        self.pending.last().map(|t| t.aircraft_type.as_str())
    }

    /// Whether the worker is physically coupled to an aircraft
    pub fn is_coupled(&self) -> bool {
        self.pending.iter().any(|t| t.hooked_up)
    }

    /// Number of outstanding tasks
    pub fn open_count(&self) -> usize {
        self.pending.len()
    }

    /// Outstanding tasks, earliest first
    pub fn pending(&self) -> &[PendingTask] {
        &self.pending
    }

    /// Fold a freshly planned commitment into the snapshot so later
    /// candidates in the same pass see it.
    pub fn commit(&mut self, task: PendingTask) {
        let at = self
            .pending
            .partition_point(|t| (t.effective, &t.id) <= (task.effective, &task.id));
        self.pending.insert(at, task);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
