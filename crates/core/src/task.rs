// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state machine
//!
//! A task is one servicing job tied to one aircraft departure. The record
//! keeps the departure times as the raw strings the importer delivered;
//! `effective_time` resolves them on demand so a malformed row degrades to
//! a skipped task rather than a rejected import.

use crate::clock::Clock;
use crate::effect::Event;
use crate::worker::WorkerId;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// The lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// In the pool, waiting for allocation
    Unassigned,
    /// Committed to a worker
    Assigned,
    /// Committed and physically coupled to the aircraft
    HookedUp,
    /// Finished; excluded from allocation and reallocation
    Complete,
}

/// Events that can change task state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    /// Commit the task to a worker
    Assign { worker: WorkerId },
    /// Couple the assigned worker to the aircraft
    HookUp,
    /// Mark the task finished
    Complete,
    /// Reopen a completed task ("mark incomplete")
    Undo,
    /// Return the task to the unassigned pool
    Release,
}

impl TaskEvent {
    /// Event name for error messages and log labels
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::Assign { .. } => "assign",
            TaskEvent::HookUp => "hook_up",
            TaskEvent::Complete => "complete",
            TaskEvent::Undo => "undo",
            TaskEvent::Release => "release",
        }
    }
}

/// Rejected transition; the task is unchanged
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("precondition violation: task {id} in state {state:?} cannot accept {event}")]
    PreconditionViolation {
        id: TaskId,
        state: TaskState,
        event: &'static str,
    },
}

/// The effective departure time could not be resolved from STD/ETD
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unresolvable departure time for task {id} (std={std:?}, etd={etd:?})")]
pub struct TimeParseError {
    pub id: TaskId,
    pub std: Option<String>,
    pub etd: Option<String>,
}

/// A servicing task for one departure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Flight designator, e.g. "QF402"
    pub flight: String,
    /// Aircraft registration
    pub tail: String,
    /// Aircraft type, e.g. "B738"
    pub aircraft_type: String,
    /// Scheduled departure as delivered, e.g. "07:00"
    pub std: Option<String>,
    /// Estimated departure; overrides STD for scheduling when present
    pub etd: Option<String>,
    pub assigned_to: Option<WorkerId>,
    pub state: TaskState,
    /// Set exactly while the task is in `Complete`
    pub completed_at: Option<NaiveTime>,
    /// Free text, no allocation semantics
    pub note: Option<String>,
}

impl Task {
    /// Create a new task in the Unassigned state
    pub fn new(
        id: impl Into<TaskId>,
        flight: impl Into<String>,
        tail: impl Into<String>,
        aircraft_type: impl Into<String>,
    ) -> Self {
        Task {
            id: id.into(),
            flight: flight.into(),
            tail: tail.into(),
            aircraft_type: aircraft_type.into(),
            std: None,
            etd: None,
            assigned_to: None,
            state: TaskState::Unassigned,
            completed_at: None,
            note: None,
        }
    }

    /// Set the scheduled departure time
    pub fn with_std(mut self, std: impl Into<String>) -> Self {
        self.std = Some(std.into());
        self
    }

    /// Set the estimated departure time
    pub fn with_etd(mut self, etd: impl Into<String>) -> Self {
        self.etd = Some(etd.into());
        self
    }

    /// Attach a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Resolve the effective departure time: ETD if present and parseable,
    /// otherwise STD.
    pub fn effective_time(&self) -> Result<NaiveTime, TimeParseError> {
        if let Some(etd) = self.etd.as_deref() {
            if let Some(time) = parse_time_of_day(etd) {
                return Ok(time);
            }
        }
        if let Some(std) = self.std.as_deref() {
            if let Some(time) = parse_time_of_day(std) {
                return Ok(time);
            }
        }
        Err(TimeParseError {
            id: self.id.clone(),
            std: self.std.clone(),
            etd: self.etd.clone(),
        })
    }

    /// Pure transition function - returns the new task and emitted events,
    /// or rejects the event leaving the task untouched.
    pub fn transition(
        &self,
        event: TaskEvent,
        clock: &impl Clock,
    ) -> Result<(Task, Vec<Event>), TransitionError> {
        let now = clock.now();

        match (self.state, &event) {
            // Unassigned → Assigned
            (TaskState::Unassigned, TaskEvent::Assign { worker }) => {
                let task = Task {
                    state: TaskState::Assigned,
                    assigned_to: Some(worker.clone()),
                    ..self.clone()
                };
                let events = vec![Event::TaskAssigned {
                    id: self.id.clone(),
                    worker: worker.clone(),
                }];
                Ok((task, events))
            }

            // Assigned → HookedUp (worker reference unchanged)
            (TaskState::Assigned, TaskEvent::HookUp) => {
                let task = Task {
                    state: TaskState::HookedUp,
                    ..self.clone()
                };
                Ok((task, vec![Event::TaskHookedUp { id: self.id.clone() }]))
            }

            // Assigned/HookedUp → Complete; worker reference retained for history
            (TaskState::Assigned | TaskState::HookedUp, TaskEvent::Complete) => {
                let task = Task {
                    state: TaskState::Complete,
                    completed_at: Some(now),
                    ..self.clone()
                };
                Ok((task, vec![Event::TaskCompleted { id: self.id.clone() }]))
            }

            // Complete → Assigned (undo); completion timestamp cleared
            (TaskState::Complete, TaskEvent::Undo) => {
                let task = Task {
                    state: TaskState::Assigned,
                    completed_at: None,
                    ..self.clone()
                };
                Ok((task, vec![Event::TaskReopened { id: self.id.clone() }]))
            }

            // Assigned/HookedUp → Unassigned (release); worker reference cleared
            (TaskState::Assigned | TaskState::HookedUp, TaskEvent::Release) => {
                let Some(worker) = self.assigned_to.clone() else {
                    // An assigned task without a worker reference is itself
                    // a broken precondition.
                    return Err(self.violation(&event));
                };
                let task = Task {
                    state: TaskState::Unassigned,
                    assigned_to: None,
                    ..self.clone()
                };
                let events = vec![Event::TaskReleased {
                    id: self.id.clone(),
                    worker,
                }];
                Ok((task, events))
            }

            _ => Err(self.violation(&event)),
        }
    }

    fn violation(&self, event: &TaskEvent) -> TransitionError {
        TransitionError::PreconditionViolation {
            id: self.id.clone(),
            state: self.state,
            event: event.name(),
        }
    }

    /// Check if the task is waiting in the pool
    pub fn is_unassigned(&self) -> bool {
        self.state == TaskState::Unassigned
    }

    /// Check if the task is hooked up
    pub fn is_hooked_up(&self) -> bool {
        self.state == TaskState::HookedUp
    }

    /// Check if the task is complete
    pub fn is_complete(&self) -> bool {
        self.state == TaskState::Complete
    }

    /// Check if the task still participates in allocation (not complete)
    pub fn is_open(&self) -> bool {
        self.state != TaskState::Complete
    }
}

/// Parse a movement-sheet time-of-day value ("07:00" or "07:00:00")
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
