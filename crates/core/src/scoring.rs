// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suitability scoring for (task, worker) pairs
//!
//! The scorer is a pure function over a candidate, a worker, and the
//! worker's workload snapshot. Hard constraints return `None`
//! (ineligible); eligible pairs get a signed score in minutes, higher is
//! better.

use crate::config::AllocationConfig;
use crate::task::{Task, TaskId, TimeParseError};
use crate::worker::{Worker, WorkerSnapshot};
use chrono::NaiveTime;

/// Signed minutes from `from` to `to`
pub fn minutes_between(from: NaiveTime, to: NaiveTime) -> i64 {
    to.signed_duration_since(from).num_minutes()
}

/// A task under evaluation, with its effective time already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: TaskId,
    pub effective: NaiveTime,
    pub aircraft_type: String,
}

impl Candidate {
    /// Resolve a task into a candidate; fails when neither STD nor ETD
    /// parses.
    pub fn resolve(task: &Task) -> Result<Self, TimeParseError> {
        Ok(Self {
            id: task.id.clone(),
            effective: task.effective_time()?,
            aircraft_type: task.aircraft_type.clone(),
        })
    }
}

/// Scores (task, worker) pairs against one workload snapshot
pub struct Scorer<'a> {
    config: &'a AllocationConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self { config }
    }

    /// Score a candidate for a worker. `None` means ineligible.
    ///
    /// Eligibility gates: the worker is active, has a shift window that
    /// contains the candidate's effective time with the configured buffer
    /// on both ends, is not hooked up to an aircraft, holds no commitment
    /// at the candidate's exact effective time, and is not already
    /// committed to a current task inside the release threshold (handing
    /// such a worker new work would only be undone by the next
    /// reallocation).
    pub fn score(
        &self,
        candidate: &Candidate,
        worker: &Worker,
        snapshot: &WorkerSnapshot,
        now: NaiveTime,
    ) -> Option<i64> {
        if !worker.active {
            return None;
        }
        let shift = worker.shift?;

        let buffer = self.config.shift_buffer.as_secs() as i64 / 60;
        if minutes_between(shift.start, candidate.effective) < buffer {
            return None;
        }
        if minutes_between(candidate.effective, shift.end) < buffer {
            return None;
        }

        if snapshot.is_coupled() {
            return None;
        }

        // Never double-book a worker at the same instant
        if snapshot
            .pending()
            .iter()
            .any(|t| t.effective == candidate.effective)
        {
            return None;
        }

        let release = self.config.release_threshold.as_secs() as i64 / 60;
        if let Some(current) = snapshot.current() {
            if minutes_between(now, current.effective) < release {
                return None;
            }
        }

        let mut score = match snapshot.last_committed() {
            Some(last) => minutes_between(last, candidate.effective),
            None => self.config.unoccupied_base,
        };

        if let Some(last_type) = snapshot.last_aircraft_type() {
            if last_type != candidate.aircraft_type {
                score -= self.config.type_switch_penalty;
            }
        }

        score -= self.config.load_penalty * snapshot.open_count() as i64;

        Some(score)
    }
}

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod tests;
