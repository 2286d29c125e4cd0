// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allocation planning
//!
//! One planning pass over a consistent snapshot of tasks and workers.
//! Candidates are taken earliest first because each decision is folded
//! into the winning worker's snapshot before the next candidate is
//! scored; ordering changes the outcome.

use crate::config::{AllocationConfig, TieBreak};
use crate::scoring::{Candidate, Scorer};
use crate::task::{Task, TaskId};
use crate::worker::{PendingTask, Worker, WorkerId, WorkerSnapshot};
use chrono::NaiveTime;
use std::collections::HashMap;

/// One planned assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub task: TaskId,
    pub worker: WorkerId,
    pub score: i64,
}

/// Result of one allocation planning pass
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    pub assignments: Vec<Assignment>,
    /// Tasks whose effective time could not be resolved; retried next pass
    pub skipped: Vec<TaskId>,
}

/// Plans assignments for the unassigned pool
pub struct Allocator<'a> {
    config: &'a AllocationConfig,
}

impl<'a> Allocator<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self { config }
    }

    /// Plan assignments over one snapshot.
    ///
    /// `tasks` is the full open task set (assigned tasks feed the worker
    /// snapshots, unassigned ones are the candidates). A task with no
    /// eligible worker is simply left out of the plan.
    pub fn plan(&self, tasks: &[Task], workers: &[Worker], now: NaiveTime) -> AllocationPlan {
        let scorer = Scorer::new(self.config);

        let mut snapshots: HashMap<WorkerId, WorkerSnapshot> = workers
            .iter()
            .filter(|w| w.active)
            .map(|w| {
                let snapshot =
                    WorkerSnapshot::build(&w.id, tasks, now, self.config.current_grace);
                (w.id.clone(), snapshot)
            })
            .collect();

        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        for task in tasks.iter().filter(|t| t.is_unassigned()) {
            match Candidate::resolve(task) {
                Ok(candidate) => candidates.push(candidate),
                Err(error) => {
                    tracing::warn!(task = %task.id, %error, "skipping unallocatable task");
                    skipped.push(task.id.clone());
                }
            }
        }
        candidates.sort_by(|a, b| a.effective.cmp(&b.effective).then(a.id.cmp(&b.id)));

        let mut assignments = Vec::new();
        for candidate in candidates {
            let mut best: Option<(i64, WorkerId)> = None;

            for worker in workers.iter().filter(|w| w.active) {
                let Some(snapshot) = snapshots.get(&worker.id) else {
                    continue;
                };
                let Some(score) = scorer.score(&candidate, worker, snapshot, now) else {
                    continue;
                };
                let wins = match &best {
                    None => true,
                    Some((best_score, best_id)) => {
                        score > *best_score
                            || (score == *best_score
                                && self.config.tie_break == TieBreak::LowestWorkerId
                                && worker.id < *best_id)
                    }
                };
                if wins {
                    best = Some((score, worker.id.clone()));
                }
            }

            let Some((score, worker_id)) = best else {
                continue; // no eligible worker: not an error, retried next pass
            };

            if let Some(snapshot) = snapshots.get_mut(&worker_id) {
                snapshot.commit(PendingTask {
                    id: candidate.id.clone(),
                    effective: candidate.effective,
                    aircraft_type: candidate.aircraft_type.clone(),
                    hooked_up: false,
                });
            }
            assignments.push(Assignment {
                task: candidate.id,
                worker: worker_id,
                score,
            });
        }

        AllocationPlan {
            assignments,
            skipped,
        }
    }
}

#[cfg(test)]
#[path = "allocate_tests.rs"]
mod tests;
