// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reallocation planning
//!
//! When a worker's current task has compressed to within the release
//! threshold, the task queued behind it is returned to the pool so the
//! next allocation pass can hand it to someone who can actually reach it.
//! The current task itself is never pulled.

use crate::config::AllocationConfig;
use crate::scoring::minutes_between;
use crate::task::{Task, TaskId};
use crate::worker::{Worker, WorkerId, WorkerSnapshot};
use chrono::NaiveTime;

/// One planned release: the queued task freed from the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub task: TaskId,
    pub worker: WorkerId,
}

/// Plans releases for deadline-compressed workers
pub struct Reallocator<'a> {
    config: &'a AllocationConfig,
}

impl<'a> Reallocator<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self { config }
    }

    /// Plan releases over one snapshot.
    pub fn plan(&self, tasks: &[Task], workers: &[Worker], now: NaiveTime) -> Vec<Release> {
        let threshold = self.config.release_threshold.as_secs() as i64 / 60;
        let mut releases = Vec::new();

        for worker in workers.iter().filter(|w| w.active) {
            let snapshot =
                WorkerSnapshot::build(&worker.id, tasks, now, self.config.current_grace);

            let Some(current) = snapshot.current() else {
                continue;
            };
            // A hooked-up current task means the worker is correctly
            // occupied; leave the queue alone.
            if current.hooked_up {
                continue;
            }
            if minutes_between(now, current.effective) >= threshold {
                continue;
            }
            let Some(queued) = snapshot.queued() else {
                continue;
            };
            if queued.hooked_up {
                continue;
            }

            releases.push(Release {
                task: queued.id.clone(),
                worker: worker.id.clone(),
            });
        }

        releases
    }
}

#[cfg(test)]
#[path = "reallocate_tests.rs"]
mod tests;
