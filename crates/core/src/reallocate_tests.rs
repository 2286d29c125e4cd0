// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::task::TaskEvent;
use chrono::NaiveTime;
use yare::parameterized;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn assigned(id: &str, std: &str, worker: &str) -> Task {
    let clock = FakeClock::at(t(5, 0));
    let (task, _) = Task::new(id, format!("QF-{id}"), "VH-VXA", "B738")
        .with_std(std)
        .transition(
            TaskEvent::Assign {
                worker: WorkerId::from(worker),
            },
            &clock,
        )
        .unwrap();
    task
}

fn rostered(id: &str) -> Worker {
    Worker::new(id, id).with_shift(t(5, 0), t(18, 0))
}

#[test]
fn compressed_current_releases_the_queued_task() {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let tasks = [
        assigned("t-cur", "08:10", "w-1"),
        assigned("t-queued", "09:30", "w-1"),
    ];
    let workers = [rostered("w-1")];

    // Current task 10 minutes out, threshold 15
    let releases = reallocator.plan(&tasks, &workers, t(8, 0));

    assert_eq!(
        releases,
        vec![Release {
            task: TaskId::from("t-queued"),
            worker: WorkerId::from("w-1"),
        }]
    );
}

#[parameterized(
    well_clear = { 40, false },
    at_threshold = { 15, false },
    just_inside = { 14, true },
    imminent = { 5, true },
)]
fn release_depends_on_minutes_to_current(minutes_out: u32, expect_release: bool) {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let tasks = [
        assigned("t-cur", &format!("08:{minutes_out:02}"), "w-1"),
        assigned("t-queued", "10:00", "w-1"),
    ];
    let workers = [rostered("w-1")];

    let releases = reallocator.plan(&tasks, &workers, t(8, 0));

    assert_eq!(!releases.is_empty(), expect_release);
}

#[test]
fn worker_with_single_task_is_left_alone() {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let tasks = [assigned("t-cur", "08:05", "w-1")];
    let workers = [rostered("w-1")];

    let releases = reallocator.plan(&tasks, &workers, t(8, 0));
    assert!(releases.is_empty());
}

#[test]
fn hooked_up_current_task_exempts_the_worker() {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let clock = FakeClock::at(t(8, 0));
    let (hooked, _) = assigned("t-cur", "08:05", "w-1")
        .transition(TaskEvent::HookUp, &clock)
        .unwrap();
    let tasks = [hooked, assigned("t-queued", "09:30", "w-1")];
    let workers = [rostered("w-1")];

    let releases = reallocator.plan(&tasks, &workers, t(8, 0));
    assert!(releases.is_empty());
}

#[test]
fn inactive_workers_are_not_inspected() {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let tasks = [
        assigned("t-cur", "08:05", "w-1"),
        assigned("t-queued", "09:30", "w-1"),
    ];
    let workers = [rostered("w-1").with_active(false)];

    let releases = reallocator.plan(&tasks, &workers, t(8, 0));
    assert!(releases.is_empty());
}

#[test]
fn only_the_second_task_is_released() {
    let config = AllocationConfig::default();
    let reallocator = Reallocator::new(&config);

    let tasks = [
        assigned("t-cur", "08:10", "w-1"),
        assigned("t-second", "09:00", "w-1"),
        assigned("t-third", "10:30", "w-1"),
    ];
    let workers = [rostered("w-1")];

    let releases = reallocator.plan(&tasks, &workers, t(8, 0));

    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].task, TaskId::from("t-second"));
}
