// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ramp_core::FakeClock;
use chrono::NaiveTime;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn store() -> MemoryStore<FakeClock> {
    MemoryStore::with_clock(FakeClock::at(t(6, 0)))
}

fn task(id: &str, std: &str) -> Task {
    Task::new(id, format!("QF-{id}"), "VH-VXA", "B738").with_std(std)
}

fn seeded() -> MemoryStore<FakeClock> {
    let store = store();
    store
        .put_worker(Worker::new("w-1", "Adam").with_shift(t(6, 0), t(14, 0)))
        .unwrap();
    store.create_task(task("t-1", "07:00")).unwrap();
    store
}

#[test]
fn create_task_rejects_duplicates() {
    let store = seeded();
    let err = store.create_task(task("t-1", "08:00")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTask(_)));
}

#[test]
fn remove_task_returns_the_record() {
    let store = seeded();
    let removed = store.remove_task(&TaskId::from("t-1")).unwrap();
    assert_eq!(removed.id, TaskId::from("t-1"));
    assert!(store.get_task(&TaskId::from("t-1")).is_none());

    let err = store.remove_task(&TaskId::from("t-1")).unwrap_err();
    assert!(matches!(err, StoreError::TaskNotFound(_)));
}

#[test]
fn assign_requires_a_known_active_worker() {
    let store = seeded();

    let err = store
        .transition(
            &TaskId::from("t-1"),
            TaskEvent::Assign {
                worker: WorkerId::from("w-ghost"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownWorker(_)));

    store
        .put_worker(Worker::new("w-2", "Tadj").with_active(false))
        .unwrap();
    let err = store
        .transition(
            &TaskId::from("t-1"),
            TaskEvent::Assign {
                worker: WorkerId::from("w-2"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InactiveWorker(_)));

    // Task unchanged after both rejections
    assert!(store.get_task(&TaskId::from("t-1")).unwrap().is_unassigned());
}

#[test]
fn transition_walks_the_lifecycle() {
    let store = seeded();
    let id = TaskId::from("t-1");

    let events = store
        .transition(
            &id,
            TaskEvent::Assign {
                worker: WorkerId::from("w-1"),
            },
        )
        .unwrap();
    assert_eq!(events[0].name(), "task:assigned");

    store.transition(&id, TaskEvent::HookUp).unwrap();
    assert!(store.get_task(&id).unwrap().is_hooked_up());

    let events = store.transition(&id, TaskEvent::Complete).unwrap();
    assert_eq!(events[0].name(), "task:completed");
    let done = store.get_task(&id).unwrap();
    assert!(done.is_complete());
    assert_eq!(done.completed_at, Some(t(6, 0)));
}

#[test]
fn invalid_transition_is_surfaced_and_changes_nothing() {
    let store = seeded();
    let id = TaskId::from("t-1");

    let err = store.transition(&id, TaskEvent::Complete).unwrap_err();
    assert!(matches!(err, StoreError::Transition(_)));

    let unchanged = store.get_task(&id).unwrap();
    assert!(unchanged.is_unassigned());
    assert!(unchanged.completed_at.is_none());
}

#[test]
fn transition_if_rejects_stale_readers() {
    let store = seeded();
    let id = TaskId::from("t-1");

    // Reader A and reader B both observe Unassigned
    let observed = store.get_task(&id).unwrap().state;

    // A wins the race
    store
        .transition_if(
            &id,
            observed,
            TaskEvent::Assign {
                worker: WorkerId::from("w-1"),
            },
        )
        .unwrap();

    // B's commit against the stale observation fails, state is untouched
    let err = store
        .transition_if(
            &id,
            observed,
            TaskEvent::Assign {
                worker: WorkerId::from("w-1"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(
        store.get_task(&id).unwrap().assigned_to,
        Some(WorkerId::from("w-1"))
    );
}

#[test]
fn deactivating_a_worker_releases_open_tasks() {
    let store = seeded();
    store.create_task(task("t-2", "09:00")).unwrap();
    for id in ["t-1", "t-2"] {
        store
            .transition(
                &TaskId::from(id),
                TaskEvent::Assign {
                    worker: WorkerId::from("w-1"),
                },
            )
            .unwrap();
    }
    // A completed task stays with its history
    store.create_task(task("t-3", "06:30")).unwrap();
    store
        .transition(
            &TaskId::from("t-3"),
            TaskEvent::Assign {
                worker: WorkerId::from("w-1"),
            },
        )
        .unwrap();
    store
        .transition(&TaskId::from("t-3"), TaskEvent::Complete)
        .unwrap();

    let events = store
        .put_worker(Worker::new("w-1", "Adam").with_active(false))
        .unwrap();

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.name() == "task:released"));
    assert!(store.get_task(&TaskId::from("t-1")).unwrap().is_unassigned());
    assert!(store.get_task(&TaskId::from("t-2")).unwrap().is_unassigned());
    let done = store.get_task(&TaskId::from("t-3")).unwrap();
    assert!(done.is_complete());
    assert_eq!(done.assigned_to, Some(WorkerId::from("w-1")));
}

#[test]
fn tasks_for_worker_orders_by_effective_time() {
    let store = seeded();
    store.create_task(task("t-2", "06:30")).unwrap();
    store.create_task(Task::new("t-3", "QF-t-3", "VH-VXC", "B738")).unwrap();
    for id in ["t-1", "t-2", "t-3"] {
        store
            .transition(
                &TaskId::from(id),
                TaskEvent::Assign {
                    worker: WorkerId::from("w-1"),
                },
            )
            .unwrap();
    }

    let tasks = store.tasks_for_worker(&WorkerId::from("w-1")).unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.0.as_str()).collect();

    // t-3 has no parseable time and sorts last
    assert_eq!(ids, vec!["t-2", "t-1", "t-3"]);
}

#[test]
fn unassigned_tasks_excludes_assigned_and_complete() {
    let store = seeded();
    store.create_task(task("t-2", "06:30")).unwrap();
    store.create_task(task("t-3", "08:00")).unwrap();
    store
        .transition(
            &TaskId::from("t-1"),
            TaskEvent::Assign {
                worker: WorkerId::from("w-1"),
            },
        )
        .unwrap();

    let pool = store.unassigned_tasks().unwrap();
    let ids: Vec<_> = pool.iter().map(|t| t.id.0.as_str()).collect();
    assert_eq!(ids, vec!["t-2", "t-3"]);
}

#[test]
fn snapshot_is_a_consistent_copy() {
    let store = seeded();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.workers.len(), 1);

    // Mutating the store afterwards does not alter the copy
    store.create_task(task("t-2", "09:00")).unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
}

#[test]
fn snapshot_serializes_for_the_dashboard() {
    let store = seeded();
    let snapshot = store.snapshot().unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"t-1\""));
    assert!(json.contains("\"w-1\""));
}

#[test]
fn racing_writers_serialize_to_one_winner() {
    let store = std::sync::Arc::new(seeded());
    let id = TaskId::from("t-1");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = std::sync::Arc::clone(&store);
        let id = id.clone();
        handles.push(std::thread::spawn(move || {
            store.transition_if(
                &id,
                TaskState::Unassigned,
                TaskEvent::Assign {
                    worker: WorkerId::from("w-1"),
                },
            )
        }));
    }

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(outcomes.iter().filter(|r| r.is_err()).count(), 3);
}
