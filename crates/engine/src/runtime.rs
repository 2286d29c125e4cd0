// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine handle and the periodic allocation loop
//!
//! The loop is an explicit tokio task with a stop handle, not a detached
//! thread. Passes are synchronous between await points, so cancellation
//! lands between passes and never inside a commit.

use crate::error::EngineError;
use crate::pass::{run_pass, PassSummary};
use ramp_core::{Clock, EngineConfig, IdGen, SystemClock, UuidIdGen};
use ramp_storage::TaskStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The allocation engine: a store, a configuration, and a clock
pub struct Engine<S, C = SystemClock, G = UuidIdGen>
where
    S: TaskStore + ?Sized,
{
    store: Arc<S>,
    config: EngineConfig,
    clock: C,
    ids: G,
}

impl<S: TaskStore + ?Sized> Engine<S> {
    /// Create an engine on the system clock
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self::with_parts(store, config, SystemClock, UuidIdGen)
    }
}

impl<S, C, G> Clone for Engine<S, C, G>
where
    S: TaskStore + ?Sized,
    C: Clock,
    G: IdGen,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<S, C, G> Engine<S, C, G>
where
    S: TaskStore + ?Sized,
    C: Clock,
    G: IdGen,
{
    /// Create an engine with an injected clock and id generator
    pub fn with_parts(store: Arc<S>, config: EngineConfig, clock: C, ids: G) -> Self {
        Self {
            store,
            config,
            clock,
            ids,
        }
    }

    /// Run one allocation pass now.
    ///
    /// Invoked by the periodic loop and by external events such as a
    /// finished schedule import.
    pub fn run_once(&self) -> Result<PassSummary, EngineError> {
        let pass_id = self.ids.next();
        let span = tracing::info_span!("pass", id = %pass_id);
        let _enter = span.enter();

        let summary = run_pass(self.store.as_ref(), &self.config, &self.clock)?;

        for event in &summary.events {
            tracing::info!(event = event.name(), task = %event.task_id(), "applied");
        }
        if !summary.is_quiet() || !summary.skipped.is_empty() {
            tracing::info!(
                assigned = summary.assigned.len(),
                released = summary.released.len(),
                skipped = summary.skipped.len(),
                conflicts = summary.conflicts,
                "pass done"
            );
        }

        Ok(summary)
    }

    fn run_logged(&self) {
        if let Err(error) = self.run_once() {
            // Keep ticking; the store may be reachable again next time
            tracing::warn!(%error, "allocation pass failed");
        }
    }
}

impl<S, C, G> Engine<S, C, G>
where
    S: TaskStore + ?Sized + 'static,
    C: Clock + 'static,
    G: IdGen + 'static,
{
    /// Start the periodic loop. The first pass runs immediately.
    pub fn start_loop(&self) -> EngineLoop {
        let engine = self.clone();
        let interval = self.config.interval;
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => engine.run_logged(),
                    Some(()) = trigger_rx.recv() => engine.run_logged(),
                }
            }
            tracing::info!("allocation loop stopped");
        });

        EngineLoop {
            trigger_tx,
            shutdown_tx,
            handle,
        }
    }
}

/// Handle to a running allocation loop
pub struct EngineLoop {
    trigger_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl EngineLoop {
    /// Request an ad-hoc pass (e.g. after a bulk import or a manual edit).
    ///
    /// Triggers coalesce: if a pass is already queued, this one rides
    /// along with it.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.try_send(());
    }

    /// Stop the loop and wait for it to wind down
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
