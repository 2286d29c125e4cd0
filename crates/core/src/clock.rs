// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Allocation works on the operational day's schedule, so the clock speaks
//! time-of-day rather than monotonic instants.

use chrono::NaiveTime;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clock that provides the current time of day
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Real system clock (local time of day)
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<NaiveTime>>,
}

impl FakeClock {
    /// Create a fake clock at the start of the day (00:00)
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(NaiveTime::MIN)),
        }
    }

    /// Create a fake clock at a specific time of day
    pub fn at(time: NaiveTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(time)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = *current + chrono::Duration::seconds(duration.as_secs() as i64);
    }

    /// Set the clock to a specific time of day
    pub fn set(&self, time: NaiveTime) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = time;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveTime {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
