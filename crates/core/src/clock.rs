// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source for lifecycle decisions.
//!
//! Liveness windows, claim stamps, and reaper deadlines all run on
//! epoch milliseconds, so that is the whole clock contract. Tests hand-
//! drive a counter instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Where the gateway reads "now" from.
pub trait Clock: Clone + Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-driven clock for tests. Starts at a fixed epoch and only moves
/// when advanced; clones share the same counter.
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

/// Arbitrary but recognizable test epoch.
const FAKE_EPOCH_START_MS: u64 = 1_000_000;

impl FakeClock {
    pub fn new() -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(FAKE_EPOCH_START_MS)),
        }
    }

    /// Move the clock forward by the given duration.
    pub fn advance(&self, duration: Duration) {
        self.epoch_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute epoch value.
    pub fn set_epoch_ms(&self, ms: u64) {
        self.epoch_ms.store(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
