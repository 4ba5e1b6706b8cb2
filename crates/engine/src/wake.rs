// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wake broker for claim long-polls.
//!
//! One `Notify` per executor. Enqueue, requeue, and cancel wake every
//! waiter for the executor; each woken claim re-enters the search, and
//! the losers go back to waiting. No busy-polling.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
pub struct WakeBroker {
    channels: Mutex<HashMap<String, Arc<Notify>>>,
}

impl WakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The notify channel for an executor, created on first use.
    pub fn channel(&self, executor: &str) -> Arc<Notify> {
        let mut channels = self.channels.lock();
        Arc::clone(
            channels
                .entry(executor.to_string())
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    /// Wake every claim currently waiting on the executor.
    pub fn wake(&self, executor: &str) {
        if let Some(notify) = self.channels.lock().get(executor) {
            notify.notify_waiters();
        }
    }
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;
