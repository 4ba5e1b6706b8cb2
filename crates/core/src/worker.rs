// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker record. Workers live only in memory; a silent death is detected
//! through the heartbeat window, never through deregistration.

use crate::id::{JobId, WorkerId};
use serde::{Deserialize, Serialize};

/// A registered worker process and its capability set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: WorkerId,
    pub name: String,
    #[serde(default)]
    pub executors: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
    /// Epoch ms of the last registration or heartbeat.
    pub last_seen_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_job_id: Option<JobId>,
}

impl Worker {
    /// Active iff the last heartbeat falls inside the seen window.
    pub fn is_active(&self, now_ms: u64, seen_window_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen_ms) <= seen_window_ms
    }

    pub fn supports_executor(&self, executor: &str) -> bool {
        self.executors.iter().any(|e| e == executor)
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
