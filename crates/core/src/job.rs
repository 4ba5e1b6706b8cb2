// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record: one dispatch attempt of one atomic task.

use crate::id::{JobId, PackId, TaskId, WorkerId};
use crate::submit::Submit;
use crate::task::Runner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Upper bound kept of worker stdout/stderr, in bytes.
pub const STDIO_TAIL_MAX: usize = 16 * 1024;

/// Status of a job through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-claim attestation material. The nonce is generated server-side at
/// claim and must be folded into every pack-file hash the worker reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub nonce: String,
}

/// Hashes a worker reports at completion: per-file raw sha256 and the
/// nonce-bound variant, plus the pair for the pack manifest JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionHashes {
    #[serde(default)]
    pub task_bundle_files_sha256: BTreeMap<String, String>,
    #[serde(default)]
    pub task_bundle_files_attest_sha256: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_pack_v1_json_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_pack_v1_json_attest_sha256: Option<String>,
}

/// Completion record a worker posts for a running job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    #[serde(rename = "workerId")]
    pub worker_id: WorkerId,
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Echo of the nonce issued at claim.
    pub attestation_nonce: String,
    pub submit: Submit,
    #[serde(flatten)]
    pub hashes: CompletionHashes,
}

/// A single dispatch attempt bound to one atomic task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub executor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt: String,
    pub status: JobStatus,
    #[serde(default)]
    pub runner: Runner,
    pub priority: i64,
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: u64,
    #[serde(rename = "createdAt")]
    pub created_at_ms: u64,
    #[serde(rename = "claimedAt", default, skip_serializing_if = "Option::is_none")]
    pub claimed_at_ms: Option<u64>,
    #[serde(
        rename = "completedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at_ms: Option<u64>,
    #[serde(rename = "workerId", default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
    #[serde(rename = "exitCode", default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<Attestation>,
    #[serde(
        rename = "contextPackV1Id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub context_pack_v1_id: Option<PackId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_hashes: Option<CompletionHashes>,
    /// The submission that finished this job, kept on the terminal record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Submit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Worker heartbeat timestamp while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_ms: Option<u64>,
    /// Which dispatch attempt of the task this job is (1-based).
    #[serde(default)]
    pub attempt: u32,
}

impl Job {
    /// Deadline reference for stall detection: last heartbeat, else claim time.
    pub fn liveness_anchor_ms(&self) -> Option<u64> {
        self.last_heartbeat_ms.or(self.claimed_at_ms)
    }
}

/// Keep only the final `STDIO_TAIL_MAX` bytes of captured output,
/// respecting char boundaries.
pub fn tail_bounded(s: &str) -> String {
    if s.len() <= STDIO_TAIL_MAX {
        return s.to_string();
    }
    let mut start = s.len() - STDIO_TAIL_MAX;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
