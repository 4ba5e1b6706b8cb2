// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

pub(crate) fn queued_job(id: &str, task: &str) -> Job {
    Job {
        job_id: JobId::new(id),
        task_id: TaskId::new(task),
        executor: "noop".to_string(),
        model: None,
        prompt: "do the thing".to_string(),
        status: JobStatus::Queued,
        runner: Runner::Internal,
        priority: 500,
        timeout_ms: 60_000,
        created_at_ms: 1_000_000,
        claimed_at_ms: None,
        completed_at_ms: None,
        worker_id: None,
        exit_code: None,
        stdout: None,
        stderr: None,
        attestation: None,
        context_pack_v1_id: None,
        result_hashes: None,
        submit: None,
        cancel_reason: None,
        last_heartbeat_ms: None,
        attempt: 1,
    }
}

#[test]
fn terminal_statuses() {
    assert!(!JobStatus::Queued.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
    assert!(JobStatus::Succeeded.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
    assert!(JobStatus::Cancelled.is_terminal());
}

#[test]
fn liveness_anchor_prefers_heartbeat() {
    let mut job = queued_job("j1", "t1");
    assert_eq!(job.liveness_anchor_ms(), None);

    job.claimed_at_ms = Some(10);
    assert_eq!(job.liveness_anchor_ms(), Some(10));

    job.last_heartbeat_ms = Some(20);
    assert_eq!(job.liveness_anchor_ms(), Some(20));
}

#[test]
fn tail_bounding_keeps_last_bytes() {
    let big = "x".repeat(STDIO_TAIL_MAX + 100);
    let tail = tail_bounded(&big);
    assert_eq!(tail.len(), STDIO_TAIL_MAX);

    assert_eq!(tail_bounded("short"), "short");
}

#[test]
fn tail_bounding_respects_char_boundaries() {
    let big = "é".repeat(STDIO_TAIL_MAX);
    let tail = tail_bounded(&big);
    assert!(tail.len() <= STDIO_TAIL_MAX);
    assert!(tail.chars().all(|c| c == 'é'));
}

#[test]
fn job_wire_fields_use_spec_names() {
    let mut job = queued_job("j1", "t1");
    job.claimed_at_ms = Some(5);
    job.worker_id = Some(WorkerId::new("w1"));
    let json = serde_json::to_value(&job).unwrap();
    assert_eq!(json["timeoutMs"], 60_000);
    assert_eq!(json["createdAt"], 1_000_000);
    assert_eq!(json["claimedAt"], 5);
    assert_eq!(json["workerId"], "w1");
    assert_eq!(json["status"], "queued");
    // absent optionals are omitted, not null
    assert!(json.get("exitCode").is_none());
}
