// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attestation replay: correct raw hashes, nonce omitted from the
//! bound hash. The completion is rejected as a whole.

use crate::prelude::{merge, SpecGateway};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn nonce_free_attest_hash_blocks_and_fails_task() {
    let gw = SpecGateway::new();
    gw.seed_atomic("T1", &["a.md"]);
    let worker_id = gw.register_worker("W1").await;
    let job = gw.dispatch("T1").await;
    let job_id = job["job_id"].as_str().unwrap().to_string();
    let payload = gw.claim(&worker_id).await;
    gw.write_replay_bundle("T1");

    // Replay attack: every raw hash is right, but the "nonce-bound"
    // manifest hash is just sha256(bytes) again.
    let mut hashes = gw.honest_hash_fields(&payload).await;
    hashes["context_pack_v1_json_attest_sha256"] =
        hashes["context_pack_v1_json_sha256"].clone();

    let mut body = json!({
        "workerId": worker_id,
        "exit_code": 0,
        "attestation_nonce": payload["attestation"]["nonce"],
        "submit": gw.done_submit(&["a.md"]),
    });
    merge(&mut body, hashes);
    let (status, verdict) = gw
        .request(
            "POST",
            &format!("/executor/jobs/{job_id}/complete"),
            Some(body),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["verdict"], "BLOCK");
    assert_eq!(verdict["reasons"][0], "attestation_mismatch");

    assert_eq!(gw.job_status(&job_id).await, "failed");
    assert_eq!(gw.task_status("T1").await, "failed");

    let (_, events) = gw.request("GET", "/events?limit=100", None).await;
    assert!(events["events"].as_array().unwrap().iter().any(|e| {
        e["event_type"] == "EXECUTOR_ERROR" && e["reason"] == "attestation_mismatch"
    }));
}
