// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pins violation: a changed file outside the allowed scope blocks.

use crate::prelude::SpecGateway;
use axum::http::StatusCode;

#[tokio::test]
async fn out_of_scope_change_blocks_task() {
    let gw = SpecGateway::new();
    gw.seed_atomic_with_pins("T1", &["src/a.js"], &["src/a.js"]);
    let worker_id = gw.register_worker("W1").await;
    let job = gw.dispatch("T1").await;
    let job_id = job["job_id"].as_str().unwrap().to_string();
    let payload = gw.claim(&worker_id).await;
    gw.write_replay_bundle("T1");

    let (status, verdict) = gw
        .complete(
            &job_id,
            &worker_id,
            &payload,
            gw.done_submit(&["src/a.js", "src/secret.js"]),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["verdict"], "BLOCK", "{verdict}");
    assert_eq!(verdict["reasons"][0], "pins_scope");
    assert_eq!(gw.task_status("T1").await, "failed");

    let (_, events) = gw.request("GET", "/events?limit=100", None).await;
    assert!(events["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["event_type"] == "PINS_INSUFFICIENT"));
}
