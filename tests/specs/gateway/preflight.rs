// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight failure: the task parks in need_input with the missing list.

use crate::prelude::SpecGateway;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn failed_preflight_parks_task_in_need_input() {
    let gw = SpecGateway::new();
    gw.seed_atomic("T1", &["a.md"]);

    // The preflight validator found a required file missing
    let dir = gw.artifacts_dir("T1");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("preflight.json"),
        json!({ "pass": false, "missing": { "files": ["README.md"] } }).to_string(),
    )
    .unwrap();

    let worker_id = gw.register_worker("W1").await;
    let job = gw.dispatch("T1").await;
    let job_id = job["job_id"].as_str().unwrap().to_string();
    let payload = gw.claim(&worker_id).await;
    gw.write_replay_bundle("T1");

    let (status, verdict) = gw
        .complete(&job_id, &worker_id, &payload, gw.done_submit(&["a.md"]))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["verdict"], "NEED_INPUT", "{verdict}");
    assert_eq!(verdict["reasons"][0], "preflight_failed");
    assert_eq!(verdict["needs_input"][0], "README.md");
    assert_eq!(gw.task_status("T1").await, "need_input");

    let (_, events) = gw.request("GET", "/events?limit=100", None).await;
    assert!(events["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["event_type"] == "PREFLIGHT_FAILED"));
}
