// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pins built against an older map: valid completion, RETRY verdict.

use crate::prelude::SpecGateway;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn stale_map_returns_task_to_ready() {
    let gw = SpecGateway::new();
    gw.seed_atomic("T1", &["a.md"]);

    // The pins builder ran against an older map version
    let pins_dir = gw.artifacts_dir("T1").join("pins");
    std::fs::create_dir_all(&pins_dir).unwrap();
    std::fs::write(
        pins_dir.join("pins.json"),
        json!({
            "schema_version": "scc.pins_request.v1",
            "map_ref": { "hash": "sha256:oldhash" },
            "pins": { "allowed_paths": ["a.md"] },
        })
        .to_string(),
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
    assert_eq!(verdict["verdict"], "RETRY", "{verdict}");
    assert_eq!(verdict["reasons"][0], "stale_map");

    assert_eq!(gw.task_status("T1").await, "ready");
    let (_, board) = gw.request("GET", "/board", None).await;
    let task = board["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["task_id"] == "T1")
        .unwrap();
    assert_eq!(task["attempts"], 1);
}
