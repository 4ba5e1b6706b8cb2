// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Happy path: one atomic task, one honest worker, PASS verdict.

use crate::prelude::SpecGateway;
use axum::http::StatusCode;

#[tokio::test]
async fn atomic_task_flows_to_done() {
    let gw = SpecGateway::new();
    gw.seed_atomic("T1", &["a.md"]);
    let worker_id = gw.register_worker("W1").await;

    let job = gw.dispatch("T1").await;
    let job_id = job["job_id"].as_str().unwrap().to_string();
    assert_eq!(gw.task_status("T1").await, "dispatched");

    let payload = gw.claim(&worker_id).await;
    assert_eq!(payload["jobId"], job_id.as_str());
    assert_eq!(gw.task_status("T1").await, "in_progress");
    assert_eq!(gw.job_status(&job_id).await, "running");

    // The worker executes, leaves its replay bundle, and completes
    gw.write_replay_bundle("T1");
    let (status, verdict) = gw
        .complete(&job_id, &worker_id, &payload, gw.done_submit(&["a.md"]))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["verdict"], "PASS", "{verdict}");
    assert_eq!(gw.job_status(&job_id).await, "succeeded");
    assert_eq!(gw.task_status("T1").await, "done");

    let events = gw.event_types().await;
    assert_eq!(
        events.iter().filter(|e| *e == "SUCCESS").count(),
        1,
        "{events:?}"
    );
    assert!(events.contains(&"JOB_CLAIMED".to_string()));
}
