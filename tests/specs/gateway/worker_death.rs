// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker death: a silent worker is reaped, the task requeues, and a
//! fresh worker carries it to done. Time is driven by a fake clock, so
//! the 180 s stall window runs as a 2 s test value.

use crate::prelude::{nonce_bound_hex, sha256_hex};
use scc_core::job::Completion;
use scc_core::submit::{Submit, SubmitStatus, SubmitTests};
use scc_core::{
    Clock, CompletionHashes, Config, FakeClock, ReplayBundle, SequentialIdGen, Task, TaskId,
};
use scc_engine::lifecycle::LifecycleParams;
use scc_engine::{
    ClaimPayload, DispatchOverrides, Lifecycle, PackService, WakeBroker, WorkerRegistry,
};
use scc_storage::{BoardStore, EventLog, JobStore, JsonStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

type SpecLifecycle = Lifecycle<FakeClock, SequentialIdGen>;

fn engine(dir: &tempfile::TempDir, clock: FakeClock) -> SpecLifecycle {
    let mut config = Config::default();
    config.stale_window_ms = 2_000;

    let store = Arc::new(JsonStore::new());
    let artifacts_dir = dir.path().join("artifacts");
    std::fs::create_dir_all(dir.path().join("map")).unwrap();
    std::fs::write(
        dir.path().join("map/version.json"),
        br#"{"hash":"sha256:newhash"}"#,
    )
    .unwrap();

    Lifecycle::new(LifecycleParams {
        board: Arc::new(BoardStore::new(Arc::clone(&store), &dir.path().join("state"))),
        jobs: Arc::new(JobStore::new(Arc::clone(&store), &dir.path().join("state"))),
        registry: Arc::new(WorkerRegistry::new()),
        packs: Arc::new(PackService::new(artifacts_dir.join("packs"))),
        events: Arc::new(EventLog::new(artifacts_dir.join("events.jsonl"))),
        broker: Arc::new(WakeBroker::new()),
        store,
        config,
        clock,
        ids: SequentialIdGen::new("spec"),
        state_dir: dir.path().join("state"),
        artifacts_dir,
        map_dir: dir.path().join("map"),
    })
}

fn seed_task(lifecycle: &SpecLifecycle, id: &str) {
    let task: Task = serde_json::from_value(json!({
        "task_id": id,
        "kind": "atomic",
        "title": "task",
        "goal": "edit a.md",
        "role": "executor",
        "area": "core",
        "lane": "mainlane",
        "files": ["a.md"],
        "pins": { "allowed_paths": ["a.md"] },
        "allowedExecutors": ["noop"],
        "runner": "internal",
        "status": "ready",
    }))
    .unwrap();
    lifecycle.board().upsert(task).unwrap();
}

fn honest_completion(
    lifecycle: &SpecLifecycle,
    payload: &ClaimPayload,
    worker_id: &scc_core::WorkerId,
) -> Completion {
    let nonce = payload.attestation.nonce.clone();
    let mut hashes = CompletionHashes::default();
    for bare in ["manifest", "pins", "preflight", "task", "replay_bundle"] {
        if !lifecycle.packs().has_file(&payload.context_pack_v1_id, bare) {
            continue;
        }
        let bytes = lifecycle
            .packs()
            .file_bytes(&payload.context_pack_v1_id, &format!("{bare}.json"))
            .unwrap();
        hashes
            .task_bundle_files_sha256
            .insert(bare.to_string(), sha256_hex(&bytes));
        hashes
            .task_bundle_files_attest_sha256
            .insert(bare.to_string(), nonce_bound_hex(&nonce, &bytes));
    }
    let manifest = lifecycle
        .packs()
        .file_bytes(&payload.context_pack_v1_id, "manifest.json")
        .unwrap();
    hashes.context_pack_v1_json_sha256 = Some(sha256_hex(&manifest));
    hashes.context_pack_v1_json_attest_sha256 = Some(nonce_bound_hex(&nonce, &manifest));

    let mut submit = Submit::new(SubmitStatus::Done);
    submit.changed_files = vec!["a.md".to_string()];
    submit.tests = SubmitTests {
        commands: vec!["true".to_string()],
        passed: true,
        summary: "ok".to_string(),
    };
    Completion {
        worker_id: worker_id.clone(),
        exit_code: 0,
        stdout: None,
        stderr: None,
        attestation_nonce: nonce,
        submit,
        hashes,
    }
}

#[tokio::test(start_paused = true)]
async fn dead_worker_is_reaped_and_task_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let lifecycle = engine(&dir, clock.clone());
    seed_task(&lifecycle, "T1");

    // W1 claims, heartbeats once, then goes silent
    lifecycle
        .dispatch(&TaskId::new("T1"), DispatchOverrides::default())
        .unwrap();
    let w1 = lifecycle
        .registry()
        .register("W1", vec!["noop".to_string()], vec![], clock.epoch_ms());
    let payload = lifecycle
        .claim(&w1.worker_id, "noop", 1_000)
        .await
        .unwrap()
        .unwrap();
    clock.advance(Duration::from_millis(500));
    lifecycle
        .heartbeat(&w1.worker_id, Some(payload.job_id.clone()))
        .unwrap();

    // Stall window (2 s test value) lapses; one reaper tick cancels
    clock.advance(Duration::from_millis(2_500));
    assert_eq!(lifecycle.reaper_tick().unwrap(), 1);

    let job = lifecycle.jobs().get(&payload.job_id).unwrap();
    assert_eq!(job.status, scc_core::JobStatus::Cancelled);
    assert_eq!(job.cancel_reason.as_deref(), Some("worker_dead"));
    let task = lifecycle.board().get(&TaskId::new("T1")).unwrap();
    assert_eq!(task.status, scc_core::TaskStatus::Ready);
    assert_eq!(task.attempts, 1);

    // A fresh dispatch and a fresh worker finish the task
    lifecycle
        .dispatch(&TaskId::new("T1"), DispatchOverrides::default())
        .unwrap();
    let w2 = lifecycle
        .registry()
        .register("W2", vec!["noop".to_string()], vec![], clock.epoch_ms());
    let payload = lifecycle
        .claim(&w2.worker_id, "noop", 1_000)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(payload.job_id, job.job_id, "retry never resurrects a job");

    let task = lifecycle.board().get(&TaskId::new("T1")).unwrap();
    let artifacts = dir.path().join("artifacts").join("T1");
    std::fs::create_dir_all(&artifacts).unwrap();
    std::fs::write(
        artifacts.join("replay_bundle.json"),
        serde_json::to_vec(&ReplayBundle::minimal(&task, "noop", None)).unwrap(),
    )
    .unwrap();

    let completion = honest_completion(&lifecycle, &payload, &w2.worker_id);
    let verdict = lifecycle.complete(&payload.job_id, &completion).unwrap();
    assert_eq!(verdict.verdict, scc_core::VerdictKind::Pass, "{:?}", verdict.reasons);
    assert_eq!(
        lifecycle.board().get(&TaskId::new("T1")).unwrap().status,
        scc_core::TaskStatus::Done
    );
}
