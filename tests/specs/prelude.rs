// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Wraps the gateway router in a small in-process client and simulates
//! an honest worker: register, claim, fetch the pack raw, hash with the
//! claim nonce, complete.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use scc_core::Config;
use scc_gateway::{build_router, build_state, AppState};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

pub struct SpecGateway {
    dir: tempfile::TempDir,
    pub state: AppState,
}

impl SpecGateway {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("map")).unwrap();
        std::fs::write(
            dir.path().join("map/version.json"),
            br#"{"hash":"sha256:newhash"}"#,
        )
        .unwrap();
        let state = build_state(config, dir.path());
        Self { dir, state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn artifacts_dir(&self, task_id: &str) -> PathBuf {
        self.dir.path().join("artifacts").join(task_id)
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        use tower::ServiceExt;
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn fetch_raw(&self, link: &str) -> Vec<u8> {
        use tower::ServiceExt;
        let request = Request::builder()
            .method("GET")
            .uri(link)
            .body(Body::empty())
            .unwrap();
        let response = self.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "raw fetch of {link}");
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    /// Seed a ready atomic task editing (and pinned to) the given files.
    pub fn seed_atomic(&self, id: &str, files: &[&str]) {
        self.seed_atomic_with_pins(id, files, files);
    }

    pub fn seed_atomic_with_pins(&self, id: &str, files: &[&str], allowed_paths: &[&str]) {
        let task: scc_core::Task = serde_json::from_value(json!({
            "task_id": id,
            "kind": "atomic",
            "title": format!("task {id}"),
            "goal": "edit the pinned files",
            "role": "executor",
            "area": "core",
            "lane": "mainlane",
            "files": files,
            "pins": { "allowed_paths": allowed_paths },
            "allowedExecutors": ["noop"],
            "runner": "internal",
            "status": "ready",
        }))
        .unwrap();
        self.state.lifecycle.board().upsert(task).unwrap();
    }

    pub async fn register_worker(&self, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/executor/workers/register",
                Some(json!({ "name": name, "executors": ["noop"], "models": [] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn dispatch(&self, task_id: &str) -> Value {
        let (status, job) = self
            .request(
                "POST",
                &format!("/board/tasks/{task_id}/dispatch"),
                Some(json!({})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "dispatch of {task_id}: {job}");
        job
    }

    pub async fn claim(&self, worker_id: &str) -> Value {
        let (status, payload) = self
            .request(
                "GET",
                &format!("/executor/workers/{worker_id}/claim?executor=noop&waitMs=1000"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "claim by {worker_id}");
        payload
    }

    /// Fetch every pack file over the raw endpoint and hash it the way a
    /// compliant worker must: sha256(bytes) and sha256(nonce || bytes).
    pub async fn honest_hash_fields(&self, payload: &Value) -> Value {
        let nonce = payload["attestation"]["nonce"].as_str().unwrap();
        let bundle = payload["taskBundle"].as_object().unwrap();
        let mut raw = serde_json::Map::new();
        let mut bound = serde_json::Map::new();
        for (link_name, bare) in [
            ("fetch_manifest_raw", "manifest"),
            ("fetch_pins_raw", "pins"),
            ("fetch_preflight_raw", "preflight"),
            ("fetch_task_raw", "task"),
            ("fetch_replay_bundle_raw", "replay_bundle"),
        ] {
            let Some(link) = bundle.get(link_name).and_then(Value::as_str) else {
                continue;
            };
            let bytes = self.fetch_raw(link).await;
            raw.insert(bare.to_string(), json!(sha256_hex(&bytes)));
            bound.insert(bare.to_string(), json!(nonce_bound_hex(nonce, &bytes)));
        }
        let manifest_bytes = self
            .fetch_raw(bundle["fetch_manifest_raw"].as_str().unwrap())
            .await;
        json!({
            "task_bundle_files_sha256": raw,
            "task_bundle_files_attest_sha256": bound,
            "context_pack_v1_json_sha256": sha256_hex(&manifest_bytes),
            "context_pack_v1_json_attest_sha256": nonce_bound_hex(nonce, &manifest_bytes),
        })
    }

    /// A DONE submit covering the given changed files with passing tests.
    pub fn done_submit(&self, changed_files: &[&str]) -> Value {
        json!({
            "schema_version": "scc.submit.v1",
            "status": "DONE",
            "changed_files": changed_files,
            "tests": { "commands": ["true"], "passed": true, "summary": "ok" },
            "artifacts": {},
            "exit_code": 0,
            "needs_input": [],
        })
    }

    /// Write the worker-side replay bundle artifact for a task.
    pub fn write_replay_bundle(&self, task_id: &str) {
        let task = self
            .state
            .lifecycle
            .board()
            .get(&scc_core::TaskId::new(task_id))
            .unwrap();
        let bundle = scc_core::ReplayBundle::minimal(&task, "noop", None);
        let dir = self.artifacts_dir(task_id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("replay_bundle.json"),
            serde_json::to_vec(&bundle).unwrap(),
        )
        .unwrap();
    }

    pub async fn complete(
        &self,
        job_id: &str,
        worker_id: &str,
        payload: &Value,
        submit: Value,
    ) -> (StatusCode, Value) {
        let mut body = json!({
            "workerId": worker_id,
            "exit_code": 0,
            "stdout": "done",
            "attestation_nonce": payload["attestation"]["nonce"],
            "submit": submit,
        });
        let hashes = self.honest_hash_fields(payload).await;
        merge(&mut body, hashes);
        self.request(
            "POST",
            &format!("/executor/jobs/{job_id}/complete"),
            Some(body),
        )
        .await
    }

    pub async fn task_status(&self, task_id: &str) -> String {
        let (_, board) = self.request("GET", "/board", None).await;
        board["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["task_id"] == task_id)
            .map(|t| t["status"].as_str().unwrap().to_string())
            .unwrap()
    }

    pub async fn job_status(&self, job_id: &str) -> String {
        let (status, job) = self
            .request("GET", &format!("/executor/jobs/{job_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        job["status"].as_str().unwrap().to_string()
    }

    pub async fn event_types(&self) -> Vec<String> {
        let (_, body) = self.request("GET", "/events?limit=100", None).await;
        body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["event_type"].as_str().unwrap().to_string())
            .collect()
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn nonce_bound_hex(nonce: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Merge the fields of `extra` into the object `target`.
pub fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        for (k, v) in extra {
            target.insert(k, v);
        }
    }
}
