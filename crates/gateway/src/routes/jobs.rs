// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job endpoints: snapshot, completion, cancellation, pool counts.

use crate::bootstrap::AppState;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::Json;
use scc_core::job::Completion;
use scc_core::{CompletionHashes, Job, JobId, Submit, Verdict, WorkerId};
use scc_engine::lifecycle::PoolsSnapshot;
use scc_engine::EngineError;
use serde::Deserialize;

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let job = state.lifecycle.jobs().get(&JobId::new(id))?;
    Ok(Json(job))
}

/// Completion as posted over the wire. The submit document arrives as
/// raw JSON so permissive mode can drop unknown fields instead of
/// rejecting them.
#[derive(Deserialize)]
pub struct CompleteRequest {
    #[serde(rename = "workerId")]
    pub worker_id: WorkerId,
    pub exit_code: i32,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    pub attestation_nonce: String,
    pub submit: serde_json::Value,
    #[serde(flatten)]
    pub hashes: CompletionHashes,
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<Verdict>, ApiError> {
    let strict = state.lifecycle.config().strict();
    let submit = Submit::parse(request.submit, strict)
        .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
    let completion = Completion {
        worker_id: request.worker_id,
        exit_code: request.exit_code,
        stdout: request.stdout,
        stderr: request.stderr,
        attestation_nonce: request.attestation_nonce,
        submit,
        hashes: request.hashes,
    };
    let verdict = state.lifecycle.complete(&JobId::new(id), &completion)?;
    Ok(Json(verdict))
}

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(default = "default_cancel_reason")]
    pub reason: String,
}

fn default_cancel_reason() -> String {
    "client_cancel".to_string()
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<Job>, ApiError> {
    let reason = request
        .map(|Json(r)| r.reason)
        .unwrap_or_else(default_cancel_reason);
    let job = state.lifecycle.cancel(&JobId::new(id), &reason)?;
    Ok(Json(job))
}

pub async fn pools(State(state): State<AppState>) -> Json<PoolsSnapshot> {
    Json(state.lifecycle.pools())
}
