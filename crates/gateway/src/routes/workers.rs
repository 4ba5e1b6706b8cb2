// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker endpoints: register, heartbeat, long-poll claim.

use crate::bootstrap::AppState;
use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scc_core::{JobId, WorkerId};
use scc_engine::HeartbeatAck;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub executors: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Json<serde_json::Value> {
    let worker = state.lifecycle.registry().register(
        &request.name,
        request.executors,
        request.models,
        state.lifecycle.now_ms(),
    );
    Json(serde_json::json!({ "id": worker.worker_id }))
}

#[derive(Deserialize)]
pub struct HeartbeatRequest {
    #[serde(default, rename = "runningJobId")]
    pub running_job_id: Option<JobId>,
}

pub async fn heartbeat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<HeartbeatRequest>>,
) -> Result<Json<HeartbeatAck>, ApiError> {
    let running_job_id = request.and_then(|Json(r)| r.running_job_id);
    let ack = state
        .lifecycle
        .heartbeat(&WorkerId::new(id), running_job_id)?;
    Ok(Json(ack))
}

#[derive(Deserialize)]
pub struct ClaimQuery {
    pub executor: String,
    #[serde(default = "default_wait_ms", rename = "waitMs")]
    pub wait_ms: u64,
}

fn default_wait_ms() -> u64 {
    25_000
}

/// Long-poll claim: the job payload on a win, 204 when the wait window
/// elapses with nothing eligible.
pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ClaimQuery>,
) -> Result<Response, ApiError> {
    let claimed = state
        .lifecycle
        .claim(&WorkerId::new(id), &query.executor, query.wait_ms)
        .await?;
    Ok(match claimed {
        Some(payload) => Json(payload).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
