// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Board endpoints: snapshot, split, dispatch.

use crate::bootstrap::AppState;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::Json;
use scc_core::{Job, Task, TaskId};
use scc_engine::DispatchOverrides;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct BoardSnapshot {
    pub tasks: Vec<Task>,
    pub counts: BTreeMap<String, usize>,
}

pub async fn snapshot(State(state): State<AppState>) -> Json<BoardSnapshot> {
    let board = state.lifecycle.board();
    Json(BoardSnapshot {
        tasks: board.list(None),
        counts: board.counts(),
    })
}

#[derive(Deserialize)]
pub struct SplitRequest {
    pub children: Vec<Task>,
}

/// Split a parent task into atomic children; returns the updated parent.
pub async fn split(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SplitRequest>,
) -> Result<Json<Task>, ApiError> {
    let parent = state
        .lifecycle
        .board()
        .split(&TaskId::new(id), request.children)?;
    Ok(Json(parent))
}

/// Enqueue a job for an atomic task. The body may override executor,
/// model, prompt, or priority; an empty body takes every default.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    overrides: Option<Json<DispatchOverrides>>,
) -> Result<Json<Job>, ApiError> {
    let overrides = overrides.map(|Json(o)| o).unwrap_or_default();
    let job = state.lifecycle.dispatch(&TaskId::new(id), overrides)?;
    Ok(Json(job))
}
