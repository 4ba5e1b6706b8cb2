// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error → HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scc_engine::{EngineError, PackError};
use scc_storage::{BoardError, JobStoreError};
use tracing::error;

/// Wrapper carrying an engine error across the handler boundary.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl From<BoardError> for ApiError {
    fn from(e: BoardError) -> Self {
        Self(EngineError::Board(e))
    }
}

impl From<JobStoreError> for ApiError {
    fn from(e: JobStoreError) -> Self {
        Self(EngineError::Jobs(e))
    }
}

impl From<PackError> for ApiError {
    fn from(e: PackError) -> Self {
        Self(EngineError::Pack(e))
    }
}

fn status_for(e: &EngineError) -> StatusCode {
    if !e.is_client_error() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match e {
        EngineError::Board(BoardError::NotFound(_))
        | EngineError::Jobs(JobStoreError::NotFound(_))
        | EngineError::Pack(PackError::NotFound(_))
        | EngineError::WorkerNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Board(BoardError::IllegalTransition { .. })
        | EngineError::Jobs(JobStoreError::TaskBusy(_))
        | EngineError::Jobs(JobStoreError::IllegalState { .. })
        | EngineError::Jobs(JobStoreError::WorkerMismatch { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
