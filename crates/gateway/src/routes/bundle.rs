// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pack file serving: raw bytes (the hashable form) or a JSON wrapper.

use crate::bootstrap::AppState;
use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scc_core::PackId;
use scc_engine::EngineError;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct BundleQuery {
    #[serde(default)]
    pub format: Option<String>,
}

pub async fn fetch(
    State(state): State<AppState>,
    Path((pack_id, file)): Path<(String, String)>,
    Query(query): Query<BundleQuery>,
) -> Result<Response, ApiError> {
    let pack_id = PackId::new(pack_id);
    let bytes = state.lifecycle.packs().file_bytes(&pack_id, &file)?;
    match query.format.as_deref() {
        Some("raw") => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response()),
        None | Some("json") => {
            let content: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
            Ok(Json(serde_json::json!({
                "packId": pack_id,
                "file": file,
                "content": content,
            }))
            .into_response())
        }
        Some(other) => Err(EngineError::InvalidRequest(format!(
            "unknown bundle format: {other}"
        ))
        .into()),
    }
}
