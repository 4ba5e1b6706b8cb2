// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST surface of the gateway (localhost-only).
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | GET  | `/health` | Liveness probe |
//! | GET  | `/board` | Task snapshot + counts |
//! | POST | `/board/tasks/:id/split` | Split a parent into atomics |
//! | POST | `/board/tasks/:id/dispatch` | Enqueue a job for an atomic |
//! | GET  | `/pools` | Jobs-by-status and executor capacity |
//! | POST | `/executor/workers/register` | Register a worker |
//! | POST | `/executor/workers/:id/heartbeat` | Worker liveness |
//! | GET  | `/executor/workers/:id/claim` | Long-poll claim (204 on none) |
//! | GET  | `/executor/jobs/:id` | Job snapshot |
//! | POST | `/executor/jobs/:id/complete` | Submit a completion |
//! | POST | `/executor/jobs/:id/cancel` | Cancel a queued/running job |
//! | GET  | `/bundle/:packId/:file` | Pack file (raw or JSON-wrapped) |
//! | GET  | `/events` | Recent event rows |

mod board;
mod bundle;
mod events;
mod jobs;
mod workers;

use crate::bootstrap::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/board", get(board::snapshot))
        .route("/board/tasks/:id/split", post(board::split))
        .route("/board/tasks/:id/dispatch", post(board::dispatch))
        .route("/pools", get(jobs::pools))
        .route("/executor/workers/register", post(workers::register))
        .route("/executor/workers/:id/heartbeat", post(workers::heartbeat))
        .route("/executor/workers/:id/claim", get(workers::claim))
        .route("/executor/jobs/:id", get(jobs::get_job))
        .route("/executor/jobs/:id/complete", post(jobs::complete))
        .route("/executor/jobs/:id/cancel", post(jobs::cancel))
        .route("/bundle/:pack_id/:file", get(bundle::fetch))
        .route("/events", get(events::tail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
