// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log tail.

use crate::bootstrap::AppState;
use axum::extract::{Query, State};
use axum::Json;
use scc_core::DomainEvent;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<DomainEvent>,
}

pub async fn tail(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    Json(EventsResponse {
        events: state.lifecycle.events().tail(query.limit),
    })
}
