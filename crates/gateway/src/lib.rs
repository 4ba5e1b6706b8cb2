// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scc-gateway: the HTTP surface of the coordination engine.
//!
//! Handlers are thin; all business logic lives in `scc-engine` and
//! `scc-storage`. The binary (`sccd`) owns process-wide startup: config,
//! logging, the instance lock, and the reaper timer.

pub mod bootstrap;
pub mod env;
pub mod error;
pub mod routes;

pub use bootstrap::{build_state, AppState, GatewayLifecycle};
pub use error::ApiError;
pub use routes::build_router;
