// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scc-engine: the coordination core behind the HTTP gateway.
//!
//! Worker registry, context-pack service, long-poll claim scheduling,
//! the lifecycle controller that drives job/task transitions, and the
//! gate pipeline that turns submissions into verdicts.

pub mod attest;
pub mod backfill;
pub mod error;
pub mod gates;
pub mod lifecycle;
pub mod pack;
pub mod registry;
pub mod wake;

pub use error::EngineError;
pub use gates::{GateContext, GatePipeline};
pub use lifecycle::{ClaimPayload, DispatchOverrides, HeartbeatAck, Lifecycle, TaskBundleLinks};
pub use pack::{PackError, PackManifest, PackService, REQUIRED_PACK_FILES};
pub use registry::WorkerRegistry;
pub use wake::WakeBroker;
