// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scc-storage: durable state for the coordination gateway.
//!
//! Everything on disk goes through [`JsonStore`]: per-path serialized
//! updaters over atomically-replaced JSON documents. The board and job
//! stores are thin domain layers on top; the event log is a separate
//! append-only JSONL file.

pub mod board;
pub mod events;
pub mod jobs;
pub mod store;

pub use board::{BoardError, BoardStore};
pub use events::EventLog;
pub use jobs::{ClaimRequest, JobStore, JobStoreError};
pub use store::{JsonStore, StoreError};
