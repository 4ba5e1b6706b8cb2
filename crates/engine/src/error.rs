// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use crate::pack::PackError;
use scc_storage::{BoardError, JobStoreError, StoreError};
use thiserror::Error;

/// Errors crossing the engine boundary. Business rejections (stale map,
/// pins violations, failed tests) are verdicts, never errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Jobs(#[from] JobStoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error("worker not found: {0}")]
    WorkerNotFound(String),
    #[error("worker {worker} does not advertise executor {executor}")]
    ExecutorUnsupported { worker: String, executor: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    /// True when the failure is the caller's (4xx) rather than
    /// infrastructure (5xx).
    pub fn is_client_error(&self) -> bool {
        match self {
            EngineError::Board(BoardError::Store(_)) => false,
            EngineError::Board(_) => true,
            EngineError::Jobs(JobStoreError::Store(_)) => false,
            EngineError::Jobs(_) => true,
            EngineError::Store(_) => false,
            EngineError::Pack(PackError::NotFound(_) | PackError::UnknownFile(_)) => true,
            EngineError::Pack(_) => false,
            EngineError::WorkerNotFound(_) => true,
            EngineError::ExecutorUnsupported { .. } => true,
            EngineError::InvalidRequest(_) => true,
        }
    }
}
