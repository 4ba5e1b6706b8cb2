// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain event rows (`scc.event.v1`) appended to the global event log.

use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EVENT_SCHEMA_VERSION: &str = "scc.event.v1";

/// Kind of domain transition an event row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "JOB_CLAIMED")]
    JobClaimed,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "CI_FAILED")]
    CiFailed,
    #[serde(rename = "EXECUTOR_ERROR")]
    ExecutorError,
    #[serde(rename = "PINS_INSUFFICIENT")]
    PinsInsufficient,
    #[serde(rename = "PREFLIGHT_FAILED")]
    PreflightFailed,
    #[serde(rename = "JOB_TIMEOUT")]
    JobTimeout,
    #[serde(rename = "WORKER_DEAD")]
    WorkerDead,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::JobClaimed => "JOB_CLAIMED",
            EventType::Success => "SUCCESS",
            EventType::CiFailed => "CI_FAILED",
            EventType::ExecutorError => "EXECUTOR_ERROR",
            EventType::PinsInsufficient => "PINS_INSUFFICIENT",
            EventType::PreflightFailed => "PREFLIGHT_FAILED",
            EventType::JobTimeout => "JOB_TIMEOUT",
            EventType::WorkerDead => "WORKER_DEAD",
        };
        write!(f, "{s}")
    }
}

/// One row of the append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub schema_version: String,
    /// Epoch ms of the transition.
    pub t: u64,
    pub event_type: EventType,
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub executor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl DomainEvent {
    pub fn new(event_type: EventType, task_id: TaskId, t: u64) -> Self {
        Self {
            schema_version: EVENT_SCHEMA_VERSION.to_string(),
            t,
            event_type,
            task_id,
            parent_id: None,
            role: String::new(),
            area: String::new(),
            executor: String::new(),
            model: None,
            reason: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_executor(mut self, executor: impl Into<String>) -> Self {
        self.executor = executor.into();
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
