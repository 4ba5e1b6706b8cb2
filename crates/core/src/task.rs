// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Board task model and status machine.

use crate::id::TaskId;
use crate::lane::Lane;
use crate::pins::{validate_repo_relative, PinSpec, RepoPathError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parent tasks await splitting; atomic tasks are dispatchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Parent,
    Atomic,
}

/// Where the job for a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runner {
    #[default]
    Internal,
    External,
}

/// Status of a board task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    NeedsSplit,
    Ready,
    Dispatched,
    InProgress,
    Done,
    NeedInput,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Cancelled)
    }

    /// Allowed transition arrows. `Failed` is retryable (back to `Ready`),
    /// so it is not terminal here; `Done` and `Cancelled` are.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        if next == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Backlog, Ready)
                | (Backlog, NeedsSplit)
                | (NeedsSplit, Ready)
                | (Ready, Dispatched)
                | (Dispatched, InProgress)
                | (InProgress, Done)
                | (InProgress, Failed)
                | (InProgress, NeedInput)
                | (NeedInput, Ready)
                | (Failed, Ready)
                | (Dispatched, Ready) // dispatch cancelled before any claim
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::NeedsSplit => "needs_split",
            TaskStatus::Ready => "ready",
            TaskStatus::Dispatched => "dispatched",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::NeedInput => "need_input",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Parent link for an atomic task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TaskId>,
}

/// A board task (parent or atomic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub kind: TaskKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub lane: Lane,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_class_id: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub pins: PinSpec,
    #[serde(default, rename = "allowedTests")]
    pub allowed_tests: Vec<String>,
    /// Empty means "inherit the mission-wide default executor list".
    #[serde(default, rename = "allowedExecutors")]
    pub allowed_executors: Vec<String>,
    #[serde(default, rename = "allowedModels")]
    pub allowed_models: Vec<String>,
    #[serde(default)]
    pub runner: Runner,
    #[serde(default)]
    pub pointers: Pointers,
    pub status: TaskStatus,
    /// Explicit priority override; replaces the lane default when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Dispatch attempts consumed so far (bumped on RETRY verdicts).
    #[serde(default)]
    pub attempts: u32,
}

impl Task {
    /// Job priority for this task: explicit override wins, else the
    /// per-call override, else the lane default.
    pub fn job_priority(&self, override_priority: Option<i64>) -> i64 {
        override_priority
            .or(self.priority)
            .unwrap_or_else(|| self.lane.default_priority())
    }

    /// Executors this task accepts, with the mission default applied
    /// when the task pins none.
    pub fn effective_executors<'a>(&'a self, mission_default: &'a [String]) -> &'a [String] {
        if self.allowed_executors.is_empty() {
            mission_default
        } else {
            &self.allowed_executors
        }
    }

    /// Validate every file and pin path as repo-relative.
    pub fn validate_paths(&self) -> Result<(), RepoPathError> {
        for f in &self.files {
            validate_repo_relative(f)?;
        }
        self.pins.validate()
    }
}

/// Derive a parent's status from its children: done iff all done; failed
/// iff any failed while none awaits input; otherwise in progress.
pub fn derive_parent_status(children: &[TaskStatus]) -> TaskStatus {
    if children.is_empty() {
        return TaskStatus::NeedsSplit;
    }
    if children.iter().all(|s| *s == TaskStatus::Done) {
        return TaskStatus::Done;
    }
    let any_failed = children.iter().any(|s| *s == TaskStatus::Failed);
    let any_need_input = children.iter().any(|s| *s == TaskStatus::NeedInput);
    if any_failed && !any_need_input {
        return TaskStatus::Failed;
    }
    TaskStatus::InProgress
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
