// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Board: the durable source of truth for tasks.
//!
//! All mutation goes through `update_serial` on `state/board.json`, so
//! task transitions are totally ordered and parent derivation happens in
//! the same critical section as the child change.

use crate::store::{JsonStore, StoreError};
use scc_core::pins::RepoPathError;
use scc_core::task::{derive_parent_status, Task, TaskKind, TaskStatus};
use scc_core::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Board rejections. Everything except `Store` maps to a 4xx.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("illegal transition for {id}: {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
    #[error("parent task cannot be transitioned directly: {0}")]
    ParentTransition(String),
    #[error("task is not a parent: {0}")]
    NotParent(String),
    #[error("task is not atomic: {0}")]
    NotAtomic(String),
    #[error(transparent)]
    Path(#[from] RepoPathError),
    #[error(transparent)]
    Lane(#[from] scc_core::lane::UnknownLane),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// On-disk shape of `state/board.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardDoc {
    tasks: BTreeMap<String, Task>,
}

/// Persistent set of tasks (parents + atomics).
pub struct BoardStore {
    store: Arc<JsonStore>,
    path: PathBuf,
}

impl BoardStore {
    pub fn new(store: Arc<JsonStore>, state_dir: &std::path::Path) -> Self {
        Self {
            store,
            path: state_dir.join("board.json"),
        }
    }

    /// Snapshot of all tasks, optionally filtered by status.
    pub fn list(&self, status: Option<TaskStatus>) -> Vec<Task> {
        let doc: BoardDoc = self.store.read(&self.path, BoardDoc::default);
        doc.tasks
            .into_values()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect()
    }

    /// Task counts by status, for the board snapshot endpoint.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let doc: BoardDoc = self.store.read(&self.path, BoardDoc::default);
        let mut counts = BTreeMap::new();
        for task in doc.tasks.values() {
            *counts.entry(task.status.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn get(&self, id: &TaskId) -> Result<Task, BoardError> {
        let doc: BoardDoc = self.store.read(&self.path, BoardDoc::default);
        doc.tasks
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Insert or replace a task. Paths must be repo-relative; the lane
    /// arrived typed, so unknown lanes were rejected at parse.
    pub fn upsert(&self, task: Task) -> Result<Task, BoardError> {
        task.validate_paths()?;
        let stored = self
            .store
            .update_serial(&self.path, BoardDoc::default, |doc| {
                doc.tasks.insert(task.task_id.to_string(), task.clone());
                task
            })?;
        Ok(stored)
    }

    /// Split a parent into atomic children. Children are created `ready`
    /// with a parent pointer; the parent's status is re-derived. Returns
    /// the updated parent.
    pub fn split(&self, parent_id: &TaskId, mut children: Vec<Task>) -> Result<Task, BoardError> {
        for child in &children {
            child.validate_paths()?;
        }
        self.store
            .update_serial(&self.path, BoardDoc::default, |doc| {
                let parent = doc
                    .tasks
                    .get(parent_id.as_str())
                    .ok_or_else(|| BoardError::NotFound(parent_id.to_string()))?;
                if parent.kind != TaskKind::Parent {
                    return Err(BoardError::NotParent(parent_id.to_string()));
                }
                for child in &mut children {
                    child.kind = TaskKind::Atomic;
                    child.status = TaskStatus::Ready;
                    child.pointers.parent = Some(parent_id.clone());
                    doc.tasks.insert(child.task_id.to_string(), child.clone());
                }
                rederive_parent(doc, parent_id);
                doc.tasks
                    .get(parent_id.as_str())
                    .cloned()
                    .ok_or_else(|| BoardError::NotFound(parent_id.to_string()))
            })?
    }

    /// Apply a lifecycle transition to an atomic task. Parent statuses
    /// are derived, never set directly (except cancellation).
    pub fn transition(&self, id: &TaskId, next: TaskStatus) -> Result<Task, BoardError> {
        self.store
            .update_serial(&self.path, BoardDoc::default, |doc| {
                let task = doc
                    .tasks
                    .get_mut(id.as_str())
                    .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
                if task.kind == TaskKind::Parent && next != TaskStatus::Cancelled {
                    return Err(BoardError::ParentTransition(id.to_string()));
                }
                if !task.status.can_transition_to(next) {
                    return Err(BoardError::IllegalTransition {
                        id: id.to_string(),
                        from: task.status,
                        to: next,
                    });
                }
                task.status = next;
                let parent_id = task.pointers.parent.clone();
                if let Some(pid) = parent_id {
                    rederive_parent(doc, &pid);
                }
                doc.tasks
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| BoardError::NotFound(id.to_string()))
            })?
    }

    /// Set or clear the explicit priority override.
    pub fn set_priority(&self, id: &TaskId, priority: Option<i64>) -> Result<Task, BoardError> {
        self.store
            .update_serial(&self.path, BoardDoc::default, |doc| {
                let task = doc
                    .tasks
                    .get_mut(id.as_str())
                    .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
                task.priority = priority;
                Ok(task.clone())
            })?
    }

    /// Bump the dispatch-attempt counter, returning the new value.
    pub fn increment_attempts(&self, id: &TaskId) -> Result<u32, BoardError> {
        self.store
            .update_serial(&self.path, BoardDoc::default, |doc| {
                let task = doc
                    .tasks
                    .get_mut(id.as_str())
                    .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
                task.attempts += 1;
                Ok(task.attempts)
            })?
    }

    /// Atomic children of a parent.
    pub fn children(&self, parent_id: &TaskId) -> Vec<Task> {
        let doc: BoardDoc = self.store.read(&self.path, BoardDoc::default);
        doc.tasks
            .into_values()
            .filter(|t| t.pointers.parent.as_ref() == Some(parent_id))
            .collect()
    }
}

/// Recompute a parent's derived status from its children in place.
fn rederive_parent(doc: &mut BoardDoc, parent_id: &TaskId) {
    let statuses: Vec<TaskStatus> = doc
        .tasks
        .values()
        .filter(|t| t.pointers.parent.as_ref() == Some(parent_id))
        .map(|t| t.status)
        .collect();
    if let Some(parent) = doc.tasks.get_mut(parent_id.as_str()) {
        if parent.kind == TaskKind::Parent && !parent.status.is_terminal() {
            parent.status = derive_parent_status(&statuses);
        }
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
