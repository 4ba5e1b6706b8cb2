// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL event log at `artifacts/events.jsonl`.
//!
//! Writes are best-effort: a failed append is logged and the state
//! transition that produced it proceeds regardless.

use parking_lot::Mutex;
use scc_core::{DomainEvent, TaskId};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Global domain event log.
pub struct EventLog {
    path: PathBuf,
    // Serializes appends so concurrent rows never interleave mid-line.
    write_lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event row. Best-effort: errors are logged, never
    /// returned.
    pub fn append(&self, event: &DomainEvent) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.append_inner(event) {
            warn!(
                path = %self.path.display(),
                event_type = %event.event_type,
                error = %e,
                "event append failed, transition proceeds",
            );
        }
    }

    fn append_inner(&self, event: &DomainEvent) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_vec(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push(b'\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&line)
    }

    /// Last `n` parseable rows. Corrupt lines are skipped.
    pub fn tail(&self, n: usize) -> Vec<DomainEvent> {
        let mut rows = self.read_all();
        if rows.len() > n {
            rows.drain(..rows.len() - n);
        }
        rows
    }

    /// True when at least one row references the task.
    pub fn any_for_task(&self, task_id: &TaskId) -> bool {
        self.read_all().iter().any(|e| e.task_id == *task_id)
    }

    fn read_all(&self) -> Vec<DomainEvent> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match serde_json::from_str(l) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "skipping corrupt event row");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
