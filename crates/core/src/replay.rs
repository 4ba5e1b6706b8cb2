// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay bundles (`scc.replay_bundle.v1`): the record from which the
//! release tool re-dispatches an equivalent job deterministically.

use crate::task::Task;
use serde::{Deserialize, Serialize};

pub const REPLAY_SCHEMA_VERSION: &str = "scc.replay_bundle.v1";

/// Artifact paths captured alongside the task payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_dir: Option<String>,
}

/// Self-contained snapshot of a verified job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayBundle {
    pub schema_version: String,
    pub task: Task,
    pub executor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub artifacts: ReplayArtifacts,
}

impl ReplayBundle {
    /// Minimal bundle: task payload plus dispatch coordinates. Built by the
    /// non-strict backfill from deterministic inputs only.
    pub fn minimal(task: &Task, executor: &str, model: Option<&str>) -> Self {
        Self {
            schema_version: REPLAY_SCHEMA_VERSION.to_string(),
            task: task.clone(),
            executor: executor.to_string(),
            model: model.map(str::to_string),
            artifacts: ReplayArtifacts::default(),
        }
    }

    /// A bundle validates when it carries the v1 schema tag and a
    /// non-empty executor.
    pub fn is_valid(&self) -> bool {
        self.schema_version == REPLAY_SCHEMA_VERSION && !self.executor.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::tests::atomic_task;

    #[test]
    fn minimal_bundle_validates() {
        let bundle = ReplayBundle::minimal(&atomic_task("t1"), "noop", Some("small"));
        assert!(bundle.is_valid());
        assert_eq!(bundle.model.as_deref(), Some("small"));
    }

    #[test]
    fn wrong_schema_version_fails_validation() {
        let mut bundle = ReplayBundle::minimal(&atomic_task("t1"), "noop", None);
        bundle.schema_version = "scc.replay_bundle.v0".to_string();
        assert!(!bundle.is_valid());
    }

    #[test]
    fn minimal_bundle_is_deterministic() {
        let task = atomic_task("t1");
        let a = serde_json::to_vec(&ReplayBundle::minimal(&task, "noop", None)).unwrap();
        let b = serde_json::to_vec(&ReplayBundle::minimal(&task, "noop", None)).unwrap();
        assert_eq!(a, b);
    }
}
