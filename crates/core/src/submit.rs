// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-supplied submission record (`scc.submit.v1`).

use serde::{Deserialize, Serialize};

pub const SUBMIT_SCHEMA_VERSION: &str = "scc.submit.v1";

/// Top-level fields the v1 schema recognizes. Strict parses reject
/// anything else; permissive parses drop it.
const TOP_LEVEL_FIELDS: &[&str] = &[
    "schema_version",
    "status",
    "reason_code",
    "changed_files",
    "tests",
    "artifacts",
    "exit_code",
    "needs_input",
];

/// Outcome the worker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitStatus {
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "NEED_INPUT")]
    NeedInput,
}

/// Test evidence carried in a submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTests {
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub summary: String,
}

/// Artifact paths the worker wrote, relative to the task's artifact dir.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selftest_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_json: Option<String>,
}

impl SubmitArtifacts {
    /// Paths that must exist on disk for the schema gate in strict mode.
    pub fn declared_paths(&self) -> Vec<&str> {
        [
            self.report_md.as_deref(),
            self.selftest_log.as_deref(),
            self.evidence_dir.as_deref(),
            self.patch_diff.as_deref(),
            self.submit_json.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// The submission a worker posts when its job finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Submit {
    pub schema_version: String,
    pub status: SubmitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub changed_files: Vec<String>,
    #[serde(default)]
    pub tests: SubmitTests,
    #[serde(default)]
    pub artifacts: SubmitArtifacts,
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default)]
    pub needs_input: Vec<String>,
}

impl Submit {
    pub fn new(status: SubmitStatus) -> Self {
        Self {
            schema_version: SUBMIT_SCHEMA_VERSION.to_string(),
            status,
            reason_code: None,
            changed_files: vec![],
            tests: SubmitTests::default(),
            artifacts: SubmitArtifacts::default(),
            exit_code: 0,
            needs_input: vec![],
        }
    }

    /// Parse a submit document. Strict mode rejects unknown top-level
    /// fields and wrong schema versions; permissive mode drops unknown
    /// fields first.
    pub fn parse(value: serde_json::Value, strict: bool) -> Result<Self, SubmitError> {
        let value = if strict {
            value
        } else {
            match value {
                serde_json::Value::Object(mut map) => {
                    map.retain(|k, _| TOP_LEVEL_FIELDS.contains(&k.as_str()));
                    serde_json::Value::Object(map)
                }
                other => other,
            }
        };
        let submit: Submit =
            serde_json::from_value(value).map_err(|e| SubmitError::Invalid(e.to_string()))?;
        if submit.schema_version != SUBMIT_SCHEMA_VERSION {
            return Err(SubmitError::SchemaVersion(submit.schema_version));
        }
        Ok(submit)
    }
}

/// Submit document rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid submit: {0}")]
    Invalid(String),
    #[error("unsupported submit schema version: {0}")]
    SchemaVersion(String),
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
