// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate pipeline verdicts (`scc.verdict.v1`).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const VERDICT_SCHEMA_VERSION: &str = "scc.verdict.v1";

/// Final decision of the gate pipeline over one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "RETRY")]
    Retry,
    #[serde(rename = "NEED_INPUT")]
    NeedInput,
    #[serde(rename = "BLOCK")]
    Block,
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictKind::Pass => write!(f, "PASS"),
            VerdictKind::Retry => write!(f, "RETRY"),
            VerdictKind::NeedInput => write!(f, "NEED_INPUT"),
            VerdictKind::Block => write!(f, "BLOCK"),
        }
    }
}

/// Follow-up the verdict asks the lifecycle to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictAction {
    Retry,
    Escalate,
    NeedInput,
    Block,
}

/// Verdict document persisted per task as `verdict.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub schema_version: String,
    pub verdict: VerdictKind,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub actions: Vec<VerdictAction>,
    /// Mirror of the submit/preflight missing list on NEED_INPUT.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs_input: Vec<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            schema_version: VERDICT_SCHEMA_VERSION.to_string(),
            verdict: VerdictKind::Pass,
            reasons: vec![],
            actions: vec![],
            needs_input: vec![],
        }
    }

    pub fn retry(reason: impl Into<String>) -> Self {
        Self {
            schema_version: VERDICT_SCHEMA_VERSION.to_string(),
            verdict: VerdictKind::Retry,
            reasons: vec![reason.into()],
            actions: vec![VerdictAction::Retry],
            needs_input: vec![],
        }
    }

    pub fn need_input(reason: impl Into<String>, needs_input: Vec<String>) -> Self {
        Self {
            schema_version: VERDICT_SCHEMA_VERSION.to_string(),
            verdict: VerdictKind::NeedInput,
            reasons: vec![reason.into()],
            actions: vec![VerdictAction::NeedInput],
            needs_input,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            schema_version: VERDICT_SCHEMA_VERSION.to_string(),
            verdict: VerdictKind::Block,
            reasons: vec![reason.into()],
            actions: vec![VerdictAction::Block],
            needs_input: vec![],
        }
    }

    pub fn primary_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod tests;
