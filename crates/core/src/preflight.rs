// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight result as produced by the external validator.

use serde::{Deserialize, Serialize};

/// What the preflight validator found missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightMissing {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Outcome of the preflight check for one atomic task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preflight {
    pub pass: bool,
    #[serde(default)]
    pub missing: PreflightMissing,
}

impl Preflight {
    /// The result dispatch synthesizes when no validator output exists.
    pub fn passing() -> Self {
        Self {
            pass: true,
            missing: PreflightMissing::default(),
        }
    }
}
