// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lanes: coarse priority classes for board tasks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority class of a task. Unknown lane names are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Fastlane,
    #[default]
    Mainlane,
    Batchlane,
}

impl Lane {
    /// Default job priority for the lane. An explicit per-task override
    /// replaces this value outright.
    pub fn default_priority(&self) -> i64 {
        match self {
            Lane::Fastlane => 900,
            Lane::Mainlane => 500,
            Lane::Batchlane => 100,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Fastlane => write!(f, "fastlane"),
            Lane::Mainlane => write!(f, "mainlane"),
            Lane::Batchlane => write!(f, "batchlane"),
        }
    }
}

impl FromStr for Lane {
    type Err = UnknownLane;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fastlane" => Ok(Lane::Fastlane),
            "mainlane" => Ok(Lane::Mainlane),
            "batchlane" => Ok(Lane::Batchlane),
            other => Err(UnknownLane(other.to_string())),
        }
    }
}

/// Lane normalization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lane: {0}")]
pub struct UnknownLane(pub String);

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;
