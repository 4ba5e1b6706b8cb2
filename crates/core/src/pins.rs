// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pin specs: the read/write scopes a job is allowed to touch.

use serde::{Deserialize, Serialize};

pub const PINS_REQUEST_SCHEMA_VERSION: &str = "scc.pins_request.v1";

/// A line window inside a pinned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinWindow {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Allowed paths and line windows for one atomic task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSpec {
    #[serde(default)]
    pub allowed_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<PinWindow>,
}

impl PinSpec {
    /// True when every path in `paths` falls inside the allowed set.
    pub fn contains_all<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> bool {
        paths.into_iter().all(|p| self.contains(p))
    }

    /// True when `path` is one of the allowed paths.
    pub fn contains(&self, path: &str) -> bool {
        self.allowed_paths.iter().any(|a| a == path)
    }

    /// Validate every allowed path as repo-relative POSIX.
    pub fn validate(&self) -> Result<(), RepoPathError> {
        for p in &self.allowed_paths {
            validate_repo_relative(p)?;
        }
        for w in &self.windows {
            validate_repo_relative(&w.path)?;
        }
        Ok(())
    }
}

/// Reference to the repository map version the pins were built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRef {
    pub hash: String,
}

/// Pin request as produced by the external pins builder (`scc.pins_request.v1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinsRequest {
    pub schema_version: String,
    pub map_ref: MapRef,
    pub pins: PinSpec,
}

impl PinsRequest {
    pub fn new(map_hash: impl Into<String>, pins: PinSpec) -> Self {
        Self {
            schema_version: PINS_REQUEST_SCHEMA_VERSION.to_string(),
            map_ref: MapRef {
                hash: map_hash.into(),
            },
            pins,
        }
    }
}

/// Rejection reason for a non-repo-relative path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoPathError {
    #[error("absolute path rejected: {0}")]
    Absolute(String),
    #[error("path escapes the repository: {0}")]
    Escapes(String),
    #[error("empty path")]
    Empty,
}

/// Reject absolute paths and `..` traversal; the repo tree is the only
/// addressable universe for task files and pins.
pub fn validate_repo_relative(path: &str) -> Result<(), RepoPathError> {
    if path.is_empty() {
        return Err(RepoPathError::Empty);
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(RepoPathError::Absolute(path.to_string()));
    }
    // Windows-style drive prefixes count as absolute too
    if path.len() >= 2 && path.as_bytes()[1] == b':' {
        return Err(RepoPathError::Absolute(path.to_string()));
    }
    if path.split('/').any(|seg| seg == "..") {
        return Err(RepoPathError::Escapes(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "pins_tests.rs"]
mod tests;
