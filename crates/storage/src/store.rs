// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON file store with per-path serialized updaters.
//!
//! Each managed path gets a mutex and an in-memory cache. Writes go to a
//! sibling temp file and are renamed into place, so a partial document is
//! never visible. Updaters for one path queue on its mutex and observe
//! each other's writes in order.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors from store operations. Callers treat `Io` as transient (the
/// HTTP layer answers 5xx and the client retries).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-path state: the document cache behind the path's lock, plus a
/// flag so a malformed file is only reported once.
struct PathEntry {
    cell: Mutex<Option<serde_json::Value>>,
    warned: AtomicBool,
}

/// Atomic JSON read/write with per-file mutex and temp-rename durability.
#[derive(Default)]
pub struct JsonStore {
    entries: Mutex<HashMap<PathBuf, Arc<PathEntry>>>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, path: &Path) -> Arc<PathEntry> {
        let mut entries = self.entries.lock();
        Arc::clone(entries.entry(path.to_owned()).or_insert_with(|| {
            Arc::new(PathEntry {
                cell: Mutex::new(None),
                warned: AtomicBool::new(false),
            })
        }))
    }

    /// Read the document at `path`, falling back to `default` when the
    /// file is missing or malformed (reported once per path).
    pub fn read<T>(&self, path: &Path, default: impl FnOnce() -> T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let entry = self.entry(path);
        let mut cell = entry.cell.lock();
        let value = load_value(&entry, path, &mut cell);
        match value {
            Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
                warn_once(&entry, path, &e.to_string());
                default()
            }),
            None => default(),
        }
    }

    /// Replace the document at `path` in one atomic step.
    pub fn write_atomic<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let entry = self.entry(path);
        let mut cell = entry.cell.lock();
        let json = serde_json::to_value(value)?;
        persist(path, &json)?;
        *cell = Some(json);
        Ok(())
    }

    /// Read-modify-write under the path's lock. Concurrent updaters are
    /// serialized and each sees the previous updater's write. On failure
    /// the on-disk and cached state are left unchanged.
    pub fn update_serial<T, R>(
        &self,
        path: &Path,
        default: impl FnOnce() -> T,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let entry = self.entry(path);
        let mut cell = entry.cell.lock();

        let mut current: T = match load_value(&entry, path, &mut cell) {
            Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
                warn_once(&entry, path, &e.to_string());
                default()
            }),
            None => default(),
        };

        let result = f(&mut current);

        let json = serde_json::to_value(&current)?;
        persist(path, &json)?;
        *cell = Some(json);
        Ok(result)
    }
}

/// Current document for a path: cache first, disk second.
fn load_value(
    entry: &PathEntry,
    path: &Path,
    cell: &mut Option<serde_json::Value>,
) -> Option<serde_json::Value> {
    if let Some(v) = cell.as_ref() {
        return Some(v.clone());
    }
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn_once(entry, path, &e.to_string());
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => {
            *cell = Some(v);
            cell.clone()
        }
        Err(e) => {
            warn_once(entry, path, &e.to_string());
            None
        }
    }
}

/// Write to a sibling temp path, sync, and rename into place.
fn persist(path: &Path, value: &serde_json::Value) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        serde_json::to_writer(&mut file, value)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn warn_once(entry: &PathEntry, path: &Path, detail: &str) {
    if !entry.warned.swap(true, Ordering::Relaxed) {
        warn!(
            path = %path.display(),
            detail,
            "unreadable state file, using default",
        );
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
