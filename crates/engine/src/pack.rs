// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context-pack service: immutable, content-addressed bundles.
//!
//! A pack is the sealed view a worker fetches before executing a job:
//! manifest, task payload, pins, preflight, and (for replay dispatches)
//! the replay bundle. `packId = sha256(canonical manifest JSON)`; the
//! same `(task, mapHash, pinsHash)` tuple always reuses the same pack.

use crate::attest::{attest_sha256_hex, sha256_hex};
use parking_lot::Mutex;
use scc_core::{PackId, Preflight, PinsRequest, ReplayBundle, Task};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const MANIFEST_SCHEMA_VERSION: &str = "scc.context_pack.v1";

/// Bare attestation keys of the files every pack carries.
pub const REQUIRED_PACK_FILES: &[&str] = &["manifest", "pins", "preflight", "task"];

/// Every file name a pack may contain.
const PACK_FILE_NAMES: &[&str] = &[
    "manifest.json",
    "task.json",
    "pins.json",
    "preflight.json",
    "replay_bundle.json",
];

#[derive(Debug, Error)]
pub enum PackError {
    #[error("pack not found: {0}")]
    NotFound(String),
    #[error("not a pack file: {0}")]
    UnknownFile(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One file listed by the pack manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub sha256: String,
    pub size: u64,
}

/// `manifest.json`: enumerates every included file with hash and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    pub schema_version: String,
    pub files: Vec<ManifestEntry>,
}

/// Inputs a pack is materialized from.
pub struct PackInputs<'a> {
    pub task: &'a Task,
    pub pins: &'a PinsRequest,
    pub preflight: &'a Preflight,
    pub replay: Option<&'a ReplayBundle>,
}

/// Builds, serves, and garbage-collects packs under `artifacts/packs/`.
pub struct PackService {
    packs_dir: PathBuf,
    /// `(task_id, map_hash, pins_hash)` → pack, so retries share a view.
    index: Mutex<HashMap<(String, String, String), PackId>>,
}

impl PackService {
    pub fn new(packs_dir: impl Into<PathBuf>) -> Self {
        Self {
            packs_dir: packs_dir.into(),
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Materialize (or reuse) the pack for a job. Idempotent: the same
    /// inputs hash to the same pack id and directory.
    pub fn build(&self, inputs: &PackInputs<'_>) -> Result<PackId, PackError> {
        let pins_bytes = serde_json::to_vec(inputs.pins)?;
        let pins_hash = sha256_hex(&pins_bytes);
        let key = (
            inputs.task.task_id.to_string(),
            inputs.pins.map_ref.hash.clone(),
            pins_hash,
        );
        if let Some(existing) = self.index.lock().get(&key) {
            return Ok(existing.clone());
        }

        let task_bytes = serde_json::to_vec(inputs.task)?;
        let preflight_bytes = serde_json::to_vec(inputs.preflight)?;
        let replay_bytes = inputs
            .replay
            .map(serde_json::to_vec)
            .transpose()?;

        let mut contents: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
        contents.insert("task.json", task_bytes);
        contents.insert("pins.json", pins_bytes);
        contents.insert("preflight.json", preflight_bytes);
        if let Some(replay) = replay_bytes {
            contents.insert("replay_bundle.json", replay);
        }

        let manifest = PackManifest {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            files: contents
                .iter()
                .map(|(name, bytes)| ManifestEntry {
                    name: name.to_string(),
                    sha256: sha256_hex(bytes),
                    size: bytes.len() as u64,
                })
                .collect(),
        };
        let manifest_bytes = serde_json::to_vec(&manifest)?;
        let pack_id = PackId::new(sha256_hex(&manifest_bytes));

        let dir = self.packs_dir.join(pack_id.as_str());
        if !dir.exists() {
            // Stage into a temp dir and rename, so a partly-written pack
            // is never addressable.
            let staging = self.packs_dir.join(format!(".tmp-{}", pack_id.as_str()));
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            fs::create_dir_all(&staging)?;
            for (name, bytes) in &contents {
                fs::write(staging.join(name), bytes)?;
            }
            fs::write(staging.join("manifest.json"), &manifest_bytes)?;
            fs::rename(&staging, &dir)?;
            debug!(pack_id = pack_id.as_str(), "materialized context pack");
        }

        self.index.lock().insert(key, pack_id.clone());
        Ok(pack_id)
    }

    /// Raw bytes of one pack file. Names are validated against the
    /// closed pack file set; there is no path traversal through here.
    pub fn file_bytes(&self, pack_id: &PackId, file_name: &str) -> Result<Vec<u8>, PackError> {
        if !PACK_FILE_NAMES.contains(&file_name) {
            return Err(PackError::UnknownFile(file_name.to_string()));
        }
        let path = self.packs_dir.join(pack_id.as_str()).join(file_name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PackError::NotFound(format!("{pack_id}/{file_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// True when the pack carries the given bare file key.
    pub fn has_file(&self, pack_id: &PackId, bare_name: &str) -> bool {
        self.packs_dir
            .join(pack_id.as_str())
            .join(format!("{bare_name}.json"))
            .exists()
    }

    /// Server-side hash pairs for attestation: for every file present,
    /// `(sha256(bytes), sha256(nonce || bytes))`, keyed by bare name.
    pub fn server_hashes(
        &self,
        pack_id: &PackId,
        nonce: &str,
    ) -> Result<BTreeMap<String, (String, String)>, PackError> {
        let dir = self.packs_dir.join(pack_id.as_str());
        if !dir.exists() {
            return Err(PackError::NotFound(pack_id.to_string()));
        }
        let mut hashes = BTreeMap::new();
        for file_name in PACK_FILE_NAMES {
            let path = dir.join(file_name);
            if !path.exists() {
                continue;
            }
            let bytes = fs::read(&path)?;
            let bare = file_name.trim_end_matches(".json").to_string();
            hashes.insert(
                bare,
                (sha256_hex(&bytes), attest_sha256_hex(nonce, &bytes)),
            );
        }
        Ok(hashes)
    }

    /// Drop pack directories no non-terminal job references. Returns the
    /// number of packs removed.
    pub fn gc(&self, live: &HashSet<PackId>) -> usize {
        let entries = match fs::read_dir(&self.packs_dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(".tmp-") || live.contains(&PackId::new(name.clone())) {
                continue;
            }
            if fs::remove_dir_all(entry.path()).is_ok() {
                removed += 1;
            }
        }
        self.index.lock().retain(|_, id| live.contains(id));
        removed
    }
}

#[cfg(test)]
#[path = "pack_tests.rs"]
mod tests;
