// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the gateway.

use scc_core::{Config, ConfigError};
use std::path::PathBuf;
use tracing::warn;

/// Env key families the configuration recognizes. Anything else in the
/// process environment is not ours and is ignored entirely.
const EXACT_KEYS: &[&str] = &[
    "GATEWAY_PORT",
    "CONTEXT_PACK_V1_REQUIRED",
    "SEEN_WINDOW_MS",
    "STALL_SECONDS",
];
const PREFIX_FAMILIES: &[&str] = &["EXEC_", "MODEL_POOL_", "MAX_SPAWN_", "MAX_PRUNE_"];

/// Resolve the data root: `SCC_DATA_DIR` or the working directory.
/// `state/`, `artifacts/`, and `map/` live underneath.
pub fn data_dir() -> PathBuf {
    std::env::var("SCC_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Parse gateway configuration from the process environment. Unknown
/// keys inside the recognized families are an error in strict mode and
/// logged once in permissive mode.
pub fn load_config() -> Result<Config, ConfigError> {
    let pairs = std::env::vars().filter(|(key, _)| {
        EXACT_KEYS.contains(&key.as_str())
            || PREFIX_FAMILIES.iter().any(|prefix| key.starts_with(prefix))
    });
    let (config, unknown) = Config::from_pairs(pairs)?;
    for key in unknown {
        warn!(key, "unrecognized configuration key ignored");
    }
    Ok(config)
}
