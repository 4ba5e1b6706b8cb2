// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recognized configuration surface for the gateway.
//!
//! Options arrive as environment pairs; the set of recognized keys is
//! closed. In strict mode (the default) an unrecognized key in the SCC
//! namespace is a startup error; in permissive mode it is reported back
//! to the caller for a single warning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed gateway configuration with every default applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind port for the HTTP gateway (`GATEWAY_PORT`).
    pub gateway_port: u16,
    /// Per-executor running-job caps (`EXEC_CONCURRENCY_<EXECUTOR>`).
    pub exec_concurrency: HashMap<String, u32>,
    /// Per-executor default job timeouts (`EXEC_TIMEOUT_<EXECUTOR>_MS`).
    pub exec_timeout_ms: HashMap<String, u64>,
    /// Named model pools (`MODEL_POOL_FREE`, `MODEL_POOL_VISION`).
    pub model_pools: HashMap<String, Vec<String>>,
    /// Strict attestation / fail-closed gates (`CONTEXT_PACK_V1_REQUIRED`).
    pub context_pack_v1_required: bool,
    /// Worker liveness window (`SEEN_WINDOW_MS`).
    pub seen_window_ms: u64,
    /// Heartbeat-gap window after which a claimed job is cancelled
    /// (`STALL_SECONDS`, stored in ms).
    pub cancel_window_ms: u64,
    /// Advisory autoscaler hints (`MAX_SPAWN_<EXECUTOR>_PER_TICK`,
    /// `MAX_PRUNE_<EXECUTOR>_PER_TICK`). Nothing in the state machine
    /// reads these.
    pub max_spawn_per_tick: HashMap<String, u32>,
    pub max_prune_per_tick: HashMap<String, u32>,
    /// Mission-wide executor list inherited by tasks with an empty
    /// `allowedExecutors`.
    pub default_executors: Vec<String>,
    /// Running-job stall window before the reaper cancels (ms).
    pub stale_window_ms: u64,
    /// Upper bound on a claim long-poll (ms).
    pub claim_wait_cap_ms: u64,
    /// Retry cap applied to RETRY verdicts.
    pub max_retries: u32,
    /// Reaper tick period (ms).
    pub reaper_period_ms: u64,
    /// Job timeout when no per-executor override exists (ms).
    pub default_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_port: 18788,
            exec_concurrency: HashMap::new(),
            exec_timeout_ms: HashMap::new(),
            model_pools: HashMap::new(),
            context_pack_v1_required: true,
            seen_window_ms: 120_000,
            cancel_window_ms: 60_000,
            max_spawn_per_tick: HashMap::new(),
            max_prune_per_tick: HashMap::new(),
            default_executors: vec!["noop".to_string()],
            stale_window_ms: 180_000,
            claim_wait_cap_ms: 25_000,
            max_retries: 3,
            reaper_period_ms: 5_000,
            default_timeout_ms: 600_000,
        }
    }
}

impl Config {
    /// Strict mode gates fail closed; config parsing rejects unknown keys.
    pub fn strict(&self) -> bool {
        self.context_pack_v1_required
    }

    /// Running-job cap for an executor, if configured.
    pub fn concurrency_for(&self, executor: &str) -> Option<u32> {
        self.exec_concurrency.get(executor).copied()
    }

    /// Default job timeout for an executor.
    pub fn timeout_for(&self, executor: &str) -> u64 {
        self.exec_timeout_ms
            .get(executor)
            .copied()
            .unwrap_or(self.default_timeout_ms)
    }

    /// Models in a named pool (`free`, `vision`).
    pub fn model_pool(&self, name: &str) -> Option<&[String]> {
        self.model_pools.get(name).map(Vec::as_slice)
    }

    /// Build a config from environment pairs.
    ///
    /// Returns the parsed config and the list of unrecognized keys. When
    /// the parsed config is strict, unrecognized keys are an error
    /// instead.
    pub fn from_pairs<I>(pairs: I) -> Result<(Self, Vec<String>), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Config::default();
        let mut unknown = Vec::new();

        for (key, value) in pairs {
            match classify(&key) {
                Key::GatewayPort => {
                    config.gateway_port = parse_num(&key, &value)?;
                }
                Key::ExecConcurrency(exec) => {
                    config.exec_concurrency.insert(exec, parse_num(&key, &value)?);
                }
                Key::ExecTimeoutMs(exec) => {
                    config.exec_timeout_ms.insert(exec, parse_num(&key, &value)?);
                }
                Key::ModelPool(pool) => {
                    let models = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    config.model_pools.insert(pool, models);
                }
                Key::ContextPackRequired => {
                    config.context_pack_v1_required = parse_bool(&key, &value)?;
                }
                Key::SeenWindowMs => {
                    config.seen_window_ms = parse_num(&key, &value)?;
                }
                Key::StallSeconds => {
                    let secs: u64 = parse_num(&key, &value)?;
                    config.cancel_window_ms = secs * 1000;
                }
                Key::MaxSpawnPerTick(exec) => {
                    config.max_spawn_per_tick.insert(exec, parse_num(&key, &value)?);
                }
                Key::MaxPrunePerTick(exec) => {
                    config.max_prune_per_tick.insert(exec, parse_num(&key, &value)?);
                }
                Key::Unknown => unknown.push(key),
            }
        }

        if config.strict() && !unknown.is_empty() {
            return Err(ConfigError::UnknownKeys(unknown));
        }
        Ok((config, unknown))
    }
}

/// Shape of a recognized configuration key.
enum Key {
    GatewayPort,
    ExecConcurrency(String),
    ExecTimeoutMs(String),
    ModelPool(String),
    ContextPackRequired,
    SeenWindowMs,
    StallSeconds,
    MaxSpawnPerTick(String),
    MaxPrunePerTick(String),
    Unknown,
}

fn classify(key: &str) -> Key {
    match key {
        "GATEWAY_PORT" => return Key::GatewayPort,
        "CONTEXT_PACK_V1_REQUIRED" => return Key::ContextPackRequired,
        "SEEN_WINDOW_MS" => return Key::SeenWindowMs,
        "STALL_SECONDS" => return Key::StallSeconds,
        "MODEL_POOL_FREE" => return Key::ModelPool("free".to_string()),
        "MODEL_POOL_VISION" => return Key::ModelPool("vision".to_string()),
        _ => {}
    }
    if let Some(exec) = key.strip_prefix("EXEC_CONCURRENCY_") {
        if !exec.is_empty() {
            return Key::ExecConcurrency(exec.to_lowercase());
        }
    }
    if let Some(rest) = key.strip_prefix("EXEC_TIMEOUT_") {
        if let Some(exec) = rest.strip_suffix("_MS") {
            if !exec.is_empty() {
                return Key::ExecTimeoutMs(exec.to_lowercase());
            }
        }
    }
    if let Some(rest) = key.strip_prefix("MAX_SPAWN_") {
        if let Some(exec) = rest.strip_suffix("_PER_TICK") {
            if !exec.is_empty() {
                return Key::MaxSpawnPerTick(exec.to_lowercase());
            }
        }
    }
    if let Some(rest) = key.strip_prefix("MAX_PRUNE_") {
        if let Some(exec) = rest.strip_suffix("_PER_TICK") {
            if !exec.is_empty() {
                return Key::MaxPrunePerTick(exec.to_lowercase());
            }
        }
    }
    Key::Unknown
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "true" | "TRUE" | "yes" => Ok(true),
        "0" | "false" | "FALSE" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Configuration rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("unrecognized configuration keys: {0:?}")]
    UnknownKeys(Vec<String>),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
