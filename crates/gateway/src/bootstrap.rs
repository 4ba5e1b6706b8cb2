// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide state assembly: stores, engine, reaper, instance lock.

use fs2::FileExt;
use scc_core::{Config, SystemClock, UuidIdGen};
use scc_engine::lifecycle::LifecycleParams;
use scc_engine::{Lifecycle, PackService, WakeBroker, WorkerRegistry};
use scc_storage::{BoardStore, EventLog, JobStore, JsonStore};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub type GatewayLifecycle = Lifecycle<SystemClock, UuidIdGen>;

/// Shared handler state: the lifecycle controller plus everything it
/// fronts.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<GatewayLifecycle>,
}

/// Wire the stores and engine together under `data_dir`.
pub fn build_state(config: Config, data_dir: &Path) -> AppState {
    let store = Arc::new(JsonStore::new());
    let state_dir = data_dir.join("state");
    let artifacts_dir = data_dir.join("artifacts");
    let lifecycle = Lifecycle::new(LifecycleParams {
        board: Arc::new(BoardStore::new(Arc::clone(&store), &state_dir)),
        jobs: Arc::new(JobStore::new(Arc::clone(&store), &state_dir)),
        registry: Arc::new(WorkerRegistry::new()),
        packs: Arc::new(PackService::new(artifacts_dir.join("packs"))),
        events: Arc::new(EventLog::new(artifacts_dir.join("events.jsonl"))),
        broker: Arc::new(WakeBroker::new()),
        store,
        config,
        clock: SystemClock,
        ids: UuidIdGen,
        state_dir,
        artifacts_dir,
        map_dir: data_dir.join("map"),
    });
    AppState {
        lifecycle: Arc::new(lifecycle),
    }
}

/// Take the single-instance lock, writing our pid into the lock file.
/// The lock is held for the process lifetime via the returned handle.
pub fn acquire_instance_lock(data_dir: &Path) -> std::io::Result<File> {
    let state_dir = data_dir.join("state");
    std::fs::create_dir_all(&state_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(state_dir.join("gateway.lock"))?;
    file.try_lock_exclusive()?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Spawn the periodic reaper. The gateway is the only place that
/// schedules timers.
pub fn spawn_reaper(state: &AppState) -> tokio::task::JoinHandle<()> {
    let lifecycle = Arc::clone(&state.lifecycle);
    let period = Duration::from_millis(lifecycle.config().reaper_period_ms);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match lifecycle.reaper_tick() {
                Ok(reaped) if reaped > 0 => info!(reaped, "reaper cancelled stalled jobs"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "reaper tick failed"),
            }
        }
    })
}
