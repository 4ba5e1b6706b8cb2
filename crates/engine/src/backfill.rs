// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic artifact backfill for non-strict gate runs.
//!
//! Identical inputs produce identical bytes, and a re-run over an
//! already-backfilled artifact tree records the same
//! `contracts_backfill.json` (the backfilled set is unioned with what a
//! prior run wrote).

use scc_core::{
    DomainEvent, EventType, Job, PinsRequest, Preflight, ReplayBundle, Task,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const BACKFILL_SCHEMA_VERSION: &str = "scc.contracts_backfill.v1";

/// Record of which artifacts the runner had to synthesize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillRecord {
    pub schema_version: String,
    pub backfilled: Vec<String>,
}

/// Synthesize the artifacts non-strict gates tolerate missing. Existing
/// files are never overwritten. Returns the union of everything this and
/// prior runs backfilled.
pub fn apply(
    artifacts_dir: &Path,
    task: &Task,
    job: &Job,
    pins: &PinsRequest,
    preflight: &Preflight,
) -> std::io::Result<BackfillRecord> {
    fs::create_dir_all(artifacts_dir)?;
    fs::create_dir_all(artifacts_dir.join("pins"))?;

    let mut backfilled = read_prior(artifacts_dir);

    let mut fill = |rel: &str, bytes: Vec<u8>| -> std::io::Result<()> {
        let path = artifacts_dir.join(rel);
        if !path.exists() {
            fs::write(&path, bytes)?;
            backfilled.push(rel.to_string());
        }
        Ok(())
    };

    fill("patch.diff", Vec::new())?;
    fill(
        "report.md",
        format!(
            "# {}\n\nNo report was submitted; placeholder generated by the gate runner.\n",
            task.task_id
        )
        .into_bytes(),
    )?;
    fill("events.jsonl", synthesized_event_row(task, job)?)?;
    fill(
        "replay_bundle.json",
        serde_json::to_vec(&ReplayBundle::minimal(
            task,
            &job.executor,
            job.model.as_deref(),
        ))?,
    )?;
    fill("preflight.json", serde_json::to_vec(preflight)?)?;
    fill("pins/pins.json", serde_json::to_vec(pins)?)?;

    backfilled.sort();
    backfilled.dedup();
    let record = BackfillRecord {
        schema_version: BACKFILL_SCHEMA_VERSION.to_string(),
        backfilled,
    };
    fs::write(
        artifacts_dir.join("contracts_backfill.json"),
        serde_json::to_vec(&record)?,
    )?;
    Ok(record)
}

/// One synthesized event row so the events gate has something to read.
/// Timestamped from job creation, never the wall clock.
fn synthesized_event_row(task: &Task, job: &Job) -> std::io::Result<Vec<u8>> {
    let event = DomainEvent::new(
        EventType::JobClaimed,
        task.task_id.clone(),
        job.created_at_ms,
    )
    .with_executor(job.executor.clone())
    .with_reason("backfilled");
    let mut row = serde_json::to_vec(&event)?;
    row.push(b'\n');
    Ok(row)
}

fn read_prior(artifacts_dir: &Path) -> Vec<String> {
    let path = artifacts_dir.join("contracts_backfill.json");
    let Ok(bytes) = fs::read(&path) else {
        return Vec::new();
    };
    serde_json::from_slice::<BackfillRecord>(&bytes)
        .map(|r| r.backfilled)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "backfill_tests.rs"]
mod tests;
