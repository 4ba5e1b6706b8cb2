// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate pipeline: ordered quality gates over a completed submission.
//!
//! Stages run in a fixed order (attestation, schema, ssot-map,
//! preflight, pins, events, tests, replay) and the first stage that
//! produces anything other than pass terminates the pipeline with that
//! verdict. Business rejections travel as verdicts, never as errors.

use crate::attest::ct_eq;
use crate::backfill;
use crate::pack::{PackService, REQUIRED_PACK_FILES};
use scc_core::{
    CompletionHashes, Job, PinsRequest, Preflight, Submit, SubmitStatus, Task, TaskId, Verdict,
};
use scc_storage::EventLog;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Everything one gate evaluation reads.
pub struct GateContext<'a> {
    pub task: &'a Task,
    pub job: &'a Job,
    pub submit: &'a Submit,
    pub hashes: &'a CompletionHashes,
    /// The nonce the worker echoed at completion.
    pub nonce_echo: &'a str,
    /// Hash in `map/version.json` right now, if the map exists.
    pub current_map_hash: Option<String>,
    /// `artifacts/<taskId>` for this task.
    pub artifacts_dir: PathBuf,
}

/// Deterministic gate sequence in strict or permissive mode.
pub struct GatePipeline {
    packs: Arc<PackService>,
    events: Arc<EventLog>,
    strict: bool,
}

impl GatePipeline {
    pub fn new(packs: Arc<PackService>, events: Arc<EventLog>, strict: bool) -> Self {
        Self {
            packs,
            events,
            strict,
        }
    }

    /// Run every stage and persist `verdict.json`. Artifact writes are
    /// best-effort; the verdict itself is always returned.
    pub fn evaluate(&self, ctx: &GateContext<'_>) -> Verdict {
        let pins_request = self.pack_pins(ctx);
        let preflight = self.pack_preflight(ctx);

        if !self.strict {
            let fallback_pins = pins_request.clone().unwrap_or_else(|| {
                PinsRequest::new(
                    ctx.current_map_hash
                        .clone()
                        .unwrap_or_else(|| "sha256:unversioned".to_string()),
                    ctx.task.pins.clone(),
                )
            });
            let fallback_preflight = preflight.clone().unwrap_or_else(Preflight::passing);
            if let Err(e) = backfill::apply(
                &ctx.artifacts_dir,
                ctx.task,
                ctx.job,
                &fallback_pins,
                &fallback_preflight,
            ) {
                warn!(task_id = ctx.task.task_id.as_str(), error = %e, "artifact backfill failed");
            }
        }

        let verdict = self.run_stages(ctx, pins_request.as_ref(), preflight.as_ref());
        self.persist_verdict(ctx, &verdict);
        verdict
    }

    fn run_stages(
        &self,
        ctx: &GateContext<'_>,
        pins_request: Option<&PinsRequest>,
        preflight: Option<&Preflight>,
    ) -> Verdict {
        // 1. Attestation
        if self.strict {
            if let Err(detail) = self.verify_attestation(ctx) {
                warn!(
                    task_id = ctx.task.task_id.as_str(),
                    job_id = ctx.job.job_id.as_str(),
                    detail,
                    "attestation mismatch",
                );
                return Verdict::block("attestation_mismatch");
            }
        } else {
            warn!(
                task_id = ctx.task.task_id.as_str(),
                "context pack attestation disabled, skipping stage",
            );
        }

        // 2. Schema: artifact paths must exist (strict) or were backfilled
        if ctx.submit.schema_version != scc_core::SUBMIT_SCHEMA_VERSION {
            return Verdict::block("schema");
        }
        if self.strict {
            for rel in ctx.submit.artifacts.declared_paths() {
                if !ctx.artifacts_dir.join(rel).exists() {
                    return Verdict::block("schema");
                }
            }
        }

        // 3. SSOT map freshness
        if let (Some(pins), Some(current)) = (pins_request, ctx.current_map_hash.as_deref()) {
            if pins.map_ref.hash != current {
                return Verdict::retry("stale_map");
            }
        }

        // 4. Preflight
        if let Some(preflight) = preflight {
            if !preflight.pass {
                return Verdict::need_input(
                    "preflight_failed",
                    preflight.missing.files.clone(),
                );
            }
        }

        // 5. Pins containment
        if let Some(pins) = pins_request {
            let changed = ctx.submit.changed_files.iter().map(String::as_str);
            if !pins.pins.contains_all(changed) {
                return Verdict::block("pins_scope");
            }
        }

        // 6. Events (strict only)
        if self.strict && !self.has_event_row(&ctx.task.task_id, ctx) {
            return Verdict::retry("events_missing");
        }

        // 7. Tests
        if !ctx.submit.tests.passed {
            return Verdict::retry("tests_failed");
        }
        if ctx.submit.status == SubmitStatus::Failed {
            return Verdict::retry(
                ctx.submit
                    .reason_code
                    .clone()
                    .unwrap_or_else(|| "submit_failed".to_string()),
            );
        }
        if ctx.submit.status == SubmitStatus::NeedInput {
            return Verdict::need_input("worker_need_input", ctx.submit.needs_input.clone());
        }

        // 8. Replay bundle
        if !self.replay_bundle_present(ctx) {
            return Verdict::retry("replay_missing");
        }

        Verdict::pass()
    }

    /// Verify the nonce echo plus every required pack file's raw and
    /// nonce-bound hash against server-computed values. All comparisons
    /// are constant-time.
    fn verify_attestation(&self, ctx: &GateContext<'_>) -> Result<(), String> {
        let Some(attestation) = ctx.job.attestation.as_ref() else {
            return Err("job carries no attestation".to_string());
        };
        if !ct_eq(ctx.nonce_echo, &attestation.nonce) {
            return Err("nonce echo mismatch".to_string());
        }
        let Some(pack_id) = ctx.job.context_pack_v1_id.as_ref() else {
            return Err("job has no context pack".to_string());
        };
        let server = self
            .packs
            .server_hashes(pack_id, &attestation.nonce)
            .map_err(|e| format!("pack unreadable: {e}"))?;

        let mut required: Vec<&str> = REQUIRED_PACK_FILES.to_vec();
        if self.packs.has_file(pack_id, "replay_bundle") {
            required.push("replay_bundle");
        }
        for bare in required {
            let Some((expected_raw, expected_bound)) = server.get(bare) else {
                return Err(format!("pack file missing: {bare}"));
            };
            let raw = ctx.hashes.task_bundle_files_sha256.get(bare);
            let bound = ctx.hashes.task_bundle_files_attest_sha256.get(bare);
            match (raw, bound) {
                (Some(raw), Some(bound))
                    if ct_eq(raw, expected_raw) && ct_eq(bound, expected_bound) => {}
                _ => return Err(format!("hash mismatch for {bare}")),
            }
        }

        // The manifest JSON is additionally attested through dedicated
        // fields (it is the content address of the whole pack).
        let Some((manifest_raw, manifest_bound)) = server.get("manifest") else {
            return Err("pack manifest missing".to_string());
        };
        match (
            ctx.hashes.context_pack_v1_json_sha256.as_deref(),
            ctx.hashes.context_pack_v1_json_attest_sha256.as_deref(),
        ) {
            (Some(raw), Some(bound))
                if ct_eq(raw, manifest_raw) && ct_eq(bound, manifest_bound) => {}
            _ => return Err("context pack json hash mismatch".to_string()),
        }
        Ok(())
    }

    /// One event row for the task, in the per-task artifact log or the
    /// global log.
    fn has_event_row(&self, task_id: &TaskId, ctx: &GateContext<'_>) -> bool {
        if self.events.any_for_task(task_id) {
            return true;
        }
        let per_task = ctx.artifacts_dir.join("events.jsonl");
        fs::read_to_string(per_task)
            .map(|content| {
                content.lines().any(|line| {
                    serde_json::from_str::<scc_core::DomainEvent>(line)
                        .map(|e| e.task_id == *task_id)
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }

    fn replay_bundle_present(&self, ctx: &GateContext<'_>) -> bool {
        let from_artifacts = fs::read(ctx.artifacts_dir.join("replay_bundle.json"))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<scc_core::ReplayBundle>(&bytes).ok())
            .map(|bundle| bundle.is_valid())
            .unwrap_or(false);
        if from_artifacts {
            return true;
        }
        ctx.job
            .context_pack_v1_id
            .as_ref()
            .map(|pack| self.packs.has_file(pack, "replay_bundle"))
            .unwrap_or(false)
    }

    fn pack_pins(&self, ctx: &GateContext<'_>) -> Option<PinsRequest> {
        let pack_id = ctx.job.context_pack_v1_id.as_ref()?;
        let bytes = self.packs.file_bytes(pack_id, "pins.json").ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn pack_preflight(&self, ctx: &GateContext<'_>) -> Option<Preflight> {
        let pack_id = ctx.job.context_pack_v1_id.as_ref()?;
        let bytes = self.packs.file_bytes(pack_id, "preflight.json").ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn persist_verdict(&self, ctx: &GateContext<'_>, verdict: &Verdict) {
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&ctx.artifacts_dir)?;
            fs::write(
                ctx.artifacts_dir.join("verdict.json"),
                serde_json::to_vec(verdict)?,
            )
        };
        if let Err(e) = write() {
            warn!(
                task_id = ctx.task.task_id.as_str(),
                error = %e,
                "verdict persistence failed",
            );
        }
    }
}

#[cfg(test)]
#[path = "gates_tests.rs"]
mod tests;
