// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle controller: every job/task transition funnels through here.
//!
//! Dispatch enqueues, claim hands work to a long-polling worker,
//! complete runs the gate pipeline and applies its verdict, cancel and
//! the periodic reaper unwind jobs whose worker went quiet.

use crate::attest::ct_eq;
use crate::error::EngineError;
use crate::gates::{GateContext, GatePipeline};
use crate::pack::{PackInputs, PackService};
use crate::registry::WorkerRegistry;
use crate::wake::WakeBroker;
use scc_core::job::{Completion, Job, JobStatus};
use scc_core::task::{TaskKind, TaskStatus};
use scc_core::{
    Clock, Config, DomainEvent, EventType, IdGen, JobId, PackId, PinsRequest, Preflight,
    ReplayBundle, SubmitStatus, Task, TaskId, Verdict, VerdictKind, WorkerId,
};
use scc_storage::{BoardStore, EventLog, JobStore, JsonStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-dispatch overrides accepted by the dispatch endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchOverrides {
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    /// Replaces the executor's default job timeout.
    #[serde(default, rename = "timeoutMs")]
    pub timeout_ms: Option<u64>,
}

/// Raw-fetch links for every file of the job's context pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBundleLinks {
    pub fetch_manifest_raw: String,
    pub fetch_pins_raw: String,
    pub fetch_preflight_raw: String,
    pub fetch_task_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_replay_bundle_raw: Option<String>,
}

impl TaskBundleLinks {
    fn for_pack(pack_id: &PackId, has_replay: bool) -> Self {
        let link = |file: &str| format!("/bundle/{pack_id}/{file}?format=raw");
        Self {
            fetch_manifest_raw: link("manifest.json"),
            fetch_pins_raw: link("pins.json"),
            fetch_preflight_raw: link("preflight.json"),
            fetch_task_raw: link("task.json"),
            fetch_replay_bundle_raw: has_replay.then(|| link("replay_bundle.json")),
        }
    }
}

/// What a winning claim returns to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimPayload {
    #[serde(rename = "jobId")]
    pub job_id: JobId,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: u64,
    pub attestation: scc_core::Attestation,
    #[serde(rename = "contextPackV1Id")]
    pub context_pack_v1_id: PackId,
    #[serde(rename = "taskBundle")]
    pub task_bundle: TaskBundleLinks,
}

/// Heartbeat acknowledgement: whether the reported job is still ours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatAck {
    #[serde(rename = "jobRunning")]
    pub job_running: bool,
}

/// Aggregated queue/capacity counts for the pools endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsSnapshot {
    pub jobs: std::collections::BTreeMap<String, usize>,
    #[serde(rename = "runningExternal")]
    pub running_external: usize,
    pub executors: std::collections::BTreeMap<String, ExecutorPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorPool {
    pub running: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(rename = "activeWorkers")]
    pub active_workers: usize,
}

/// Periodic gateway self-report persisted at `state/repo_health.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoHealth {
    pub last_reaper_tick_ms: u64,
    pub running_jobs: usize,
    pub active_workers: usize,
}

/// Constructor bundle for [`Lifecycle`].
pub struct LifecycleParams<C, G> {
    pub board: Arc<BoardStore>,
    pub jobs: Arc<JobStore>,
    pub registry: Arc<WorkerRegistry>,
    pub packs: Arc<PackService>,
    pub events: Arc<EventLog>,
    pub broker: Arc<WakeBroker>,
    pub store: Arc<JsonStore>,
    pub config: Config,
    pub clock: C,
    pub ids: G,
    /// Root of `state/` (repo-health lives here).
    pub state_dir: PathBuf,
    /// Root of `artifacts/` (per-task trees live underneath).
    pub artifacts_dir: PathBuf,
    /// Root of the externally-built `map/` directory.
    pub map_dir: PathBuf,
}

pub struct Lifecycle<C: Clock, G: IdGen> {
    board: Arc<BoardStore>,
    jobs: Arc<JobStore>,
    registry: Arc<WorkerRegistry>,
    packs: Arc<PackService>,
    events: Arc<EventLog>,
    broker: Arc<WakeBroker>,
    store: Arc<JsonStore>,
    config: Config,
    clock: C,
    ids: G,
    state_dir: PathBuf,
    artifacts_dir: PathBuf,
    map_dir: PathBuf,
}

impl<C: Clock, G: IdGen> Lifecycle<C, G> {
    pub fn new(params: LifecycleParams<C, G>) -> Self {
        Self {
            board: params.board,
            jobs: params.jobs,
            registry: params.registry,
            packs: params.packs,
            events: params.events,
            broker: params.broker,
            store: params.store,
            config: params.config,
            clock: params.clock,
            ids: params.ids,
            state_dir: params.state_dir,
            artifacts_dir: params.artifacts_dir,
            map_dir: params.map_dir,
        }
    }

    pub fn board(&self) -> &BoardStore {
        &self.board
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn packs(&self) -> &PackService {
        &self.packs
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Hash of the current externally-built repository map, if present.
    pub fn current_map_hash(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct MapVersion {
            hash: String,
        }
        let bytes = std::fs::read(self.map_dir.join("version.json")).ok()?;
        serde_json::from_slice::<MapVersion>(&bytes).ok().map(|v| v.hash)
    }

    fn artifacts_for(&self, task_id: &TaskId) -> PathBuf {
        self.artifacts_dir.join(task_id.as_str())
    }

    /// Enqueue a job for a ready atomic task: builds (or reuses) the
    /// context pack, appends the job, moves the task to `dispatched`,
    /// and wakes claim waiters for the executor.
    pub fn dispatch(
        &self,
        task_id: &TaskId,
        overrides: DispatchOverrides,
    ) -> Result<Job, EngineError> {
        let task = self.board.get(task_id)?;
        if task.kind != TaskKind::Atomic {
            return Err(EngineError::InvalidRequest(format!(
                "task {task_id} is not atomic"
            )));
        }
        if task.status != TaskStatus::Ready {
            return Err(EngineError::InvalidRequest(format!(
                "task {task_id} is {}, not ready",
                task.status
            )));
        }

        let executors = task.effective_executors(&self.config.default_executors);
        let executor = match overrides.executor {
            Some(executor) => {
                if !executors.iter().any(|e| *e == executor) {
                    return Err(EngineError::InvalidRequest(format!(
                        "executor {executor} is not allowed for task {task_id}"
                    )));
                }
                executor
            }
            None => executors
                .first()
                .cloned()
                .ok_or_else(|| {
                    EngineError::InvalidRequest(format!("task {task_id} allows no executor"))
                })?,
        };

        let model = overrides
            .model
            .or_else(|| task.allowed_models.first().cloned())
            .map(|m| self.resolve_model(&m));

        let prompt = overrides
            .prompt
            .unwrap_or_else(|| format!("{}\n\n{}", task.title, task.goal));
        let priority = task.job_priority(overrides.priority);

        let (pins, preflight, replay) = self.dispatch_inputs(&task);
        let pack_id = self.packs.build(&PackInputs {
            task: &task,
            pins: &pins,
            preflight: &preflight,
            replay: replay.as_ref(),
        })?;

        let now = self.clock.epoch_ms();
        let job = Job {
            job_id: JobId::new(format!("job-{}", self.ids.next())),
            task_id: task.task_id.clone(),
            executor: executor.clone(),
            model,
            prompt,
            status: JobStatus::Queued,
            runner: task.runner,
            priority,
            timeout_ms: overrides
                .timeout_ms
                .unwrap_or_else(|| self.config.timeout_for(&executor)),
            created_at_ms: now,
            claimed_at_ms: None,
            completed_at_ms: None,
            worker_id: None,
            exit_code: None,
            stdout: None,
            stderr: None,
            attestation: None,
            context_pack_v1_id: Some(pack_id),
            result_hashes: None,
            submit: None,
            cancel_reason: None,
            last_heartbeat_ms: None,
            attempt: task.attempts + 1,
        };
        let job = self.jobs.enqueue(job)?;
        self.board.transition(task_id, TaskStatus::Dispatched)?;
        self.broker.wake(&executor);
        info!(
            task_id = task_id.as_str(),
            job_id = job.job_id.as_str(),
            executor,
            priority,
            "job dispatched",
        );
        Ok(job)
    }

    /// Pins, preflight, and replay inputs for a dispatch: whatever the
    /// external builders left in the task's artifact tree, with
    /// synthesized fallbacks.
    fn dispatch_inputs(&self, task: &Task) -> (PinsRequest, Preflight, Option<ReplayBundle>) {
        let dir = self.artifacts_for(&task.task_id);
        let pins = read_json(&dir.join("pins/pins.json")).unwrap_or_else(|| {
            PinsRequest::new(
                self.current_map_hash()
                    .unwrap_or_else(|| "sha256:unversioned".to_string()),
                task.pins.clone(),
            )
        });
        let preflight = read_json(&dir.join("preflight.json")).unwrap_or_else(Preflight::passing);
        let replay =
            read_json::<ReplayBundle>(&dir.join("replay_bundle.json")).filter(|b| b.is_valid());
        (pins, preflight, replay)
    }

    /// Expand a model-pool name into a concrete model when configured.
    fn resolve_model(&self, model: &str) -> String {
        self.config
            .model_pool(model)
            .and_then(|pool| pool.first())
            .cloned()
            .unwrap_or_else(|| model.to_string())
    }

    /// Long-poll claim: search now, then wait on the executor's wake
    /// channel until the deadline. `None` maps to HTTP 204.
    pub async fn claim(
        &self,
        worker_id: &WorkerId,
        executor: &str,
        wait_ms: u64,
    ) -> Result<Option<ClaimPayload>, EngineError> {
        let worker = self
            .registry
            .get(worker_id)
            .ok_or_else(|| EngineError::WorkerNotFound(worker_id.to_string()))?;
        if !worker.supports_executor(executor) {
            return Err(EngineError::ExecutorUnsupported {
                worker: worker_id.to_string(),
                executor: executor.to_string(),
            });
        }

        let wait = Duration::from_millis(wait_ms.min(self.config.claim_wait_cap_ms));
        let deadline = tokio::time::Instant::now() + wait;
        let notify = self.broker.channel(executor);

        loop {
            // Register interest before searching so an enqueue between
            // the search and the wait is never missed.
            let mut notified = std::pin::pin!(notify.notified());
            notified.as_mut().enable();

            let request = scc_storage::ClaimRequest {
                executor: executor.to_string(),
                worker_id: worker_id.clone(),
                worker_models: worker.models.clone(),
                max_running: self.config.concurrency_for(executor),
                now_ms: self.clock.epoch_ms(),
            };
            if let Some(job) = self.jobs.claim(&request)? {
                match self.claim_won(worker_id, &job) {
                    Ok(payload) => return Ok(Some(payload)),
                    Err(e) => {
                        // The task left `dispatched` while the job sat
                        // queued; unwind the claim and keep waiting.
                        warn!(
                            job_id = job.job_id.as_str(),
                            error = %e,
                            "claim unwound, task no longer dispatchable",
                        );
                        let _ = self.jobs.cancel(
                            &job.job_id,
                            "task_not_dispatchable",
                            self.clock.epoch_ms(),
                        );
                        continue;
                    }
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => return Ok(None),
            }
        }
    }

    fn claim_won(&self, worker_id: &WorkerId, job: &Job) -> Result<ClaimPayload, EngineError> {
        self.board.transition(&job.task_id, TaskStatus::InProgress)?;
        self.registry.set_running_job(worker_id, Some(job.job_id.clone()));

        let task = self.board.get(&job.task_id)?;
        self.events.append(&self.event_for(
            EventType::JobClaimed,
            &task,
            job,
            Some(worker_id.to_string()),
        ));
        debug!(
            job_id = job.job_id.as_str(),
            worker_id = worker_id.as_str(),
            "job claimed",
        );

        let pack_id = job
            .context_pack_v1_id
            .clone()
            .ok_or_else(|| EngineError::InvalidRequest("job has no context pack".to_string()))?;
        let attestation = job
            .attestation
            .clone()
            .ok_or_else(|| EngineError::InvalidRequest("job has no attestation".to_string()))?;
        let has_replay = self.packs.has_file(&pack_id, "replay_bundle");
        Ok(ClaimPayload {
            job_id: job.job_id.clone(),
            prompt: job.prompt.clone(),
            model: job.model.clone(),
            timeout_ms: job.timeout_ms,
            attestation,
            context_pack_v1_id: pack_id.clone(),
            task_bundle: TaskBundleLinks::for_pack(&pack_id, has_replay),
        })
    }

    /// Worker heartbeat: bumps liveness, and when the worker names its
    /// running job, refreshes that job's stall anchor.
    pub fn heartbeat(
        &self,
        worker_id: &WorkerId,
        running_job_id: Option<JobId>,
    ) -> Result<HeartbeatAck, EngineError> {
        let now = self.clock.epoch_ms();
        if !self.registry.heartbeat(worker_id, running_job_id.clone(), now) {
            return Err(EngineError::WorkerNotFound(worker_id.to_string()));
        }
        let job_running = match running_job_id {
            Some(job_id) => self.jobs.heartbeat(&job_id, worker_id, now)?,
            None => false,
        };
        Ok(HeartbeatAck { job_running })
    }

    /// Record a completion, run the gates, and apply the verdict.
    pub fn complete(
        &self,
        job_id: &JobId,
        completion: &Completion,
    ) -> Result<Verdict, EngineError> {
        let job = self.jobs.get(job_id)?;
        if job.status != JobStatus::Running {
            return Err(EngineError::InvalidRequest(format!(
                "job {job_id} is {}, not running",
                job.status
            )));
        }
        match job.worker_id.as_ref() {
            Some(w) if ct_eq(w.as_str(), completion.worker_id.as_str()) => {}
            _ => {
                return Err(EngineError::InvalidRequest(format!(
                    "job {job_id} is not claimed by worker {}",
                    completion.worker_id
                )));
            }
        }
        let task = self.board.get(&job.task_id)?;

        let pipeline = GatePipeline::new(
            Arc::clone(&self.packs),
            Arc::clone(&self.events),
            self.config.strict(),
        );
        let verdict = pipeline.evaluate(&GateContext {
            task: &task,
            job: &job,
            submit: &completion.submit,
            hashes: &completion.hashes,
            nonce_echo: &completion.attestation_nonce,
            current_map_hash: self.current_map_hash(),
            artifacts_dir: self.artifacts_for(&task.task_id),
        });

        let attestation_failed = verdict.verdict == VerdictKind::Block
            && verdict.primary_reason() == Some("attestation_mismatch");
        let now = self.clock.epoch_ms();
        let job_status = if attestation_failed {
            JobStatus::Failed
        } else {
            match completion.submit.status {
                SubmitStatus::Done | SubmitStatus::NeedInput => JobStatus::Succeeded,
                SubmitStatus::Failed => JobStatus::Failed,
            }
        };
        let job = {
            self.jobs.record_completion(job_id, completion, job_status, now)?;
            if attestation_failed {
                self.jobs.mark_failed(job_id, "attestation_mismatch")?
            } else {
                self.jobs.get(job_id)?
            }
        };
        self.registry.set_running_job(&completion.worker_id, None);

        // The job is terminal from here on; a verdict-application
        // failure leaves the task awaiting its verdict, recoverable by
        // re-running the pipeline from persisted artifacts.
        self.apply_verdict(&task, &job, &verdict)?;
        self.broker.wake(&job.executor);
        Ok(verdict)
    }

    fn apply_verdict(&self, task: &Task, job: &Job, verdict: &Verdict) -> Result<(), EngineError> {
        let reason = verdict.primary_reason().unwrap_or_default().to_string();
        match verdict.verdict {
            VerdictKind::Pass => {
                self.board.transition(&task.task_id, TaskStatus::Done)?;
                self.events
                    .append(&self.event_for(EventType::Success, task, job, None));
            }
            VerdictKind::NeedInput => {
                self.board.transition(&task.task_id, TaskStatus::NeedInput)?;
                let event_type = if reason == "preflight_failed" {
                    EventType::PreflightFailed
                } else {
                    EventType::ExecutorError
                };
                self.events.append(
                    &self
                        .event_for(event_type, task, job, None)
                        .with_reason(reason),
                );
            }
            VerdictKind::Retry => {
                let attempts = self.board.increment_attempts(&task.task_id)?;
                self.board.transition(&task.task_id, TaskStatus::Failed)?;
                if attempts < self.config.max_retries {
                    self.board.transition(&task.task_id, TaskStatus::Ready)?;
                }
                let event_type = if reason == "tests_failed" {
                    EventType::CiFailed
                } else {
                    EventType::ExecutorError
                };
                self.events.append(
                    &self
                        .event_for(event_type, task, job, None)
                        .with_reason(reason),
                );
            }
            VerdictKind::Block => {
                self.board.transition(&task.task_id, TaskStatus::Failed)?;
                let event_type = if reason == "pins_scope" {
                    EventType::PinsInsufficient
                } else {
                    EventType::ExecutorError
                };
                self.events.append(
                    &self
                        .event_for(event_type, task, job, None)
                        .with_reason(reason),
                );
            }
        }
        Ok(())
    }

    /// Cancel a queued or running job. The task returns to `ready`
    /// unless the reason is terminal (`policy_block`), which cancels it.
    pub fn cancel(&self, job_id: &JobId, reason: &str) -> Result<Job, EngineError> {
        let now = self.clock.epoch_ms();
        let job = self.jobs.cancel(job_id, reason, now)?;
        if let Some(worker_id) = job.worker_id.as_ref() {
            self.registry.set_running_job(worker_id, None);
        }
        if reason == "policy_block" {
            self.board.transition(&job.task_id, TaskStatus::Cancelled)?;
        } else {
            self.return_task_for_retry(&job.task_id, true)?;
        }
        self.broker.wake(&job.executor);
        Ok(job)
    }

    /// Periodic reaper: cancels timed-out and worker-dead jobs, then
    /// clears stalled workers. When both conditions hold, timeout wins
    /// (the worker may only be slow).
    pub fn reaper_tick(&self) -> Result<usize, EngineError> {
        let now = self.clock.epoch_ms();
        let mut reaped = 0;

        for job in self.jobs.get_by_status(JobStatus::Running) {
            let claimed_at = job.claimed_at_ms.unwrap_or(job.created_at_ms);
            let anchor = job.liveness_anchor_ms().unwrap_or(job.created_at_ms);
            if now.saturating_sub(claimed_at) > job.timeout_ms {
                self.reap_job(&job, "timeout", EventType::JobTimeout, now)?;
                reaped += 1;
            } else if now.saturating_sub(anchor) > self.config.stale_window_ms {
                self.reap_job(&job, "worker_dead", EventType::WorkerDead, now)?;
                reaped += 1;
            }
        }

        for (worker_id, job_id) in self
            .registry
            .reap_stalled(now, self.config.cancel_window_ms)
        {
            if let Ok(job) = self.jobs.get(&job_id) {
                if job.status == JobStatus::Running {
                    debug!(
                        worker_id = worker_id.as_str(),
                        job_id = job_id.as_str(),
                        "worker heartbeat lapsed, cancelling its job",
                    );
                    self.reap_job(&job, "worker_dead", EventType::WorkerDead, now)?;
                    reaped += 1;
                }
            }
        }

        self.gc_packs();
        self.record_health(now);
        Ok(reaped)
    }

    /// Best-effort self-report; a write failure never blocks the reaper.
    fn record_health(&self, now: u64) {
        let running_jobs = self.jobs.get_by_status(JobStatus::Running).len();
        let active_workers = self
            .registry
            .list_all()
            .iter()
            .filter(|w| w.is_active(now, self.config.seen_window_ms))
            .count();
        let outcome = self.store.update_serial(
            &self.state_dir.join("repo_health.json"),
            RepoHealth::default,
            |health| {
                health.last_reaper_tick_ms = now;
                health.running_jobs = running_jobs;
                health.active_workers = active_workers;
            },
        );
        if let Err(e) = outcome {
            warn!(error = %e, "repo health write failed");
        }
    }

    fn reap_job(
        &self,
        job: &Job,
        reason: &str,
        event_type: EventType,
        now: u64,
    ) -> Result<(), EngineError> {
        self.jobs.cancel(&job.job_id, reason, now)?;
        if let Some(worker_id) = job.worker_id.as_ref() {
            self.registry.set_running_job(worker_id, None);
        }
        let attempts = self.board.increment_attempts(&job.task_id)?;
        let retry = attempts < self.config.max_retries;
        self.return_task_for_retry(&job.task_id, retry)?;

        let task = self.board.get(&job.task_id)?;
        self.events.append(
            &self
                .event_for(event_type, &task, job, None)
                .with_reason(reason),
        );
        self.broker.wake(&job.executor);
        info!(
            job_id = job.job_id.as_str(),
            task_id = job.task_id.as_str(),
            reason,
            attempts,
            retry,
            "job reaped",
        );
        Ok(())
    }

    /// Return a task to `ready` after its job went away, or park it in
    /// `failed` when attempts ran out.
    fn return_task_for_retry(&self, task_id: &TaskId, retry: bool) -> Result<(), EngineError> {
        let task = self.board.get(task_id)?;
        match task.status {
            TaskStatus::Dispatched => {
                if retry {
                    self.board.transition(task_id, TaskStatus::Ready)?;
                } else {
                    self.board.transition(task_id, TaskStatus::Cancelled)?;
                }
            }
            TaskStatus::InProgress => {
                self.board.transition(task_id, TaskStatus::Failed)?;
                if retry {
                    self.board.transition(task_id, TaskStatus::Ready)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Drop packs no non-terminal job references.
    fn gc_packs(&self) {
        let live: HashSet<PackId> = self
            .jobs
            .list()
            .into_iter()
            .filter(|j| !j.status.is_terminal())
            .filter_map(|j| j.context_pack_v1_id)
            .collect();
        let removed = self.packs.gc(&live);
        if removed > 0 {
            debug!(removed, "context packs garbage-collected");
        }
    }

    /// Aggregated counts for the pools endpoint.
    pub fn pools(&self) -> PoolsSnapshot {
        let now = self.clock.epoch_ms();
        let all = self.jobs.list();
        let mut jobs = std::collections::BTreeMap::new();
        for job in &all {
            *jobs.entry(job.status.to_string()).or_insert(0) += 1;
        }

        let mut executors = std::collections::BTreeMap::new();
        let names: HashSet<String> = all
            .iter()
            .map(|j| j.executor.clone())
            .chain(self.config.exec_concurrency.keys().cloned())
            .collect();
        for name in names {
            executors.insert(
                name.clone(),
                ExecutorPool {
                    running: all
                        .iter()
                        .filter(|j| j.status == JobStatus::Running && j.executor == name)
                        .count(),
                    capacity: self.config.concurrency_for(&name),
                    active_workers: self
                        .registry
                        .list_active(&name, now, self.config.seen_window_ms)
                        .len(),
                },
            );
        }

        PoolsSnapshot {
            jobs,
            running_external: self.jobs.list_running_external().len(),
            executors,
        }
    }

    fn event_for(
        &self,
        event_type: EventType,
        task: &Task,
        job: &Job,
        worker: Option<String>,
    ) -> DomainEvent {
        let mut event = DomainEvent::new(event_type, task.task_id.clone(), self.clock.epoch_ms());
        event.parent_id = task.pointers.parent.clone();
        event.role = task.role.clone();
        event.area = task.area.clone();
        event.executor = job.executor.clone();
        event.model = job.model.clone();
        if let Some(worker) = worker {
            event.details = serde_json::json!({ "workerId": worker });
        }
        event
    }
}

/// Read and parse an optional JSON artifact, `None` on any failure.
fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Option<T> {
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
