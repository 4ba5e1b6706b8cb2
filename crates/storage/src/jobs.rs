// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store: the persistent queue of dispatch attempts.
//!
//! One list, append-on-create, in-place status updates. Claim is a
//! single `update_serial` critical section: selection, the move to
//! `running`, and nonce generation all happen under the file lock, so
//! two concurrent claims can never win the same job.

use crate::store::{JsonStore, StoreError};
use scc_core::job::{Attestation, Completion, Job, JobStatus};
use scc_core::task::Runner;
use scc_core::{tail_bounded, JobId, TaskId, WorkerId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Job store rejections. Everything except `Store` maps to a 4xx.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("task already has a non-terminal job: {0}")]
    TaskBusy(String),
    #[error("job {id} is {status}, cannot {op}")]
    IllegalState {
        id: String,
        status: JobStatus,
        op: &'static str,
    },
    #[error("job {id} belongs to worker {expected}, not {got}")]
    WorkerMismatch {
        id: String,
        expected: String,
        got: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// On-disk shape of `state/jobs_state.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct JobsDoc {
    jobs: Vec<Job>,
}

/// One claim attempt by a worker.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub executor: String,
    pub worker_id: WorkerId,
    /// Models the worker advertises; a job pinning a model is only
    /// eligible when the worker carries it.
    pub worker_models: Vec<String>,
    /// Per-executor running cap, when configured.
    pub max_running: Option<u32>,
    pub now_ms: u64,
}

/// Persistent queue of jobs and their terminal records.
pub struct JobStore {
    store: Arc<JsonStore>,
    path: PathBuf,
}

impl JobStore {
    pub fn new(store: Arc<JsonStore>, state_dir: &std::path::Path) -> Self {
        Self {
            store,
            path: state_dir.join("jobs_state.json"),
        }
    }

    /// Append a new queued job. At most one job per task may be
    /// non-terminal at a time.
    pub fn enqueue(&self, job: Job) -> Result<Job, JobStoreError> {
        self.store
            .update_serial(&self.path, JobsDoc::default, |doc| {
                let busy = doc
                    .jobs
                    .iter()
                    .any(|j| j.task_id == job.task_id && !j.status.is_terminal());
                if busy {
                    return Err(JobStoreError::TaskBusy(job.task_id.to_string()));
                }
                doc.jobs.push(job.clone());
                Ok(job)
            })?
    }

    /// Atomically claim the best eligible queued job for a worker.
    ///
    /// Selection is priority-descending, then created-ascending, then
    /// job id for stability. The winner moves to `running` with the
    /// worker id, claim time, and a fresh attestation nonce, all before
    /// the lock is released. Returns `None` when nothing is eligible or
    /// the executor's running cap is reached.
    pub fn claim(&self, req: &ClaimRequest) -> Result<Option<Job>, JobStoreError> {
        let req = req.clone();
        self.store
            .update_serial(&self.path, JobsDoc::default, move |doc| {
                if let Some(cap) = req.max_running {
                    let running = doc
                        .jobs
                        .iter()
                        .filter(|j| j.status == JobStatus::Running && j.executor == req.executor)
                        .count();
                    if running >= cap as usize {
                        return None;
                    }
                }

                let mut eligible: Vec<usize> = doc
                    .jobs
                    .iter()
                    .enumerate()
                    .filter(|(_, j)| {
                        j.status == JobStatus::Queued
                            && j.executor == req.executor
                            && j.model
                                .as_ref()
                                .is_none_or(|m| req.worker_models.iter().any(|wm| wm == m))
                    })
                    .map(|(i, _)| i)
                    .collect();
                eligible.sort_by(|&a, &b| {
                    let (ja, jb) = (&doc.jobs[a], &doc.jobs[b]);
                    jb.priority
                        .cmp(&ja.priority)
                        .then(ja.created_at_ms.cmp(&jb.created_at_ms))
                        .then(ja.job_id.cmp(&jb.job_id))
                });

                let index = *eligible.first()?;
                let job = &mut doc.jobs[index];
                job.status = JobStatus::Running;
                job.worker_id = Some(req.worker_id.clone());
                job.claimed_at_ms = Some(req.now_ms);
                job.attestation = Some(Attestation {
                    nonce: fresh_nonce(),
                });
                Some(job.clone())
            })
            .map_err(JobStoreError::from)
    }

    /// Record a worker heartbeat against its running job. Returns false
    /// when the job is gone, no longer running, or owned by another
    /// worker; the worker is expected to poll job status and abort.
    pub fn heartbeat(
        &self,
        job_id: &JobId,
        worker_id: &WorkerId,
        now_ms: u64,
    ) -> Result<bool, JobStoreError> {
        self.store
            .update_serial(&self.path, JobsDoc::default, |doc| {
                let Some(job) = doc.jobs.iter_mut().find(|j| j.job_id == *job_id) else {
                    return false;
                };
                if job.status != JobStatus::Running || job.worker_id.as_ref() != Some(worker_id) {
                    return false;
                }
                job.last_heartbeat_ms = Some(now_ms);
                true
            })
            .map_err(JobStoreError::from)
    }

    /// Record a completion: the job leaves `running` for `succeeded` or
    /// `failed` and its terminal fields are written.
    pub fn record_completion(
        &self,
        job_id: &JobId,
        completion: &Completion,
        status: JobStatus,
        now_ms: u64,
    ) -> Result<Job, JobStoreError> {
        self.store
            .update_serial(&self.path, JobsDoc::default, |doc| {
                let job = doc
                    .jobs
                    .iter_mut()
                    .find(|j| j.job_id == *job_id)
                    .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))?;
                if job.status != JobStatus::Running {
                    return Err(JobStoreError::IllegalState {
                        id: job_id.to_string(),
                        status: job.status,
                        op: "complete",
                    });
                }
                match job.worker_id.as_ref() {
                    Some(w) if *w == completion.worker_id => {}
                    other => {
                        return Err(JobStoreError::WorkerMismatch {
                            id: job_id.to_string(),
                            expected: other.map(|w| w.to_string()).unwrap_or_default(),
                            got: completion.worker_id.to_string(),
                        });
                    }
                }
                job.status = status;
                job.completed_at_ms = Some(now_ms);
                job.exit_code = Some(completion.exit_code);
                job.stdout = completion.stdout.as_deref().map(tail_bounded);
                job.stderr = completion.stderr.as_deref().map(tail_bounded);
                job.result_hashes = Some(completion.hashes.clone());
                job.submit = Some(completion.submit.clone());
                Ok(job.clone())
            })?
    }

    /// Cancel a queued or running job. Cancelled jobs are never
    /// resurrected; a retry enqueues a fresh job for the same task.
    pub fn cancel(
        &self,
        job_id: &JobId,
        reason: &str,
        now_ms: u64,
    ) -> Result<Job, JobStoreError> {
        self.store
            .update_serial(&self.path, JobsDoc::default, |doc| {
                let job = doc
                    .jobs
                    .iter_mut()
                    .find(|j| j.job_id == *job_id)
                    .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))?;
                if job.status.is_terminal() {
                    return Err(JobStoreError::IllegalState {
                        id: job_id.to_string(),
                        status: job.status,
                        op: "cancel",
                    });
                }
                job.status = JobStatus::Cancelled;
                job.cancel_reason = Some(reason.to_string());
                job.completed_at_ms = Some(now_ms);
                Ok(job.clone())
            })?
    }

    /// Mark a failed gate outcome on an already-succeeded job record.
    /// Used when attestation or gates demote a submission.
    pub fn mark_failed(&self, job_id: &JobId, reason: &str) -> Result<Job, JobStoreError> {
        self.store
            .update_serial(&self.path, JobsDoc::default, |doc| {
                let job = doc
                    .jobs
                    .iter_mut()
                    .find(|j| j.job_id == *job_id)
                    .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))?;
                job.status = JobStatus::Failed;
                job.cancel_reason = Some(reason.to_string());
                Ok(job.clone())
            })?
    }

    pub fn get(&self, job_id: &JobId) -> Result<Job, JobStoreError> {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs
            .into_iter()
            .find(|j| j.job_id == *job_id)
            .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))
    }

    pub fn list(&self) -> Vec<Job> {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs
    }

    pub fn get_by_status(&self, status: JobStatus) -> Vec<Job> {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs.into_iter().filter(|j| j.status == status).collect()
    }

    pub fn list_running_external(&self) -> Vec<Job> {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs
            .into_iter()
            .filter(|j| j.status == JobStatus::Running && j.runner == Runner::External)
            .collect()
    }

    pub fn count_running(&self, executor: &str) -> usize {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Running && j.executor == executor)
            .count()
    }

    /// The non-terminal job bound to a task, if any.
    pub fn active_for_task(&self, task_id: &TaskId) -> Option<Job> {
        let doc: JobsDoc = self.store.read(&self.path, JobsDoc::default);
        doc.jobs
            .into_iter()
            .find(|j| j.task_id == *task_id && !j.status.is_terminal())
    }
}

/// 128-bit random nonce, lowercase hex.
fn fresh_nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
