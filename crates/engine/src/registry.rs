// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory worker registry.
//!
//! Workers register by name and prove liveness through heartbeats.
//! There is no deregistration: a silent death is detected when the seen
//! window lapses, and the worker may simply register again.

use parking_lot::Mutex;
use scc_core::{IdGen, JobId, UuidIdGen, Worker, WorkerId};
use std::collections::HashMap;

/// Registry of known workers, keyed by worker id.
pub struct WorkerRegistry {
    workers: Mutex<HashMap<WorkerId, Worker>>,
    ids: UuidIdGen,
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            ids: UuidIdGen,
        }
    }

    /// Register a worker, creating it if the name is new. Re-registering
    /// an existing name refreshes its capabilities and liveness and
    /// keeps the original id, so a restarted worker resumes identity.
    pub fn register(
        &self,
        name: &str,
        executors: Vec<String>,
        models: Vec<String>,
        now_ms: u64,
    ) -> Worker {
        let mut workers = self.workers.lock();
        if let Some(existing) = workers.values_mut().find(|w| w.name == name) {
            existing.executors = executors;
            existing.models = models;
            existing.last_seen_ms = now_ms;
            return existing.clone();
        }
        let worker = Worker {
            worker_id: WorkerId::new(format!("w-{}", self.ids.next())),
            name: name.to_string(),
            executors,
            models,
            last_seen_ms: now_ms,
            running_job_id: None,
        };
        workers.insert(worker.worker_id.clone(), worker.clone());
        worker
    }

    /// Bump liveness and record the job the worker claims to be running.
    /// Returns false for an unknown worker.
    pub fn heartbeat(
        &self,
        worker_id: &WorkerId,
        running_job_id: Option<JobId>,
        now_ms: u64,
    ) -> bool {
        let mut workers = self.workers.lock();
        match workers.get_mut(worker_id) {
            Some(w) => {
                w.last_seen_ms = now_ms;
                w.running_job_id = running_job_id;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, worker_id: &WorkerId) -> Option<Worker> {
        self.workers.lock().get(worker_id).cloned()
    }

    /// Record the job a claim handed to the worker.
    pub fn set_running_job(&self, worker_id: &WorkerId, job_id: Option<JobId>) {
        if let Some(w) = self.workers.lock().get_mut(worker_id) {
            w.running_job_id = job_id;
        }
    }

    /// Workers inside the seen window advertising the executor.
    pub fn list_active(&self, executor: &str, now_ms: u64, seen_window_ms: u64) -> Vec<Worker> {
        self.workers
            .lock()
            .values()
            .filter(|w| w.is_active(now_ms, seen_window_ms) && w.supports_executor(executor))
            .cloned()
            .collect()
    }

    pub fn list_all(&self) -> Vec<Worker> {
        self.workers.lock().values().cloned().collect()
    }

    /// Workers holding a job whose heartbeat lapsed past the cancel
    /// window. Their `running_job_id` is cleared and the (worker, job)
    /// pairs returned so the lifecycle can cancel the jobs.
    pub fn reap_stalled(&self, now_ms: u64, cancel_window_ms: u64) -> Vec<(WorkerId, JobId)> {
        let mut workers = self.workers.lock();
        let mut reaped = Vec::new();
        for w in workers.values_mut() {
            if let Some(job_id) = w.running_job_id.clone() {
                if !w.is_active(now_ms, cancel_window_ms) {
                    w.running_job_id = None;
                    reaped.push((w.worker_id.clone(), job_id));
                }
            }
        }
        reaped
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
