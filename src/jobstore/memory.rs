/*
 * src/jobstore/memory.rs
 *
 * File for the in-memory Job Store backend
 *
 * Purpose:
 *   The default job store backend. Uses `dashmap::DashMap` for
 *   lock-free concurrent access from the many tasks a single request
 *   fans out into.
 *
 * Include:
 *   InMemoryJobStore   - DashMap-backed JobStore with a minute sweep
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use crate::error::ErrorKind;
use crate::global::JOB_TTL_IN_MEMORY_SECONDS;
use crate::jobstore::{JobStore, NewJob};
use crate::models::job::{CandidatePool, Job, JobError, JobStatus};

fn now_millis() -> i64 {
	chrono::Utc::now().timestamp_millis()
}

fn now_seconds() -> i64 {
	chrono::Utc::now().timestamp()
}

pub struct InMemoryJobStore {
	jobs: DashMap<String, Job>,
	/// idempotency key -> request id. Cleaned on delete, TTL-expiry, and
	/// sweep; kept alongside the job map as a second index.
	idempotency_index: DashMap<String, String>,
}

impl InMemoryJobStore {
	pub fn new() -> Arc<Self> {
		Arc::new(Self { jobs: DashMap::new(), idempotency_index: DashMap::new() })
	}

	/// Spawns a background task that sweeps expired jobs once a minute.
	/// Returns the task handle so callers (tests, graceful shutdown) can
	/// abort it.
	pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let store = Arc::clone(self);
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_secs(60));
			loop {
				ticker.tick().await;
				store.sweep();
			}
		})
	}

	fn is_expired(job: &Job) -> bool {
		now_seconds() - job.created_at >= JOB_TTL_IN_MEMORY_SECONDS
	}

	fn sweep(&self) {
		let expired: Vec<String> =
			self.jobs.iter().filter(|e| Self::is_expired(e.value())).map(|e| e.key().clone()).collect();
		for request_id in expired {
			if let Some((_, job)) = self.jobs.remove(&request_id) {
				if let Some(key) = job.idempotency_key {
					self.idempotency_index.remove(&key);
				}
			}
		}
	}

	fn get_live(&self, request_id: &str) -> Option<Job> {
		let job = self.jobs.get(request_id)?;
		if Self::is_expired(&job) {
			drop(job);
			self.jobs.remove(request_id);
			return None;
		}
		Some(job.clone())
	}
}

#[async_trait]
impl JobStore for InMemoryJobStore {
	async fn create(&self, request_id: &str, new_job: NewJob) {
		if self.jobs.contains_key(request_id) {
			// Duplicate request id: fail silently, caller keeps the original job.
			return;
		}
		let now = now_seconds();
		let mut job = Job::new(
			request_id.to_string(),
			new_job.session_id,
			new_job.query,
			new_job.owner_user_id,
			new_job.owner_session_id,
			new_job.idempotency_key.clone(),
			now,
		);
		job.updated_at = now;
		if let Some(key) = &new_job.idempotency_key {
			self.idempotency_index.insert(key.clone(), request_id.to_string());
		}
		self.jobs.insert(request_id.to_string(), job);
	}

	async fn set_status(&self, request_id: &str, status: JobStatus, progress: Option<u8>) {
		let Some(mut job) = self.jobs.get_mut(request_id) else {
			warn!(target: "jobstore", request_id, "set_status on unknown job");
			return;
		};
		job.status = status;
		if let Some(p) = progress {
			job.progress = job.progress.max(p);
		}
		if status.is_terminal() {
			job.progress = 100;
		}
		job.updated_at = now_seconds();
	}

	async fn update_heartbeat(&self, request_id: &str) {
		let Some(mut job) = self.jobs.get_mut(request_id) else {
			warn!(target: "jobstore", request_id, "update_heartbeat on unknown job");
			return;
		};
		if job.status.is_terminal() || job.status == JobStatus::Pending {
			return;
		}
		job.updated_at = now_seconds();
	}

	async fn set_result(&self, request_id: &str, value: serde_json::Value) {
		let Some(mut job) = self.jobs.get_mut(request_id) else {
			warn!(target: "jobstore", request_id, "set_result on unknown job");
			return;
		};
		job.result = Some(value);
		job.updated_at = now_seconds();
	}

	async fn set_error(&self, request_id: &str, code: &str, message: &str, error_type: ErrorKind) {
		let Some(mut job) = self.jobs.get_mut(request_id) else {
			warn!(target: "jobstore", request_id, "set_error on unknown job");
			return;
		};
		job.error = Some(JobError { code: code.to_string(), message: message.to_string(), error_type });
		job.status = JobStatus::DoneFailed;
		job.progress = 100;
		job.updated_at = now_seconds();
	}

	async fn get_status(&self, request_id: &str) -> Option<(JobStatus, u8)> {
		self.get_live(request_id).map(|j| (j.status, j.progress))
	}

	async fn get_result(&self, request_id: &str) -> Option<serde_json::Value> {
		self.get_live(request_id).and_then(|j| j.result)
	}

	async fn get_job(&self, request_id: &str) -> Option<Job> {
		self.get_live(request_id)
	}

	async fn find_by_idempotency_key(&self, key: &str, fresh_window_ms: i64) -> Option<Job> {
		let request_id = self.idempotency_index.get(key)?.clone();
		let Some(job) = self.get_live(&request_id) else {
			self.idempotency_index.remove(key);
			return None;
		};
		let now_ms = now_millis();
		let age_ms = now_ms - job.updated_at * 1000;
		let matches = match job.status {
			JobStatus::Running => true,
			JobStatus::DoneSuccess => age_ms <= fresh_window_ms,
			_ => false,
		};
		if matches {
			Some(job)
		} else {
			if job.status.is_terminal() {
				self.idempotency_index.remove(key);
			}
			None
		}
	}

	async fn get_candidate_pool(&self, request_id: &str, session_id: &str) -> Option<CandidatePool> {
		let job = self.get_live(request_id)?;
		if job.session_id.as_deref() != Some(session_id) {
			warn!(target: "jobstore", request_id, "candidate pool ownership mismatch, rejecting");
			return None;
		}
		job.candidate_pool
	}

	async fn set_candidate_pool(&self, request_id: &str, pool: CandidatePool) {
		let Some(mut job) = self.jobs.get_mut(request_id) else {
			warn!(target: "jobstore", request_id, "set_candidate_pool on unknown job");
			return;
		};
		job.candidate_pool = Some(pool);
	}

	async fn get_running_jobs(&self) -> Vec<Job> {
		self.jobs.iter().filter(|e| e.value().status == JobStatus::Running).map(|e| e.value().clone()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn backdated_job(request_id: &str, age_seconds: i64) -> Job {
		let mut job = Job::new(request_id.to_string(), None, "pizza".to_string(), None, None, None, now_seconds() - age_seconds);
		job.status = JobStatus::DoneSuccess;
		job
	}

	#[tokio::test]
	async fn expired_job_is_invisible_and_swept() {
		let store = InMemoryJobStore::new();
		store.jobs.insert("req_old".to_string(), backdated_job("req_old", JOB_TTL_IN_MEMORY_SECONDS + 1));
		store.jobs.insert("req_fresh".to_string(), backdated_job("req_fresh", 1));

		assert!(store.get_job("req_old").await.is_none());
		assert!(store.get_job("req_fresh").await.is_some());
		// get_live's lazy purge removes the expired entry as a side effect.
		assert!(!store.jobs.contains_key("req_old"));
	}

	#[tokio::test]
	async fn sweep_removes_expired_entries_and_their_idempotency_index() {
		let store = InMemoryJobStore::new();
		let mut job = backdated_job("req_old", JOB_TTL_IN_MEMORY_SECONDS + 10);
		job.idempotency_key = Some("key:old".to_string());
		store.jobs.insert("req_old".to_string(), job);
		store.idempotency_index.insert("key:old".to_string(), "req_old".to_string());

		store.sweep();

		assert!(!store.jobs.contains_key("req_old"));
		assert!(!store.idempotency_index.contains_key("key:old"));
	}

	#[tokio::test]
	async fn create_is_silent_no_op_on_duplicate_request_id() {
		let store = InMemoryJobStore::new();
		store.create("req_1", NewJob { session_id: None, query: "a".to_string(), owner_user_id: None, owner_session_id: None, idempotency_key: None }).await;
		store.set_status("req_1", JobStatus::Running, Some(50)).await;
		store.create("req_1", NewJob { session_id: None, query: "b".to_string(), owner_user_id: None, owner_session_id: None, idempotency_key: None }).await;

		let job = store.get_job("req_1").await.unwrap();
		assert_eq!(job.query, "a");
		assert_eq!(job.status, JobStatus::Running);
	}
}
