/*
 * src/jobstore/mod.rs
 *
 * File for the Job Store (C1)
 *
 * Purpose:
 *   Ownership-tagged, TTL-bounded, idempotency-indexed record of
 *   in-flight and completed search jobs. Defines the store contract as
 *   a trait so the orchestrator is agnostic to which backend is behind
 *   it (in-memory vs. persistent), kept out from under controllers the
 *   same way database access sits behind its own extension/handle
 *   rather than hard-wired into request handlers.
 *
 * Include:
 *   JobStore    - the store contract
 *   memory      - `InMemoryJobStore`, the default backend
 *   persistent  - `RedisJobStore`, the optional persistent backend
 *   factory     - `create()`, wiring + fallback logic
 */

pub mod factory;
pub mod memory;
pub mod persistent;

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::models::job::{CandidatePool, Job, JobStatus};

#[derive(Debug, Clone)]
pub struct NewJob {
	pub session_id: Option<String>,
	pub query: String,
	pub owner_user_id: Option<String>,
	pub owner_session_id: Option<String>,
	pub idempotency_key: Option<String>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
	/// Records PENDING at current time. Fails silently on duplicate
	/// `request_id` — the orchestrator relies on this to
	/// make job creation itself idempotent-safe.
	async fn create(&self, request_id: &str, new_job: NewJob);

	/// Atomically updates status and bumps `updated_at`; when `progress`
	/// is supplied, stores `max(existing, new)`. Writes to an unknown
	/// `request_id` log a warning and return — they never raise.
	async fn set_status(&self, request_id: &str, status: JobStatus, progress: Option<u8>);

	/// Updates `updated_at` only. No-op if the job is terminal or still
	/// PENDING.
	async fn update_heartbeat(&self, request_id: &str);

	async fn set_result(&self, request_id: &str, value: serde_json::Value);

	async fn set_error(&self, request_id: &str, code: &str, message: &str, error_type: ErrorKind);

	async fn get_status(&self, request_id: &str) -> Option<(JobStatus, u8)>;

	async fn get_result(&self, request_id: &str) -> Option<serde_json::Value>;

	async fn get_job(&self, request_id: &str) -> Option<Job>;

	/// Returns the job iff it is RUNNING (any age within TTL) or
	/// DONE_SUCCESS whose `updated_at` is within `fresh_window_ms`;
	/// otherwise `None`. Stale index entries are purged as a side
	/// effect.
	async fn find_by_idempotency_key(&self, key: &str, fresh_window_ms: i64) -> Option<Job>;

	/// The getter verifies `job.session_id == session_id` and returns
	/// `None` on mismatch, guarding against one session reading another's
	/// candidate pool. The rejection is logged but never raised.
	async fn get_candidate_pool(&self, request_id: &str, session_id: &str) -> Option<CandidatePool>;

	async fn set_candidate_pool(&self, request_id: &str, pool: CandidatePool);

	/// Enumerates RUNNING jobs, for graceful shutdown.
	async fn get_running_jobs(&self) -> Vec<Job>;

	/// Liveness probe for `/healthz`. The in-memory backend has nothing
	/// to ping and is always up; `RedisJobStore` overrides this with a
	/// real round-trip.
	async fn ping(&self) -> bool {
		true
	}
}
