/*
 * src/jobstore/persistent.rs
 *
 * File for the Redis-backed Job Store
 *
 * Purpose:
 *   The optional persistent job store backend. Keys follow
 *   `search:job:{requestId}` / `search:idempotency:{key}` with a 24h
 *   TTL set at write time, using `redis`'s `tokio-comp` async
 *   multiplexed connection.
 *
 * Include:
 *   RedisJobStore   - JobStore backed by a Redis connection manager
 */

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{error, warn};

use crate::error::ErrorKind;
use crate::jobstore::{JobStore, NewJob};
use crate::models::job::{CandidatePool, Job, JobError, JobStatus};

fn job_key(request_id: &str) -> String {
	format!("search:job:{request_id}")
}

fn idempotency_key(key: &str) -> String {
	format!("search:idempotency:{key}")
}

fn now_seconds() -> i64 {
	chrono::Utc::now().timestamp()
}

pub struct RedisJobStore {
	conn: ConnectionManager,
	ttl_seconds: i64,
}

impl RedisJobStore {
	/// Connects eagerly so initialization failure is observable at
	/// construction time rather than on first use.
	pub async fn connect(redis_url: &str, ttl_seconds: i64) -> Result<Self, redis::RedisError> {
		let client = redis::Client::open(redis_url)?;
		let conn = ConnectionManager::new(client).await?;
		Ok(Self { conn, ttl_seconds })
	}

	async fn load(&self, request_id: &str) -> Option<Job> {
		let mut conn = self.conn.clone();
		let raw: Option<String> = conn.get(job_key(request_id)).await.ok().flatten();
		let raw = raw?;
		match serde_json::from_str(&raw) {
			Ok(job) => Some(job),
			Err(e) => {
				error!(target: "jobstore_redis", request_id, error = %e, "corrupt job record");
				None
			}
		}
	}

	async fn store(&self, job: &Job) {
		let mut conn = self.conn.clone();
		let Ok(raw) = serde_json::to_string(job) else {
			error!(target: "jobstore_redis", request_id = %job.request_id, "failed to serialize job");
			return;
		};
		let ttl = self.ttl_seconds.max(1) as u64;
		let _: Result<(), _> = conn.set_ex(job_key(&job.request_id), raw, ttl).await;
	}
}

#[async_trait]
impl JobStore for RedisJobStore {
	async fn create(&self, request_id: &str, new_job: NewJob) {
		if self.load(request_id).await.is_some() {
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
		self.store(&job).await;
		if let Some(key) = &new_job.idempotency_key {
			let mut conn = self.conn.clone();
			let ttl = self.ttl_seconds.max(1) as u64;
			let _: Result<(), _> = conn.set_ex(idempotency_key(key), request_id, ttl).await;
		}
	}

	async fn set_status(&self, request_id: &str, status: JobStatus, progress: Option<u8>) {
		let Some(mut job) = self.load(request_id).await else {
			warn!(target: "jobstore_redis", request_id, "set_status on unknown job");
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
		self.store(&job).await;
	}

	async fn update_heartbeat(&self, request_id: &str) {
		let Some(mut job) = self.load(request_id).await else {
			warn!(target: "jobstore_redis", request_id, "update_heartbeat on unknown job");
			return;
		};
		if job.status.is_terminal() || job.status == JobStatus::Pending {
			return;
		}
		job.updated_at = now_seconds();
		self.store(&job).await;
	}

	async fn set_result(&self, request_id: &str, value: serde_json::Value) {
		let Some(mut job) = self.load(request_id).await else {
			warn!(target: "jobstore_redis", request_id, "set_result on unknown job");
			return;
		};
		job.result = Some(value);
		job.updated_at = now_seconds();
		self.store(&job).await;
	}

	async fn set_error(&self, request_id: &str, code: &str, message: &str, error_type: ErrorKind) {
		let Some(mut job) = self.load(request_id).await else {
			warn!(target: "jobstore_redis", request_id, "set_error on unknown job");
			return;
		};
		job.error = Some(JobError { code: code.to_string(), message: message.to_string(), error_type });
		job.status = JobStatus::DoneFailed;
		job.progress = 100;
		job.updated_at = now_seconds();
		self.store(&job).await;
	}

	async fn get_status(&self, request_id: &str) -> Option<(JobStatus, u8)> {
		self.load(request_id).await.map(|j| (j.status, j.progress))
	}

	async fn get_result(&self, request_id: &str) -> Option<serde_json::Value> {
		self.load(request_id).await.and_then(|j| j.result)
	}

	async fn get_job(&self, request_id: &str) -> Option<Job> {
		self.load(request_id).await
	}

	async fn find_by_idempotency_key(&self, key: &str, fresh_window_ms: i64) -> Option<Job> {
		let mut conn = self.conn.clone();
		let request_id: Option<String> = conn.get(idempotency_key(key)).await.ok().flatten();
		let request_id = request_id?;
		let job = self.load(&request_id).await?;
		let now_ms = now_seconds() * 1000;
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
				let _: Result<(), _> = conn.del(idempotency_key(key)).await;
			}
			None
		}
	}

	async fn get_candidate_pool(&self, request_id: &str, session_id: &str) -> Option<CandidatePool> {
		let job = self.load(request_id).await?;
		if job.session_id.as_deref() != Some(session_id) {
			warn!(target: "jobstore_redis", request_id, "candidate pool ownership mismatch, rejecting");
			return None;
		}
		job.candidate_pool
	}

	async fn set_candidate_pool(&self, request_id: &str, pool: CandidatePool) {
		let Some(mut job) = self.load(request_id).await else {
			warn!(target: "jobstore_redis", request_id, "set_candidate_pool on unknown job");
			return;
		};
		job.candidate_pool = Some(pool);
		self.store(&job).await;
	}

	/// Cursor-based SCAN in pages of 100 rather than a single blocking
	/// KEYS enumeration.
	async fn get_running_jobs(&self) -> Vec<Job> {
		let mut conn = self.conn.clone();
		let mut cursor: u64 = 0;
		let mut running = Vec::new();
		loop {
			let (next_cursor, keys): (u64, Vec<String>) = match redis::cmd("SCAN")
				.arg(cursor)
				.arg("MATCH")
				.arg("search:job:*")
				.arg("COUNT")
				.arg(100)
				.query_async(&mut conn)
				.await
			{
				Ok(v) => v,
				Err(e) => {
					error!(target: "jobstore_redis", error = %e, "scan failed during get_running_jobs");
					break;
				}
			};
			for key in keys {
				if let Ok(Some(raw)) = conn.get::<_, Option<String>>(&key).await {
					if let Ok(job) = serde_json::from_str::<Job>(&raw) {
						if job.status == JobStatus::Running {
							running.push(job);
						}
					}
				}
			}
			cursor = next_cursor;
			if cursor == 0 {
				break;
			}
		}
		running
	}

	async fn ping(&self) -> bool {
		let mut conn = self.conn.clone();
		redis::cmd("PING").query_async::<String>(&mut conn).await.is_ok()
	}
}
