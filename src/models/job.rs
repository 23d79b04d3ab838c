/*
 * src/models/job.rs
 *
 * File for the Job model
 *
 * Purpose:
 *   The record owned exclusively by the job store. Pipeline stages
 *   read/write it only through the store's operations; nothing here is
 *   a store itself.
 *
 * Include:
 *   JobStatus        - PENDING | RUNNING | DONE_* terminal states
 *   CandidatePool    - cached fetch used for soft-filter requery
 *   Job              - the full record
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::models::plan::ProviderPlan;
use crate::models::result::PlaceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
	Pending,
	Running,
	DoneSuccess,
	DoneClarify,
	DoneStopped,
	DoneFailed,
}

impl JobStatus {
	pub fn is_terminal(self) -> bool {
		matches!(
			self,
			JobStatus::DoneSuccess | JobStatus::DoneClarify | JobStatus::DoneStopped | JobStatus::DoneFailed
		)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePool {
	pub candidates: Vec<PlaceResult>,
	pub search_context: Value,
	pub fetched_at: i64,
	pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
	pub code: String,
	pub message: String,
	pub error_type: ErrorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
	pub request_id: String,
	pub session_id: Option<String>,
	pub query: String,
	pub status: JobStatus,
	/// Monotonic: writers enforce `max(old, new)`, never an assignment.
	pub progress: u8,
	pub result: Option<Value>,
	pub error: Option<JobError>,
	pub created_at: i64,
	pub updated_at: i64,
	pub owner_user_id: Option<String>,
	pub owner_session_id: Option<String>,
	pub idempotency_key: Option<String>,
	pub candidate_pool: Option<CandidatePool>,
}

impl Job {
	pub fn new(
		request_id: String,
		session_id: Option<String>,
		query: String,
		owner_user_id: Option<String>,
		owner_session_id: Option<String>,
		idempotency_key: Option<String>,
		now: i64,
	) -> Self {
		Self {
			request_id,
			session_id,
			query,
			status: JobStatus::Pending,
			progress: 0,
			result: None,
			error: None,
			created_at: now,
			updated_at: now,
			owner_user_id,
			owner_session_id,
			idempotency_key,
			candidate_pool: None,
		}
	}
}
