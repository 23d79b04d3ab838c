/*
 * src/controllers/search.rs
 *
 * File for the Search Controller API endpoints
 *
 * Purpose:
 *   Serve the asynchronous submit/poll surface: a `202 Accepted`
 *   submission handle and a polling endpoint that surfaces
 *   PENDING/RUNNING progress, the terminal result, or the job-store's
 *   own failure record.
 *
 * Include:
 *   api_submit_search   - POST /search?mode=async
 *   api_search_result    - GET /search/{requestId}/result
 *   search_routes         - router factory merged in main.rs
 */

use std::sync::Arc;

use axum::{
	Extension, Json, Router,
	extract::{Path, Query},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::{ApiResult, AppError};
use crate::middleware::{SessionId, TraceId};
use crate::models::job::JobStatus;
use crate::models::request::SearchRequest;
use crate::orchestrator::{AppState, Orchestrator};

#[derive(Debug, Deserialize)]
pub struct ModeQuery {
	#[serde(default)]
	pub mode: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
	pub request_id: String,
	pub result_url: String,
}

/// Submit a query to the search pipeline and get back a polling handle.
///
/// # Method
/// `POST /search?mode=async`
///
/// # Request Body
/// - [SearchRequest] - `query` is required; everything else is optional
///   and filled in by the orchestrator when absent.
///
/// # Responses
/// - `202 ACCEPTED` - with body: [SubmitResponse]
/// - `400 BAD_REQUEST` - empty query, or a `mode` other than `async` (public error)
///
/// # Examples
/// ```bash
/// curl -X POST "http://localhost:3001/search?mode=async" \
///   -H "Content-Type: application/json" \
///   -H "x-session-id: sess_11111111-1111-1111-1111-111111111111" \
///   -d '{"query": "pizza in tel aviv"}'
/// ```
pub async fn api_submit_search(
	Extension(orchestrator): Extension<Arc<Orchestrator>>,
	session: SessionId,
	trace: TraceId,
	Query(params): Query<ModeQuery>,
	Json(body): Json<SearchRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
	if let Some(mode) = &params.mode {
		if mode != "async" {
			return Err(AppError::validation(format!("unsupported mode '{mode}'"), trace.0));
		}
	}
	if body.query.trim().is_empty() {
		return Err(AppError::validation("query must not be empty", trace.0));
	}

	let session_id = body
		.session_id
		.clone()
		.filter(|s| !s.trim().is_empty())
		.unwrap_or_else(|| session.0.clone());

	let outcome = orchestrator.submit(body, session_id).await;
	let response = SubmitResponse {
		result_url: format!("/search/{}/result", outcome.request_id),
		request_id: outcome.request_id,
	};
	Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Poll for the terminal outcome of a previously submitted search.
///
/// # Method
/// `GET /search/{requestId}/result`
///
/// # Responses
/// - `200 OK` - terminal success or clarification, body `{requestId, results, groups?, meta, assist?}`
/// - `202 ACCEPTED` - still in flight, body `{status, progress}`
/// - `404 NOT_FOUND` - unknown or TTL-expired request id
/// - `500 INTERNAL_SERVER_ERROR` - the job reached `DONE_FAILED`
///
/// # Examples
/// ```bash
/// curl http://localhost:3001/search/req_8f14e.../result
/// ```
pub async fn api_search_result(Extension(state): Extension<AppState>, Path(request_id): Path<String>) -> Response {
	let Some(job) = state.job_store.get_job(&request_id).await else {
		return (StatusCode::NOT_FOUND, Json(json!({"requestId": request_id, "error": "NOT_FOUND"}))).into_response();
	};

	match job.status {
		JobStatus::Pending | JobStatus::Running => {
			(StatusCode::ACCEPTED, Json(json!({"status": job.status, "progress": job.progress}))).into_response()
		}
		JobStatus::DoneFailed => {
			let error = job.error.unwrap_or(crate::models::job::JobError {
				code: "UNKNOWN_ERROR".to_string(),
				message: "job failed without a recorded error".to_string(),
				error_type: crate::error::ErrorKind::UnknownError,
			});
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(json!({
					"code": error.code,
					"message": error.message,
					"errorType": error.error_type,
					"traceId": job.request_id,
				})),
			)
				.into_response()
		}
		JobStatus::DoneSuccess | JobStatus::DoneClarify | JobStatus::DoneStopped => match job.result {
			Some(value) => (StatusCode::OK, Json(value)).into_response(),
			None => (
				StatusCode::OK,
				Json(json!({"requestId": job.request_id, "results": [], "meta": {"status": job.status}})),
			)
				.into_response(),
		},
	}
}

/// Create the search routes.
///
/// # Routes
/// - `POST /` - submit a query (see `?mode=async`)
/// - `GET /{requestId}/result` - poll for the terminal outcome
pub fn search_routes() -> Router {
	Router::new().route("/", post(api_submit_search)).route("/{request_id}/result", get(api_search_result))
}
