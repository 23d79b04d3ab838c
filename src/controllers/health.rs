/*
 * src/controllers/health.rs
 *
 * File for the Health Controller API endpoint
 *
 * Purpose:
 *   A liveness/readiness probe. Redis is only a "required" dependency
 *   when the persistent job store is actually configured — an
 *   in-memory deployment never reports on a backend it doesn't use.
 *
 * Include:
 *   api_healthz    - GET /healthz
 *   health_routes  - router factory merged in main.rs
 */

use axum::{Extension, Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::orchestrator::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
	pub server: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redis: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: &'static str,
	pub ready: bool,
	pub checks: HealthChecks,
}

/// Report liveness and readiness.
///
/// # Method
/// `GET /healthz`
///
/// # Responses
/// - `200 OK` - body [HealthResponse], `status = "UP"`
/// - `503 SERVICE_UNAVAILABLE` - a required dependency is down, `status = "DOWN"`
///
/// # Examples
/// ```bash
/// curl http://localhost:3001/healthz
/// ```
pub async fn api_healthz(Extension(state): Extension<AppState>) -> impl IntoResponse {
	let redis = if state.settings.enable_persistent_job_store { Some(state.job_store.ping().await) } else { None };
	let ready = redis.unwrap_or(true);
	let status = if ready { "UP" } else { "DOWN" };
	let code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

	(code, Json(HealthResponse { status, ready, checks: HealthChecks { server: true, redis } }))
}

/// Create the health route.
///
/// # Routes
/// - `GET /` - liveness/readiness probe
pub fn health_routes() -> Router {
	Router::new().route("/", get(api_healthz))
}
