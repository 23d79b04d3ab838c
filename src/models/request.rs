/*
 * src/models/request.rs
 *
 * File for the Request model
 *
 * Purpose:
 *   Models for the raw submission that enters the pipeline.
 *   Deliberately permissive: almost everything is optional on the
 *   wire, and the orchestrator fills gaps (assigns a request id,
 *   derives an idempotency key).
 *
 * Include:
 *   LatLng         - a plain coordinate pair
 *   SearchRequest  - the submission body
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
	pub lat: f64,
	pub lng: f64,
}

impl LatLng {
	pub fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub user_location: Option<LatLng>,
	#[serde(default)]
	pub locale: Option<String>,
	#[serde(default)]
	pub request_id: Option<String>,
	#[serde(default)]
	pub idempotency_key: Option<String>,
	#[serde(default)]
	pub clear_context: bool,
}
