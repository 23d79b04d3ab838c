/*
 * src/models/result.rs
 *
 * File for place-result and group models
 *
 * Purpose:
 *   Value objects produced by the Provider Executor (C7) and, when
 *   street-grouping fires, annotated by Result Grouping (C9). Results
 *   are never mutated after publication.
 *
 * Include:
 *   Category      - restaurant | cafe | bakery
 *   OpenNow       - three-valued boolean (never coerced)
 *   PlaceResult   - a single normalized provider result
 *   GroupKind     - EXACT | NEARBY
 *   ResultGroup   - a labeled subset of the flat result list
 */

use serde::{Deserialize, Serialize};

use crate::models::request::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Restaurant,
	Cafe,
	Bakery,
}

/// The third value for booleans whose truth was not verified by the
/// provider. `UNKNOWN` must never be coerced to `true`/`false` — an
/// unknown opening status is not the same claim as "closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpenNow {
	True,
	False,
	Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupKind {
	Exact,
	Nearby,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResult {
	pub id: String,
	pub display_name: String,
	pub formatted_address: String,
	pub coordinates: LatLng,
	pub rating: Option<f64>,
	pub rating_count: Option<u32>,
	pub category: Category,
	pub open_now: OpenNow,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group_kind: Option<GroupKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultGroup {
	pub kind: GroupKind,
	pub label: String,
	pub radius_meters: i64,
	pub results: Vec<PlaceResult>,
}

/// Earth-radius haversine distance in meters. Hand-rolled rather than a
/// dependency — pulling in a geo crate for one formula would be the
/// over-engineered choice here.
pub fn haversine_meters(a: LatLng, b: LatLng) -> f64 {
	const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
	let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
	let d_lat = (b.lat - a.lat).to_radians();
	let d_lng = (b.lng - a.lng).to_radians();
	let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
	2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}
