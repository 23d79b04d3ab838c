/*
 * src/models/intent.rs
 *
 * File for the Intent model
 *
 * Purpose:
 *   The schema-validated interpretation of a user's query, produced by
 *   the intent stage and consumed by the deterministic resolvers, the
 *   route mappers, and the shared filters resolver.
 *
 * Include:
 *   Route             - TEXTSEARCH | NEARBY | LANDMARK | CLARIFY
 *   LocationAnchorType - city | street | poi | gps | empty
 *   PriceIntent       - any | cheap | mid | expensive
 *   FoodAnchor        - presence + type text
 *   LocationAnchor    - presence + text + type
 *   ExplicitDistance  - explicit meters parsed from the query text
 *   Intent            - the full validated decision
 */

use serde::{Deserialize, Serialize};

use crate::models::request::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Route {
	Textsearch,
	Nearby,
	Landmark,
	Clarify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAnchorType {
	City,
	Street,
	Poi,
	Gps,
	Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceIntent {
	#[default]
	Any,
	Cheap,
	Mid,
	Expensive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FoodAnchor {
	#[serde(rename = "type")]
	pub kind: String,
	pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAnchor {
	pub text: String,
	#[serde(rename = "type")]
	pub kind: LocationAnchorType,
	pub present: bool,
}

impl Default for LocationAnchor {
	fn default() -> Self {
		Self { text: String::new(), kind: LocationAnchorType::Empty, present: false }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ExplicitDistance {
	pub meters: Option<i64>,
}

/// The validated decision from C5. `reason` explains the most recent
/// deterministic coercion applied (e.g. `"missing_user_location"`,
/// `"explicit_distance_from_me"`, `"fallback"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
	pub route: Route,
	pub food_anchor: FoodAnchor,
	pub location_anchor: LocationAnchor,
	pub near_me: bool,
	pub explicit_distance: ExplicitDistance,

	pub language: String,
	pub language_confidence: f64,
	pub assistant_language: String,

	pub region_candidate: Option<String>,
	pub region_confidence: f64,
	pub region_reason: Option<String>,

	pub city_text: Option<String>,
	pub landmark_text: Option<String>,
	pub radius_meters: Option<i64>,

	pub open_now_requested: bool,
	pub price_intent: PriceIntent,
	pub distance_intent: Option<i64>,
	pub quality_intent: bool,
	pub occasion: Option<String>,
	pub cuisine_key: Option<String>,

	pub confidence: f64,
	pub reason: Option<String>,

	/// Present only for `route = Nearby`; the mapper requires this but
	/// the intent stage carries it through from the request so the
	/// orchestrator's location guard can inspect it without a second
	/// lookup.
	pub user_location: Option<LatLng>,
}

impl Intent {
	/// Enforces the intent invariants. Called once right after the
	/// intent stage (LLM or fallback) produces a candidate; never
	/// skipped, since both the LLM path and the deterministic fallback
	/// must satisfy the same contract.
	pub fn normalize(mut self) -> Self {
		if self.route != Route::Landmark {
			self.landmark_text = None;
		}
		if self.reason.as_deref() == Some("explicit_distance_from_me") {
			self.landmark_text = None;
		}
		if let Some(region) = &self.region_candidate {
			if !is_valid_region(region) {
				self.region_candidate = None;
			}
		}
		if let Some(r) = self.radius_meters {
			self.radius_meters = Some(r.clamp(
				crate::global::radius_defaults::MIN_METERS,
				crate::global::radius_defaults::MAX_METERS,
			));
		}
		if !crate::global::ASSISTANT_LANGUAGES.contains(&self.assistant_language.as_str()) {
			self.assistant_language = "en".to_string();
		}
		self
	}
}

/// ISO-3166-1 alpha-2 shape check. The *allowlist* proper (which codes
/// are actually recognized) lives in `shared_filters`; this only checks
/// the syntactic shape (`/^[A-Z]{2}$/`).
pub fn is_valid_region(code: &str) -> bool {
	code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}
