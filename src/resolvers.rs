/*
 * src/resolvers.rs
 *
 * File for the Deterministic Resolvers (C3)
 *
 * Purpose:
 *   Three pure total functions from a validated intent (plus optional
 *   GPS, plus a geocode callback). Called only when the pipeline needs
 *   local resolution; the route-LLM mappers may produce equivalent
 *   values straight from the LLM response.
 *
 * Include:
 *   SearchMode, SearchModeResult   - resolveSearchMode
 *   CenterSource, CenterResult     - resolveCenter
 *   RadiusSource, RadiusResult     - resolveRadiusMeters
 */

use async_trait::async_trait;

use crate::global::radius_defaults;
use crate::models::intent::{Intent, LocationAnchorType};
use crate::models::request::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
	Full,
	Assisted,
	Clarify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchModeResult {
	pub mode: SearchMode,
	pub reason: &'static str,
}

pub struct GpsAvailability {
	pub gps_available: bool,
}

/// Priority order: absent food anchor ⇒ CLARIFY; explicit location
/// (not nearMe) ⇒ FULL; nearMe ∧ GPS ⇒ ASSISTED; nearMe ∧ ¬GPS ⇒
/// CLARIFY; no location ⇒ CLARIFY.
pub fn resolve_search_mode(intent: &Intent, ctx: &GpsAvailability) -> SearchModeResult {
	if !intent.food_anchor.present {
		return SearchModeResult { mode: SearchMode::Clarify, reason: "missing_food_anchor" };
	}
	if intent.location_anchor.present && !intent.near_me {
		return SearchModeResult { mode: SearchMode::Full, reason: "explicit_location" };
	}
	if intent.near_me && ctx.gps_available {
		return SearchModeResult { mode: SearchMode::Assisted, reason: "near_me_with_gps" };
	}
	if intent.near_me {
		return SearchModeResult { mode: SearchMode::Clarify, reason: "near_me_without_gps" };
	}
	SearchModeResult { mode: SearchMode::Clarify, reason: "missing_location" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterSource {
	Gps,
	Geocoded,
	Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CenterResult {
	pub center: Option<LatLng>,
	pub source: CenterSource,
}

#[async_trait]
pub trait GeocodeLookup: Send + Sync {
	/// Geocode failure/error never raises — implementations return
	/// `None` rather than propagating an error.
	async fn geocode(&self, text: &str) -> Option<LatLng>;
}

pub struct GpsContext {
	pub gps_coords: Option<LatLng>,
}

/// Priority order: nearMe ∧ GPS ⇒ GPS; explicit anchor ⇒ geocode; else
/// unknown.
pub async fn resolve_center(
	intent: &Intent,
	ctx: &GpsContext,
	geocode: &dyn GeocodeLookup,
) -> CenterResult {
	if intent.near_me {
		if let Some(gps) = ctx.gps_coords {
			return CenterResult { center: Some(gps), source: CenterSource::Gps };
		}
	}
	if intent.location_anchor.present {
		let text = if !intent.location_anchor.text.trim().is_empty() {
			intent.location_anchor.text.as_str()
		} else {
			intent.city_text.as_deref().unwrap_or("")
		};
		if !text.trim().is_empty() {
			if let Some(center) = geocode.geocode(text).await {
				return CenterResult { center: Some(center), source: CenterSource::Geocoded };
			}
		}
	}
	CenterResult { center: None, source: CenterSource::Unknown }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusSource {
	ExplicitUserDistance,
	NearMeDefault,
	AnchorTypeDefault,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusResult {
	pub meters: i64,
	pub source: RadiusSource,
}

/// Priority order: explicit user distance ≻ nearMe default (1000m) ≻
/// anchor-type default. Radius is a hard filter downstream — this
/// resolver only picks the number, it doesn't apply the filter.
pub fn resolve_radius_meters(intent: &Intent) -> RadiusResult {
	if let Some(meters) = intent.explicit_distance.meters {
		return RadiusResult {
			meters: meters.clamp(radius_defaults::MIN_METERS, radius_defaults::MAX_METERS),
			source: RadiusSource::ExplicitUserDistance,
		};
	}
	if intent.near_me {
		return RadiusResult { meters: radius_defaults::NEAR_ME_METERS, source: RadiusSource::NearMeDefault };
	}
	let meters = match intent.location_anchor.kind {
		LocationAnchorType::City => radius_defaults::CITY_METERS,
		LocationAnchorType::Street => radius_defaults::STREET_METERS,
		LocationAnchorType::Poi => radius_defaults::POI_METERS,
		LocationAnchorType::Gps => radius_defaults::GPS_METERS,
		LocationAnchorType::Empty => radius_defaults::FALLBACK_METERS,
	};
	RadiusResult { meters, source: RadiusSource::AnchorTypeDefault }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::intent::{ExplicitDistance, FoodAnchor, LocationAnchor, PriceIntent, Route};

	fn base_intent() -> Intent {
		Intent {
			route: Route::Textsearch,
			food_anchor: FoodAnchor { kind: "pizza".into(), present: true },
			location_anchor: LocationAnchor::default(),
			near_me: false,
			explicit_distance: ExplicitDistance::default(),
			language: "en".into(),
			language_confidence: 0.9,
			assistant_language: "en".into(),
			region_candidate: None,
			region_confidence: 0.0,
			region_reason: None,
			city_text: None,
			landmark_text: None,
			radius_meters: None,
			open_now_requested: false,
			price_intent: PriceIntent::Any,
			distance_intent: None,
			quality_intent: false,
			occasion: None,
			cuisine_key: None,
			confidence: 0.9,
			reason: None,
			user_location: None,
		}
	}

	#[test]
	fn missing_food_anchor_forces_clarify() {
		let mut intent = base_intent();
		intent.food_anchor.present = false;
		let result = resolve_search_mode(&intent, &GpsAvailability { gps_available: true });
		assert_eq!(result.mode, SearchMode::Clarify);
		assert_eq!(result.reason, "missing_food_anchor");
	}

	#[test]
	fn explicit_location_is_full() {
		let mut intent = base_intent();
		intent.location_anchor = LocationAnchor { text: "allenby".into(), kind: LocationAnchorType::Street, present: true };
		let result = resolve_search_mode(&intent, &GpsAvailability { gps_available: false });
		assert_eq!(result.mode, SearchMode::Full);
	}

	#[test]
	fn near_me_without_gps_clarifies() {
		let mut intent = base_intent();
		intent.near_me = true;
		let result = resolve_search_mode(&intent, &GpsAvailability { gps_available: false });
		assert_eq!(result.mode, SearchMode::Clarify);
		assert_eq!(result.reason, "near_me_without_gps");
	}

	#[test]
	fn radius_prefers_explicit_distance() {
		let mut intent = base_intent();
		intent.explicit_distance.meters = Some(300);
		intent.near_me = true;
		let result = resolve_radius_meters(&intent);
		assert_eq!(result.meters, 300);
		assert_eq!(result.source, RadiusSource::ExplicitUserDistance);
	}

	#[test]
	fn radius_falls_back_to_anchor_type() {
		let mut intent = base_intent();
		intent.location_anchor.kind = LocationAnchorType::City;
		let result = resolve_radius_meters(&intent);
		assert_eq!(result.meters, radius_defaults::CITY_METERS);
		assert_eq!(result.source, RadiusSource::AnchorTypeDefault);
	}
}
