/*
 * src/grouping.rs
 *
 * File for Result Grouping (C9)
 *
 * Purpose:
 *   When the intent's location anchor reads as a street rather than a
 *   city or POI, a single search radius under-serves the query: a
 *   place two doors down and a place two blocks over are both
 *   "nearby" but not equally so. This stage fires a second, wider
 *   fetch concurrently with the first and tags every result EXACT or
 *   NEARBY by which radius actually contained it.
 *
 * Include:
 *   is_street_anchor   - does this location anchor read as a street?
 *   fetch_grouped       - dual-radius concurrent fetch + tagging
 */

use crate::global::radius_defaults;
use crate::models::intent::{LocationAnchor, LocationAnchorType};
use crate::models::plan::ProviderPlan;
use crate::models::request::LatLng;
use crate::models::result::{GroupKind, PlaceResult, ResultGroup, haversine_meters};
use crate::provider::{PlacesProviderClient, ProviderError, fetch_results};

const STREET_MARKERS: &[&str] = &[
	"street", "st.", " st ", "avenue", "ave.", "road", " rd ", "רחוב", "rue", "calle", "avenida", "شارع",
];

/// True when the anchor is explicitly tagged `street`, or when its free
/// text contains a street-type marker word in one of the languages the
/// gate recognizes. A POI or city anchor is never treated as a street
/// even if its text happens to contain one of these words as a
/// substring of something else — the explicit `kind` tag wins first.
pub fn is_street_anchor(anchor: &LocationAnchor) -> bool {
	if anchor.kind == LocationAnchorType::Street {
		return true;
	}
	if anchor.kind != LocationAnchorType::Empty {
		return false;
	}
	let lowered = anchor.text.to_lowercase();
	STREET_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn nearby_plan(center: LatLng, radius_meters: i64, keyword: Option<String>, provider_language: String) -> ProviderPlan {
	ProviderPlan::Nearby { center, radius_meters, keyword, provider_language, region_code: None }
}

fn tag(mut results: Vec<PlaceResult>, center: LatLng, kind: GroupKind) -> Vec<PlaceResult> {
	for result in &mut results {
		result.group_kind = Some(kind);
		result.distance_meters = Some(haversine_meters(center, result.coordinates));
	}
	results
}

/// Runs the 200m and 400m fetches concurrently, tags each batch by
/// which radius it came from, dedupes the combined flat list by place
/// id (an EXACT hit wins over a NEARBY duplicate), and returns both the
/// flat list and the two labeled groups — the flat list is always
/// emitted even when a caller only cares about groups.
pub async fn fetch_grouped(
	client: &dyn PlacesProviderClient,
	center: LatLng,
	keyword: Option<String>,
	provider_language: String,
	exact_radius_meters: i64,
	nearby_radius_meters: i64,
) -> Result<(Vec<PlaceResult>, Vec<ResultGroup>), ProviderError> {
	let exact_plan = nearby_plan(center, exact_radius_meters, keyword.clone(), provider_language.clone());
	let nearby_plan = nearby_plan(center, nearby_radius_meters, keyword, provider_language);

	let (exact_raw, nearby_raw) = tokio::try_join!(fetch_results(client, &exact_plan), fetch_results(client, &nearby_plan))?;

	let exact = tag(exact_raw, center, GroupKind::Exact);
	let nearby = tag(nearby_raw, center, GroupKind::Nearby);

	let mut seen = std::collections::HashSet::new();
	let mut flat = Vec::new();
	for result in exact.iter().chain(nearby.iter()) {
		if seen.insert(result.id.clone()) {
			flat.push(result.clone());
		}
	}
	flat.sort_by(|a, b| a.distance_meters.partial_cmp(&b.distance_meters).unwrap_or(std::cmp::Ordering::Equal));

	let groups = vec![
		ResultGroup { kind: GroupKind::Exact, label: "exact".to_string(), radius_meters: exact_radius_meters, results: exact },
		ResultGroup { kind: GroupKind::Nearby, label: "nearby".to_string(), radius_meters: nearby_radius_meters, results: nearby },
	];

	Ok((flat, groups))
}

#[allow(dead_code)]
fn default_street_radius() -> i64 {
	radius_defaults::STREET_METERS
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::fakes::FakePlacesProvider;
	use crate::provider::{Page, RawPlace};
	use std::sync::Mutex;

	fn anchor(kind: LocationAnchorType, text: &str) -> LocationAnchor {
		LocationAnchor { text: text.to_string(), kind, present: true }
	}

	#[test]
	fn explicit_street_kind_is_street_anchor() {
		assert!(is_street_anchor(&anchor(LocationAnchorType::Street, "anything")));
	}

	#[test]
	fn city_kind_is_never_a_street_anchor_even_with_marker_word() {
		assert!(!is_street_anchor(&anchor(LocationAnchorType::City, "Main Street City")));
	}

	#[test]
	fn free_text_street_marker_is_detected() {
		assert!(is_street_anchor(&anchor(LocationAnchorType::Empty, "רחוב אלנבי 50")));
	}

	fn raw(id: &str) -> RawPlace {
		RawPlace {
			id: id.to_string(),
			display_name: format!("Place {id}"),
			formatted_address: "addr".to_string(),
			coordinates: LatLng { lat: 32.08, lng: 34.78 },
			rating: None,
			rating_count: None,
			primary_type: Some("restaurant".to_string()),
			types: vec![],
			open_now: None,
		}
	}

	#[tokio::test]
	async fn duplicate_across_radii_kept_once_and_tagged() {
		let provider = FakePlacesProvider {
			pages: Mutex::new(vec![
				Page { places: vec![raw("a")], next_page_token: None },
				Page { places: vec![raw("a"), raw("b")], next_page_token: None },
			]),
		};
		let (flat, groups) = fetch_grouped(&provider, LatLng { lat: 32.08, lng: 34.78 }, None, "en".to_string(), 200, 400)
			.await
			.unwrap();
		assert_eq!(flat.len(), 2);
		assert_eq!(groups.len(), 2);
		assert_eq!(groups[0].kind, GroupKind::Exact);
	}
}
