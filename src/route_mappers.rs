/*
 * src/route_mappers.rs
 *
 * File for the Route-LLM Mappers (C6)
 *
 * Purpose:
 *   One mapper per route (TEXTSEARCH / NEARBY / LANDMARK), each calling
 *   the route LLM collaborator with a route-specific schema at
 *   temperature ≈ 0 and a bounded timeout, then applying invariants the
 *   LLM call itself can't guarantee: city-text appending, bias
 *   preservation, cuisine strengthening. A deterministic fallback path
 *   builds the same shape directly from the intent when the LLM fails
 *   entirely, and applies the same invariants.
 *
 * Include:
 *   MapperError       - NEARBY's hard-fail-without-GPS case
 *   map_route         - dispatches to the route-specific mapper
 *   compute_bias      - the bias-preservation invariant, shared by
 *                       every path that can produce a TextSearch plan
 *   strengthen_cuisine - appends a missing cuisine word to a text query
 *
 * The deterministic fallback builders take `&SharedFilters` alongside
 * the intent: a fallback plan still has to carry the allowlist-
 * validated region code and the resolved provider language, not the
 * raw, unvalidated intent fields the LLM path never sees either.
 */

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::global::{BIAS_RADIUS_WHEN_CITY_AND_USER_LOCATION_METERS, NEARBY_MAPPER_DEFAULT_RADIUS_METERS};
use crate::landmark_registry;
use crate::llm::{LlmError, RouteLlmClient, RouteMapperInput};
use crate::models::intent::{Intent, Route};
use crate::models::plan::{AfterGeocode, Bias, ProviderPlan, Strictness};
use crate::models::request::LatLng;
use crate::shared_filters::SharedFilters;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapperError {
	#[error("NEARBY route requires userLocation, none was present")]
	MissingUserLocation,
}

/// Bias-preservation invariant: an LLM-provided bias always wins. Only
/// when the LLM left `llm_bias` unset do we derive one ourselves — from
/// `userLocation` directly, or from `userLocation` at the city-wide
/// radius when both a city and a user location are present. With
/// neither signal, the plan is left unbiased and the provider executor
/// geocodes the city itself.
pub fn compute_bias(user_location: Option<LatLng>, city_text: Option<&str>, llm_bias: Option<Bias>) -> Option<Bias> {
	if llm_bias.is_some() {
		return llm_bias;
	}
	match (user_location, city_text) {
		(Some(center), Some(_)) => {
			Some(Bias { center, radius_meters: BIAS_RADIUS_WHEN_CITY_AND_USER_LOCATION_METERS })
		}
		(Some(center), None) => Some(Bias { center, radius_meters: BIAS_RADIUS_WHEN_CITY_AND_USER_LOCATION_METERS }),
		(None, _) => None,
	}
}

/// Appends the cuisine word to `text_query` when the intent names a
/// cuisine the query text doesn't already mention. Leaves the query
/// untouched when the cuisine is already present, case-insensitively.
pub fn strengthen_cuisine(text_query: &str, cuisine_key: Option<&str>) -> String {
	match cuisine_key {
		Some(cuisine) if !text_query.to_lowercase().contains(&cuisine.to_lowercase()) => {
			format!("{text_query} {cuisine}")
		}
		_ => text_query.to_string(),
	}
}

fn strictness_for(cuisine_key: &Option<String>) -> Strictness {
	if cuisine_key.is_some() { Strictness::Strict } else { Strictness::RelaxIfEmpty }
}

fn build_textsearch_fallback(intent: &Intent, filters: &SharedFilters) -> ProviderPlan {
	let base_query = intent.food_anchor.kind.clone();
	let with_city = match &intent.city_text {
		Some(city) if !city.trim().is_empty() => format!("{base_query} {city}"),
		_ => base_query,
	};
	let text_query = strengthen_cuisine(&with_city, intent.cuisine_key.as_deref());
	let bias = compute_bias(intent.user_location, intent.city_text.as_deref(), None);
	ProviderPlan::TextSearch {
		text_query,
		provider_language: filters.provider_language.clone(),
		region_code: filters.region_code.clone(),
		bias,
		city_text: intent.city_text.clone(),
		cuisine_key: intent.cuisine_key.clone(),
		strictness: strictness_for(&intent.cuisine_key),
	}
}

fn finalize_textsearch(intent: &Intent, plan: ProviderPlan) -> ProviderPlan {
	match plan {
		ProviderPlan::TextSearch { text_query, provider_language, region_code, bias, city_text, cuisine_key, strictness } => {
			let text_query = strengthen_cuisine(&text_query, cuisine_key.as_deref().or(intent.cuisine_key.as_deref()));
			let bias = compute_bias(intent.user_location, city_text.as_deref(), bias);
			ProviderPlan::TextSearch { text_query, provider_language, region_code, bias, city_text, cuisine_key, strictness }
		}
		other => other,
	}
}

pub async fn map_textsearch(client: &dyn RouteLlmClient, intent: &Intent, filters: &SharedFilters, timeout: Duration) -> ProviderPlan {
	let input = RouteMapperInput {
		intent: intent.clone(),
		city_text: intent.city_text.clone(),
		cuisine_key: intent.cuisine_key.clone(),
	};
	match client.map_textsearch(&input, timeout).await {
		Ok(plan) => finalize_textsearch(intent, plan),
		Err(e) => {
			warn!(target: "route_mappers", route = "textsearch", error = %e, "llm mapper failed, using deterministic fallback");
			build_textsearch_fallback(intent, filters)
		}
	}
}

fn build_nearby_fallback(intent: &Intent, filters: &SharedFilters, user_location: LatLng) -> ProviderPlan {
	let radius = intent.radius_meters.unwrap_or(NEARBY_MAPPER_DEFAULT_RADIUS_METERS);
	ProviderPlan::Nearby {
		center: user_location,
		radius_meters: radius,
		keyword: if intent.food_anchor.present { Some(intent.food_anchor.kind.clone()) } else { None },
		provider_language: filters.provider_language.clone(),
		region_code: filters.region_code.clone(),
	}
}

/// NEARBY is a hard requirement: without `userLocation` the mapper
/// fails fast, and the caller is expected to degrade the whole pipeline
/// to a CLARIFY response rather than invent a center.
pub async fn map_nearby(
	client: &dyn RouteLlmClient,
	intent: &Intent,
	filters: &SharedFilters,
	timeout: Duration,
) -> Result<ProviderPlan, MapperError> {
	let user_location = intent.user_location.ok_or(MapperError::MissingUserLocation)?;
	let input = RouteMapperInput { intent: intent.clone(), city_text: None, cuisine_key: intent.cuisine_key.clone() };
	match client.map_nearby(&input, timeout).await {
		Ok(ProviderPlan::Nearby { center, radius_meters, keyword, provider_language, region_code }) => {
			// Output coordinates must equal the input user location —
			// never trust a model-invented center for this route.
			Ok(ProviderPlan::Nearby { center: user_location, radius_meters, keyword, provider_language, region_code })
		}
		Ok(other) => Ok(other),
		Err(e) => {
			warn!(target: "route_mappers", route = "nearby", error = %e, "llm mapper failed, using deterministic fallback");
			Ok(build_nearby_fallback(intent, filters, user_location))
		}
	}
}

// `LandmarkPlan` carries no `provider_language`/`region_code` fields at
// all (see `models::plan`), so `_filters` is accepted only for
// signature symmetry with the other two fallback builders and isn't
// read here.
fn build_landmark_fallback(
	intent: &Intent,
	_filters: &SharedFilters,
	landmark_id: Option<&str>,
	known_lat_lng: Option<LatLng>,
	geocode_query: String,
) -> ProviderPlan {
	let radius = intent.radius_meters.unwrap_or(NEARBY_MAPPER_DEFAULT_RADIUS_METERS);
	ProviderPlan::LandmarkPlan {
		geocode_query,
		after_geocode: if known_lat_lng.is_some() { AfterGeocode::NearbySearch } else { AfterGeocode::TextSearchWithBias },
		landmark_id: landmark_id.map(str::to_string),
		resolved_lat_lng: known_lat_lng,
		radius_meters: radius,
		keyword: if intent.food_anchor.present { Some(intent.food_anchor.kind.clone()) } else { None },
		cuisine_key: intent.cuisine_key.clone(),
	}
}

/// A registry hit with known coordinates skips the LLM call entirely —
/// there is nothing left for the model to resolve.
pub async fn map_landmark(client: &dyn RouteLlmClient, intent: &Intent, filters: &SharedFilters, timeout: Duration) -> ProviderPlan {
	let landmark_text = intent.landmark_text.as_deref().unwrap_or("");
	if let Some(entry) = landmark_registry::lookup(landmark_text) {
		if let Some(coords) = entry.known_lat_lng {
			return build_landmark_fallback(intent, filters, Some(entry.id), Some(coords), entry.primary_name.to_string());
		}
	}

	let input = RouteMapperInput { intent: intent.clone(), city_text: None, cuisine_key: intent.cuisine_key.clone() };
	match client.map_landmark(&input, timeout).await {
		Ok(plan) => plan,
		Err(e) => {
			warn!(target: "route_mappers", route = "landmark", error = %e, "llm mapper failed, using deterministic fallback");
			build_landmark_fallback(intent, filters, None, None, landmark_text.to_string())
		}
	}
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteMapError {
	#[error(transparent)]
	Mapper(#[from] MapperError),
	#[error("route is CLARIFY, there is nothing to map to a provider plan")]
	NotMappable,
}

pub async fn map_route(
	client: &dyn RouteLlmClient,
	intent: &Intent,
	filters: &SharedFilters,
	timeout: Duration,
) -> Result<ProviderPlan, RouteMapError> {
	match intent.route {
		Route::Textsearch => Ok(map_textsearch(client, intent, filters, timeout).await),
		Route::Nearby => Ok(map_nearby(client, intent, filters, timeout).await?),
		Route::Landmark => Ok(map_landmark(client, intent, filters, timeout).await),
		Route::Clarify => Err(RouteMapError::NotMappable),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::llm::fakes::default_fake_intent;
	use crate::shared_filters::{self, SharedFilters};

	fn intent_with(route: Route) -> Intent {
		let mut intent = default_fake_intent();
		intent.route = route;
		intent
	}

	fn filters_for(intent: &Intent) -> SharedFilters {
		shared_filters::resolve_filters(intent)
	}

	struct AlwaysFails;

	#[async_trait::async_trait]
	impl RouteLlmClient for AlwaysFails {
		async fn map_textsearch(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Transport("down".into()))
		}
		async fn map_nearby(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Transport("down".into()))
		}
		async fn map_landmark(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Transport("down".into()))
		}
	}

	#[test]
	fn bias_from_llm_always_wins() {
		let llm_bias = Bias { center: LatLng { lat: 1.0, lng: 2.0 }, radius_meters: 999 };
		let result = compute_bias(Some(LatLng { lat: 9.0, lng: 9.0 }), Some("tel aviv"), Some(llm_bias));
		assert_eq!(result, Some(llm_bias));
	}

	#[test]
	fn cuisine_not_duplicated_when_already_present() {
		let query = strengthen_cuisine("best pizza place", Some("pizza"));
		assert_eq!(query, "best pizza place");
	}

	#[test]
	fn cuisine_appended_when_missing() {
		let query = strengthen_cuisine("restaurant", Some("sushi"));
		assert_eq!(query, "restaurant sushi");
	}

	#[tokio::test]
	async fn nearby_without_user_location_fails_fast() {
		let intent = intent_with(Route::Nearby);
		let filters = filters_for(&intent);
		let result = map_nearby(&AlwaysFails, &intent, &filters, Duration::from_secs(1)).await;
		assert_eq!(result, Err(MapperError::MissingUserLocation));
	}

	#[tokio::test]
	async fn nearby_fallback_uses_exact_user_location() {
		let mut intent = intent_with(Route::Nearby);
		intent.user_location = Some(LatLng { lat: 32.08, lng: 34.78 });
		let filters = filters_for(&intent);
		let plan = map_nearby(&AlwaysFails, &intent, &filters, Duration::from_secs(1)).await.unwrap();
		match plan {
			ProviderPlan::Nearby { center, .. } => assert_eq!(center, intent.user_location.unwrap()),
			_ => panic!("expected Nearby plan"),
		}
	}

	#[tokio::test]
	async fn landmark_with_known_coordinates_skips_llm() {
		let mut intent = intent_with(Route::Landmark);
		intent.landmark_text = Some("ליד עזריאלי שרונה".to_string());
		let filters = filters_for(&intent);
		let plan = map_landmark(&AlwaysFails, &intent, &filters, Duration::from_secs(1)).await;
		match plan {
			ProviderPlan::LandmarkPlan { resolved_lat_lng, after_geocode, .. } => {
				assert!(resolved_lat_lng.is_some());
				assert_eq!(after_geocode, AfterGeocode::NearbySearch);
			}
			_ => panic!("expected LandmarkPlan"),
		}
	}
}
