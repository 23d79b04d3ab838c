/*
 * src/models/plan.rs
 *
 * File for the ProviderPlan model
 *
 * Purpose:
 *   The tagged, provider-specific call description produced by the
 *   route mappers and consumed by the provider executor and the cache
 *   guard. One variant per provider call shape — dispatch is by tag,
 *   never by a trait object, so adding a provider method is adding a
 *   variant plus an executor arm.
 *
 * Include:
 *   Strictness     - STRICT | RELAX_IF_EMPTY
 *   AfterGeocode   - nearbySearch | textSearchWithBias
 *   Bias           - center + radius used to rank (not filter) results
 *   ProviderPlan   - TextSearch | Nearby | LandmarkPlan
 */

use serde::{Deserialize, Serialize};

use crate::models::request::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strictness {
	Strict,
	RelaxIfEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfterGeocode {
	#[serde(rename = "nearbySearch")]
	NearbySearch,
	#[serde(rename = "textSearchWithBias")]
	TextSearchWithBias,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bias {
	pub center: LatLng,
	pub radius_meters: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProviderPlan {
	TextSearch {
		text_query: String,
		provider_language: String,
		region_code: Option<String>,
		bias: Option<Bias>,
		city_text: Option<String>,
		cuisine_key: Option<String>,
		strictness: Strictness,
	},
	Nearby {
		center: LatLng,
		radius_meters: i64,
		keyword: Option<String>,
		provider_language: String,
		region_code: Option<String>,
	},
	LandmarkPlan {
		geocode_query: String,
		after_geocode: AfterGeocode,
		landmark_id: Option<String>,
		resolved_lat_lng: Option<LatLng>,
		radius_meters: i64,
		keyword: Option<String>,
		cuisine_key: Option<String>,
	},
}

impl ProviderPlan {
	pub fn kind_tag(&self) -> &'static str {
		match self {
			ProviderPlan::TextSearch { .. } => "TextSearch",
			ProviderPlan::Nearby { .. } => "Nearby",
			ProviderPlan::LandmarkPlan { .. } => "LandmarkPlan",
		}
	}
}
