/*
 * src/provider.rs
 *
 * File for the Provider Executor (C7)
 *
 * Purpose:
 *   Turns a `ProviderPlan` into a deduplicated, normalized list of
 *   `PlaceResult`s. Pagination is capped so one query can never turn
 *   into an unbounded crawl; category and open-now derivation both
 *   favor an honest `UNKNOWN`/fallback category over guessing.
 *
 * Include:
 *   PlacesProviderClient - collaborator: one plan in, raw pages out
 *   GeocodeClient         - collaborator: free text to coordinates
 *   RawPlace              - one page item before normalization
 *   fetch_results          - pagination + dedup + normalization driver
 *   derive_category        - primaryType/types[] precedence
 *   fakes                  - deterministic test doubles
 */

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::global::{PROVIDER_MAX_PAGES, PROVIDER_MAX_RESULTS};
use crate::models::plan::ProviderPlan;
use crate::models::request::LatLng;
use crate::models::result::{Category, OpenNow, PlaceResult};

#[derive(Debug, Clone)]
pub struct RawPlace {
	pub id: String,
	pub display_name: String,
	pub formatted_address: String,
	pub coordinates: LatLng,
	pub rating: Option<f64>,
	pub rating_count: Option<u32>,
	pub primary_type: Option<String>,
	pub types: Vec<String>,
	pub open_now: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Page {
	pub places: Vec<RawPlace>,
	pub next_page_token: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
	#[error("provider transport error: {0}")]
	Transport(String),
	#[error("provider rate limited")]
	RateLimited,
}

/// A single fetch call against whichever provider method the plan's tag
/// selects (`textSearch` / `nearbySearch`). Production adapters wrap
/// `google_maps::places::Place`; tests use `fakes::FakePlacesProvider`.
#[async_trait]
pub trait PlacesProviderClient: Send + Sync {
	async fn search(&self, plan: &ProviderPlan, page_token: Option<&str>) -> Result<Page, ProviderError>;
}

#[async_trait]
pub trait GeocodeClient: Send + Sync {
	async fn geocode(&self, query: &str, region_code: Option<&str>) -> Result<Option<LatLng>, ProviderError>;
}

const RESTAURANT_TYPES: &[&str] = &["restaurant", "meal_takeaway", "meal_delivery"];
const CAFE_TYPES: &[&str] = &["cafe", "coffee_shop"];
const BAKERY_TYPES: &[&str] = &["bakery"];

/// `primaryType` decides first; only when it's absent or unrecognized
/// does the broader `types[]` list get consulted, in restaurant / cafe
/// / bakery precedence order. Anything matching neither defaults to
/// `Restaurant` — the category is a display hint, not a filter, so
/// there's no `Unknown` variant to fall back to.
pub fn derive_category(primary_type: Option<&str>, types: &[String]) -> Category {
	if let Some(primary) = primary_type {
		if RESTAURANT_TYPES.contains(&primary) {
			return Category::Restaurant;
		}
		if CAFE_TYPES.contains(&primary) {
			return Category::Cafe;
		}
		if BAKERY_TYPES.contains(&primary) {
			return Category::Bakery;
		}
	}
	if types.iter().any(|t| RESTAURANT_TYPES.contains(&t.as_str())) {
		Category::Restaurant
	} else if types.iter().any(|t| CAFE_TYPES.contains(&t.as_str())) {
		Category::Cafe
	} else if types.iter().any(|t| BAKERY_TYPES.contains(&t.as_str())) {
		Category::Bakery
	} else {
		Category::Restaurant
	}
}

fn derive_open_now(open_now: Option<bool>) -> OpenNow {
	match open_now {
		Some(true) => OpenNow::True,
		Some(false) => OpenNow::False,
		None => OpenNow::Unknown,
	}
}

fn normalize(raw: RawPlace) -> PlaceResult {
	PlaceResult {
		id: raw.id,
		display_name: raw.display_name,
		formatted_address: raw.formatted_address,
		coordinates: raw.coordinates,
		rating: raw.rating,
		rating_count: raw.rating_count,
		category: derive_category(raw.primary_type.as_deref(), &raw.types),
		open_now: derive_open_now(raw.open_now),
		group_kind: None,
		distance_meters: None,
	}
}

/// Fetches up to `PROVIDER_MAX_PAGES` pages (capped further at
/// `PROVIDER_MAX_RESULTS` total results), deduplicating by place id as
/// pages arrive — a place appearing on two pages due to provider-side
/// pagination drift is kept only once, first occurrence wins.
pub async fn fetch_results(client: &dyn PlacesProviderClient, plan: &ProviderPlan) -> Result<Vec<PlaceResult>, ProviderError> {
	let mut seen = std::collections::HashSet::new();
	let mut results = Vec::new();
	let mut page_token: Option<String> = None;

	for page_index in 0..PROVIDER_MAX_PAGES {
		if results.len() >= PROVIDER_MAX_RESULTS {
			break;
		}
		let page = match client.search(plan, page_token.as_deref()).await {
			Ok(page) => page,
			Err(e) => {
				if page_index == 0 {
					return Err(e);
				}
				warn!(target: "provider", error = %e, page = page_index, "provider page fetch failed, returning partial results");
				break;
			}
		};

		for raw in page.places {
			if results.len() >= PROVIDER_MAX_RESULTS {
				break;
			}
			if !seen.insert(raw.id.clone()) {
				continue;
			}
			results.push(normalize(raw));
		}

		match page.next_page_token {
			Some(token) => page_token = Some(token),
			None => break,
		}
	}

	Ok(results)
}

pub mod fakes {
	use super::*;
	use std::sync::Mutex;

	#[derive(Default)]
	pub struct FakePlacesProvider {
		pub pages: Mutex<Vec<Page>>,
	}

	#[async_trait]
	impl PlacesProviderClient for FakePlacesProvider {
		async fn search(&self, _plan: &ProviderPlan, _page_token: Option<&str>) -> Result<Page, ProviderError> {
			let mut pages = self.pages.lock().expect("fake provider lock poisoned");
			if pages.is_empty() {
				return Ok(Page { places: vec![], next_page_token: None });
			}
			Ok(pages.remove(0))
		}
	}

	pub struct FakeGeocoder {
		pub response: Option<LatLng>,
	}

	#[async_trait]
	impl GeocodeClient for FakeGeocoder {
		async fn geocode(&self, _query: &str, _region_code: Option<&str>) -> Result<Option<LatLng>, ProviderError> {
			Ok(self.response)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::fakes::FakePlacesProvider;
	use std::sync::Mutex;

	fn raw(id: &str) -> RawPlace {
		RawPlace {
			id: id.to_string(),
			display_name: format!("Place {id}"),
			formatted_address: "123 Main St".to_string(),
			coordinates: LatLng { lat: 32.08, lng: 34.78 },
			rating: Some(4.2),
			rating_count: Some(100),
			primary_type: Some("restaurant".to_string()),
			types: vec!["restaurant".to_string(), "food".to_string()],
			open_now: Some(true),
		}
	}

	fn dummy_plan() -> ProviderPlan {
		ProviderPlan::TextSearch {
			text_query: "pizza".to_string(),
			provider_language: "en".to_string(),
			region_code: None,
			bias: None,
			city_text: None,
			cuisine_key: None,
			strictness: crate::models::plan::Strictness::RelaxIfEmpty,
		}
	}

	#[tokio::test]
	async fn dedup_across_pages_keeps_first_occurrence() {
		let provider = FakePlacesProvider {
			pages: Mutex::new(vec![
				Page { places: vec![raw("a"), raw("b")], next_page_token: Some("tok1".to_string()) },
				Page { places: vec![raw("b"), raw("c")], next_page_token: None },
			]),
		};
		let results = fetch_results(&provider, &dummy_plan()).await.unwrap();
		let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "c"]);
	}

	#[tokio::test]
	async fn pagination_stops_at_max_pages() {
		let pages = (0..10)
			.map(|i| Page { places: vec![raw(&format!("p{i}"))], next_page_token: Some(format!("tok{i}")) })
			.collect();
		let provider = FakePlacesProvider { pages: Mutex::new(pages) };
		let results = fetch_results(&provider, &dummy_plan()).await.unwrap();
		assert_eq!(results.len(), PROVIDER_MAX_PAGES);
	}

	#[test]
	fn primary_type_takes_precedence_over_types_list() {
		let category = derive_category(Some("cafe"), &["restaurant".to_string()]);
		assert_eq!(category, Category::Cafe);
	}

	#[test]
	fn falls_back_to_types_list_when_primary_type_unrecognized() {
		let category = derive_category(Some("point_of_interest"), &["bakery".to_string()]);
		assert_eq!(category, Category::Bakery);
	}

	#[test]
	fn open_now_none_is_unknown_not_false() {
		assert_eq!(derive_open_now(None), OpenNow::Unknown);
	}
}
