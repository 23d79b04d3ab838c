/*
 * src/shared_filters.rs
 *
 * File for the Shared Filters Resolver (C8)
 *
 * Purpose:
 *   Derives the cross-cutting filter values every later stage reads
 *   rather than recomputing: the real ISO-3166 region allowlist (the
 *   intent model only shape-checks the code's two-letter form), the
 *   canonical city key used for same-city comparisons, and the
 *   price/open-now predicates applied to provider results.
 *
 * Include:
 *   REGION_ALLOWLIST   - recognized ISO-3166-1 alpha-2 codes
 *   DEFAULT_REGION_CODE - device/region-unknown fallback
 *   sanitize_region     - shape-valid-but-unrecognized codes are dropped
 *   provider_language_for - UI language -> provider API language code
 *   CategoryDisclaimers  - per-category "hours unverified"-style flags
 *   SharedFilters        - the resolved, ready-to-apply filter bundle
 *   resolve_filters      - builds a SharedFilters from an Intent
 *   matches_price        - price-bucket predicate
 *   matches_open_now     - open-now predicate, UNKNOWN is never excluded
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::city_alias;
use crate::models::intent::{Intent, PriceIntent};
use crate::models::result::{Category, OpenNow, PlaceResult};

/// Used when neither the intent nor a device-reported region is
/// available — this deployment's primary market.
pub const DEFAULT_REGION_CODE: &str = "IL";

/// A representative set of region codes this deployment actually
/// serves, not the full ISO-3166 table — codes outside this set are
/// syntactically valid but operationally meaningless here.
static REGION_ALLOWLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
	["IL", "US", "GB", "FR", "ES", "RU", "DE", "IT", "CA", "AU", "AE", "EG", "JO", "TR", "GR", "CY"]
		.into_iter()
		.collect()
});

/// Returns `(sanitized_code, was_changed)`. `was_changed` is true only
/// when the input was `Some` and differed from the output — callers use
/// this to decide whether a sanitization event is worth a log line.
pub fn sanitize_region(candidate: Option<&str>) -> (Option<String>, bool) {
	match candidate {
		Some(code) if REGION_ALLOWLIST.contains(code) => (Some(code.to_string()), false),
		Some(_) => (None, true),
		None => (None, false),
	}
}

/// Per-category disclaimer flags the rendering layer consults when
/// deciding whether to caution the user that a category's hours are
/// commonly unreliable even when the provider did report one —
/// bakeries and cafes keep informal hours far more often than sit-down
/// restaurants do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDisclaimers {
	pub bakery_hours_unreliable: bool,
	pub cafe_hours_unreliable: bool,
}

fn category_disclaimers() -> CategoryDisclaimers {
	CategoryDisclaimers { bakery_hours_unreliable: true, cafe_hours_unreliable: true }
}

pub fn disclaimer_applies(disclaimers: &CategoryDisclaimers, category: Category) -> bool {
	match category {
		Category::Bakery => disclaimers.bakery_hours_unreliable,
		Category::Cafe => disclaimers.cafe_hours_unreliable,
		Category::Restaurant => false,
	}
}

/// The places provider's language parameter doesn't always share the
/// UI's locale code — Hebrew in particular is still `iw` in several
/// provider APIs' legacy language tables. Every other assistant
/// language passes through unchanged.
pub fn provider_language_for(ui_language: &str) -> String {
	match ui_language {
		"he" => "iw".to_string(),
		other => other.to_string(),
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SharedFilters {
	pub region_code: Option<String>,
	pub region_sanitized: bool,
	pub canonical_city: Option<&'static str>,
	pub price_intent: PriceIntent,
	pub open_now_requested: bool,
	pub ui_language: String,
	pub provider_language: String,
	pub disclaimers: CategoryDisclaimers,
}

/// Builds the shared filter bundle from a validated intent. Region
/// sanitization only fires a log when a non-null candidate was actually
/// dropped — an intent that never proposed a region isn't worth a
/// warning. An absent or dropped region candidate falls back to
/// `DEFAULT_REGION_CODE`; there's no device-reported region to consult
/// yet at this layer.
pub fn resolve_filters(intent: &Intent) -> SharedFilters {
	let (sanitized, region_sanitized) = sanitize_region(intent.region_candidate.as_deref());
	if region_sanitized {
		tracing::warn!(target: "shared_filters", candidate = ?intent.region_candidate, "region_sanitized");
	}
	let region_code = Some(sanitized.unwrap_or_else(|| DEFAULT_REGION_CODE.to_string()));
	let canonical_city = intent.city_text.as_deref().and_then(city_alias::canonicalize);
	let ui_language = intent.assistant_language.clone();
	let provider_language = provider_language_for(&ui_language);
	SharedFilters {
		region_code,
		region_sanitized,
		canonical_city,
		price_intent: intent.price_intent,
		open_now_requested: intent.open_now_requested,
		ui_language,
		provider_language,
		disclaimers: category_disclaimers(),
	}
}

/// Rough price-level predicate against a provider's 0-4 price level,
/// where the provider didn't return one the place is never excluded —
/// an unpriced place might still satisfy an `Any` search.
pub fn matches_price(price_intent: PriceIntent, provider_price_level: Option<u8>) -> bool {
	let Some(level) = provider_price_level else {
		return true;
	};
	match price_intent {
		PriceIntent::Any => true,
		PriceIntent::Cheap => level <= 1,
		PriceIntent::Mid => (1..=2).contains(&level),
		PriceIntent::Expensive => level >= 3,
	}
}

/// `UNKNOWN` open-now status is never treated as a failed filter — the
/// provider simply didn't supply hours data, which is not the same
/// claim as "closed".
pub fn matches_open_now(open_now_requested: bool, result: &PlaceResult) -> bool {
	if !open_now_requested {
		return true;
	}
	!matches!(result.open_now, OpenNow::False)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::llm::fakes::default_fake_intent;
	use crate::models::request::LatLng;

	fn place_with(open_now: OpenNow) -> PlaceResult {
		PlaceResult {
			id: "p1".to_string(),
			display_name: "Test Place".to_string(),
			formatted_address: "addr".to_string(),
			coordinates: LatLng { lat: 0.0, lng: 0.0 },
			rating: None,
			rating_count: None,
			category: Category::Restaurant,
			open_now,
			group_kind: None,
			distance_meters: None,
		}
	}

	#[test]
	fn unrecognized_but_shape_valid_region_is_dropped() {
		let (code, changed) = sanitize_region(Some("ZZ"));
		assert_eq!(code, None);
		assert!(changed);
	}

	#[test]
	fn absent_region_is_not_flagged_as_sanitized() {
		let (code, changed) = sanitize_region(None);
		assert_eq!(code, None);
		assert!(!changed);
	}

	#[test]
	fn recognized_region_passes_through_unchanged() {
		let (code, changed) = sanitize_region(Some("IL"));
		assert_eq!(code.as_deref(), Some("IL"));
		assert!(!changed);
	}

	#[test]
	fn open_now_unknown_is_not_excluded_when_requested() {
		assert!(matches_open_now(true, &place_with(OpenNow::Unknown)));
	}

	#[test]
	fn open_now_false_is_excluded_when_requested() {
		assert!(!matches_open_now(true, &place_with(OpenNow::False)));
	}

	#[test]
	fn resolve_filters_canonicalizes_city_from_intent() {
		let mut intent = default_fake_intent();
		intent.city_text = Some("tel aviv".to_string());
		let filters = resolve_filters(&intent);
		assert_eq!(filters.canonical_city, Some("tel_aviv"));
	}

	#[test]
	fn resolve_filters_defaults_region_when_intent_has_none() {
		let mut intent = default_fake_intent();
		intent.region_candidate = None;
		let filters = resolve_filters(&intent);
		assert_eq!(filters.region_code.as_deref(), Some(DEFAULT_REGION_CODE));
		assert!(!filters.region_sanitized);
	}

	#[test]
	fn resolve_filters_defaults_region_when_candidate_is_dropped() {
		let mut intent = default_fake_intent();
		intent.region_candidate = Some("ZZ".to_string());
		let filters = resolve_filters(&intent);
		assert_eq!(filters.region_code.as_deref(), Some(DEFAULT_REGION_CODE));
		assert!(filters.region_sanitized);
	}

	#[test]
	fn hebrew_ui_language_maps_to_legacy_provider_code() {
		assert_eq!(provider_language_for("he"), "iw");
	}

	#[test]
	fn non_hebrew_ui_language_passes_through() {
		assert_eq!(provider_language_for("en"), "en");
	}

	#[test]
	fn resolve_filters_derives_provider_language_from_assistant_language() {
		let mut intent = default_fake_intent();
		intent.assistant_language = "he".to_string();
		let filters = resolve_filters(&intent);
		assert_eq!(filters.ui_language, "he");
		assert_eq!(filters.provider_language, "iw");
	}

	#[test]
	fn bakery_and_cafe_get_the_hours_disclaimer_restaurant_does_not() {
		let disclaimers = category_disclaimers();
		assert!(disclaimer_applies(&disclaimers, Category::Bakery));
		assert!(disclaimer_applies(&disclaimers, Category::Cafe));
		assert!(!disclaimer_applies(&disclaimers, Category::Restaurant));
	}
}
