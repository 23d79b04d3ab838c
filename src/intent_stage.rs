/*
 * src/intent_stage.rs
 *
 * File for the Intent Stage (C5)
 *
 * Purpose:
 *   Calls the intent LLM collaborator with a versioned/hashed schema,
 *   applies post-validation coercions the schema itself can't express,
 *   and falls back to a deterministic intent when the collaborator
 *   fails twice. The fallback is never treated as a success — callers
 *   that care can inspect `Intent.reason == Some("fallback")`.
 *
 * Include:
 *   INTENT_SCHEMA     - the versioned/hashed schema for this stage
 *   run_intent_stage  - calls the LLM, retries once, applies coercions
 */

use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::time::sleep;
use tracing::warn;

use crate::gate::{Language, detect_language};
use crate::llm::{IntentLlmClient, LlmError};
use crate::models::intent::{ExplicitDistance, FoodAnchor, Intent, LocationAnchor, PriceIntent, Route};

pub static INTENT_SCHEMA: Lazy<crate::llm::schema::SchemaDef> = Lazy::new(|| {
	crate::llm::schema::build_schema(
		"intent_v1",
		1,
		vec![
			"route",
			"foodAnchor",
			"locationAnchor",
			"nearMe",
			"explicitDistance",
			"language",
			"languageConfidence",
			"assistantLanguage",
			"regionCandidate",
			"regionConfidence",
			"regionReason",
			"cityText",
			"landmarkText",
			"radiusMeters",
			"openNowRequested",
			"priceIntent",
			"distanceIntent",
			"qualityIntent",
			"occasion",
			"cuisineKey",
			"confidence",
			"reason",
		],
		false,
	)
});

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

fn deterministic_fallback(raw_query: &str) -> Intent {
	let assistant_language = if detect_language(raw_query) == Language::He { "he" } else { "en" };
	Intent {
		route: Route::Textsearch,
		food_anchor: FoodAnchor { kind: String::new(), present: false },
		location_anchor: LocationAnchor::default(),
		near_me: false,
		explicit_distance: ExplicitDistance::default(),
		language: assistant_language.to_string(),
		language_confidence: 0.0,
		assistant_language: assistant_language.to_string(),
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
		confidence: 0.3,
		reason: Some("fallback".to_string()),
		user_location: None,
	}
	.normalize()
}

/// `user_location_present` reflects the raw request, not anything the
/// LLM could see — it's used to enforce the `NEARBY` hard requirement
/// below.
pub async fn run_intent_stage(
	client: &dyn IntentLlmClient,
	raw_query: &str,
	timeout: Duration,
	user_location_present: bool,
) -> Intent {
	let mut attempt = client.infer_intent(raw_query, timeout).await;
	if matches!(attempt, Err(LlmError::Timeout) | Err(LlmError::Aborted)) {
		sleep(RETRY_BACKOFF).await;
		attempt = client.infer_intent(raw_query, timeout).await;
	}

	let mut intent = match attempt {
		Ok(intent) => intent.normalize(),
		Err(e) => {
			warn!(target: "intent_stage", error = %e, "intent stage exhausted retries, using deterministic fallback");
			return deterministic_fallback(raw_query);
		}
	};

	if intent.route == Route::Nearby && !user_location_present {
		intent.route = Route::Clarify;
		intent.reason = Some("missing_user_location".to_string());
		intent.confidence = intent.confidence.min(0.8);
	}

	intent
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::llm::fakes::{FakeIntentLlmClient, default_fake_intent};

	#[tokio::test]
	async fn nearby_without_user_location_coerces_to_clarify() {
		let mut response = default_fake_intent();
		response.route = Route::Nearby;
		response.near_me = true;
		response.confidence = 0.95;
		let client = FakeIntentLlmClient { response };

		let intent = run_intent_stage(&client, "burger near me", Duration::from_secs(1), false).await;
		assert_eq!(intent.route, Route::Clarify);
		assert_eq!(intent.reason.as_deref(), Some("missing_user_location"));
		assert!(intent.confidence <= 0.8);
	}

	#[tokio::test]
	async fn nearby_with_user_location_passes_through() {
		let mut response = default_fake_intent();
		response.route = Route::Nearby;
		response.near_me = true;
		let client = FakeIntentLlmClient { response };

		let intent = run_intent_stage(&client, "burger near me", Duration::from_secs(1), true).await;
		assert_eq!(intent.route, Route::Nearby);
	}

	struct AlwaysTimesOut;

	#[async_trait::async_trait]
	impl IntentLlmClient for AlwaysTimesOut {
		async fn infer_intent(&self, _raw_query: &str, _timeout: Duration) -> Result<Intent, LlmError> {
			Err(LlmError::Timeout)
		}
	}

	#[tokio::test]
	async fn repeated_timeout_yields_fallback() {
		let intent = run_intent_stage(&AlwaysTimesOut, "פיצה בתל אביב", Duration::from_millis(10), false).await;
		assert_eq!(intent.route, Route::Textsearch);
		assert_eq!(intent.reason.as_deref(), Some("fallback"));
		assert_eq!(intent.assistant_language, "he");
	}
}
