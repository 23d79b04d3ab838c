/*
 * src/llm/mod.rs
 *
 * File for LLM collaborator boundaries
 *
 * Purpose:
 *   The core never issues an HTTP call to a language model itself —
 *   every stage that needs natural-language understanding goes through
 *   one of these narrow, typed traits. Production adapters would wrap
 *   `langchain_rust::chain::Chain`, gated by the `DEPLOY_LLM` env var
 *   the same way chat completion is gated elsewhere in this codebase;
 *   tests exercise deterministic fakes instead.
 *
 * Include:
 *   schema          - versioned/hashed JSON schema self-check
 *   LlmError        - closed failure set for a collaborator call
 *   IntentLlmClient - C5's collaborator
 *   RouteLlmClient  - C6's collaborator (one call per route)
 *   ChatBackLlmClient - C11's collaborator
 *   fakes           - deterministic test doubles
 *
 * The ambiguous-case gate collaborator (`DeepGateClient`) lives in
 * `gate.rs` instead of here, next to the routing logic it feeds.
 */

pub mod schema;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::intent::Intent;
use crate::models::plan::ProviderPlan;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LlmError {
	#[error("llm call timed out")]
	Timeout,
	#[error("llm call aborted")]
	Aborted,
	#[error("llm output failed schema validation: {0}")]
	SchemaViolation(String),
	#[error("llm transport error: {0}")]
	Transport(String),
}

#[async_trait]
pub trait IntentLlmClient: Send + Sync {
	/// Infers an `Intent` from raw query text. Callers apply
	/// `Intent::normalize()` themselves; this only returns what the
	/// model produced (schema-validated, not yet invariant-enforced).
	/// `user_location` on the returned intent is always `None` — it is
	/// threaded through from the request by the caller, never invented
	/// by the model.
	async fn infer_intent(&self, raw_query: &str, timeout: Duration) -> Result<Intent, LlmError>;
}

#[derive(Debug, Clone)]
pub struct RouteMapperInput {
	pub intent: Intent,
	pub city_text: Option<String>,
	pub cuisine_key: Option<String>,
}

#[async_trait]
pub trait RouteLlmClient: Send + Sync {
	async fn map_textsearch(&self, input: &RouteMapperInput, timeout: Duration) -> Result<ProviderPlan, LlmError>;
	async fn map_nearby(&self, input: &RouteMapperInput, timeout: Duration) -> Result<ProviderPlan, LlmError>;
	async fn map_landmark(&self, input: &RouteMapperInput, timeout: Duration) -> Result<ProviderPlan, LlmError>;
}

#[async_trait]
pub trait ChatBackLlmClient: Send + Sync {
	/// Generates a single assistant-facing message in `NORMAL` or
	/// `RECOVERY` mode. The caller is responsible for scanning the
	/// result for forbidden phrases and retrying.
	async fn generate(&self, system_prompt: &str, user_context: &str, mode: &str) -> Result<String, LlmError>;
}

pub mod fakes {
	use super::*;
	use crate::models::intent::{FoodAnchor, LocationAnchor, PriceIntent, Route};

	pub struct FakeIntentLlmClient {
		pub response: Intent,
	}

	#[async_trait]
	impl IntentLlmClient for FakeIntentLlmClient {
		async fn infer_intent(&self, _raw_query: &str, _timeout: Duration) -> Result<Intent, LlmError> {
			Ok(self.response.clone())
		}
	}

	/// A deterministic stand-in useful when a test only needs *a* valid
	/// intent, not a specific one.
	pub fn default_fake_intent() -> Intent {
		Intent {
			route: Route::Textsearch,
			food_anchor: FoodAnchor { kind: "restaurant".into(), present: true },
			location_anchor: LocationAnchor::default(),
			near_me: false,
			explicit_distance: Default::default(),
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
}

/// Deterministic stand-ins wired in `main.rs` when `DEPLOY_LLM` isn't
/// `"1"` — or, for now, always, since a structured-output adapter over
/// `langchain_rust` hasn't been built yet. Every call fails immediately,
/// handing control to each stage's own deterministic fallback
/// (`intent_stage::deterministic_fallback`, `route_mappers::build_*_fallback`),
/// so the pipeline still returns a correct, if less nuanced, answer.
pub mod null {
	use super::*;

	pub struct NullIntentLlmClient;

	#[async_trait]
	impl IntentLlmClient for NullIntentLlmClient {
		async fn infer_intent(&self, _raw_query: &str, _timeout: Duration) -> Result<Intent, LlmError> {
			Err(LlmError::Aborted)
		}
	}

	pub struct NullRouteLlmClient;

	#[async_trait]
	impl RouteLlmClient for NullRouteLlmClient {
		async fn map_textsearch(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Aborted)
		}
		async fn map_nearby(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Aborted)
		}
		async fn map_landmark(&self, _input: &RouteMapperInput, _timeout: Duration) -> Result<ProviderPlan, LlmError> {
			Err(LlmError::Aborted)
		}
	}
}
