/*
 * src/orchestrator.rs
 *
 * File for the Pipeline Orchestrator (C12)
 *
 * Purpose:
 *   Threads a submitted request through every stage above it
 *   (C1–C11), coordinating the parallel fan-out, publishing progress
 *   milestones, and handling idempotency, cancellation, and shutdown.
 *   This is the one module that is allowed to know about every other
 *   stage; nothing downstream of here imports `orchestrator`.
 *
 * Include:
 *   SessionStore      - per-session mutable state, keyed by session id
 *   AppState          - every collaborator the pipeline depends on
 *   SubmitOutcome     - what `submit()` hands back to the HTTP layer
 *   Orchestrator      - `submit()`, `shutdown()`
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::json;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache_guard::{CacheGuard, CacheOutcome};
use crate::city_alias;
use crate::config::Settings;
use crate::error::ErrorKind;
use crate::gate::{self, GateReason, Language};
use crate::global::progress;
use crate::grouping::{self};
use crate::intent_stage::run_intent_stage;
use crate::jobstore::{JobStore, NewJob};
use crate::llm::{ChatBackLlmClient, IntentLlmClient, RouteLlmClient};
use crate::models::intent::{Intent, Route};
use crate::models::plan::ProviderPlan;
use crate::models::request::{LatLng, SearchRequest};
use crate::models::response_plan::Scenario;
use crate::models::result::PlaceResult;
use crate::models::session::SessionContext;
use crate::provider::{self, GeocodeClient, PlacesProviderClient};
use crate::resolvers::{self, GeocodeLookup, GpsContext};
use crate::route_mappers::map_route;
use crate::rse::{self, RseInput};
use crate::shared_filters;
use crate::{chatback, i18n};

const INTENT_TIMEOUT: Duration = Duration::from_secs(3);
const MAPPER_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-session conversation memory, keyed by session id. Mutable but
/// never shared across sessions — each entry is only ever touched by
/// requests carrying that session's id.
pub struct SessionStore {
	sessions: DashMap<String, SessionContext>,
}

impl SessionStore {
	pub fn new() -> Arc<Self> {
		Arc::new(Self { sessions: DashMap::new() })
	}

	/// Runs `f` against the session's state, creating an empty context
	/// on first use.
	pub fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&mut SessionContext) -> T) -> T {
		let mut entry = self.sessions.entry(session_id.to_string()).or_default();
		f(&mut entry)
	}

	/// A snapshot of the session's geocode-validated cities, read
	/// before any `.await` so the lookup never holds the map's lock
	/// across a suspension point.
	pub fn validated_cities_snapshot(&self, session_id: &str) -> HashMap<String, LatLng> {
		self.sessions.get(session_id).map(|s| s.validated_cities.clone()).unwrap_or_default()
	}

	pub fn record_validated_city(&self, session_id: &str, key: String, coords: LatLng) {
		self.with_session(session_id, |ctx| {
			ctx.validated_cities.insert(key, coords);
		});
	}

	/// Clearing a session empties conversation history and current
	/// intent; `validated_cities` is intentionally preserved.
	pub fn reset(&self, session_id: &str) {
		self.with_session(session_id, |ctx| ctx.reset());
	}
}

/// Every collaborator the pipeline depends on. Cloned cheaply (all
/// fields are `Arc`s) into each spawned request task.
#[derive(Clone)]
pub struct AppState {
	pub job_store: Arc<dyn JobStore>,
	pub cache_guard: Arc<CacheGuard>,
	pub settings: Arc<Settings>,
	pub intent_llm: Arc<dyn IntentLlmClient>,
	pub route_llm: Arc<dyn RouteLlmClient>,
	pub chatback_llm: Option<Arc<dyn ChatBackLlmClient>>,
	pub places: Arc<dyn PlacesProviderClient>,
	pub geocode: Arc<dyn GeocodeClient>,
	pub sessions: Arc<SessionStore>,
}

pub struct SubmitOutcome {
	pub request_id: String,
	pub deduplicated: bool,
}

pub struct Orchestrator {
	state: AppState,
	cancellations: DashMap<String, CancellationToken>,
}

fn normalize_query(text: &str) -> String {
	text.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn location_hash(location: Option<LatLng>) -> String {
	match location {
		Some(l) => format!("{:.3}:{:.3}", l.lat, l.lng),
		None => "none".to_string(),
	}
}

/// `GeocodeLookup` adapter over the request-scoped collaborator,
/// consulting a pre-fetched session snapshot before falling through to
/// a real geocode call — and never raising, per the resolver contract.
struct SessionAwareGeocoder<'a> {
	client: &'a dyn GeocodeClient,
	snapshot: &'a HashMap<String, LatLng>,
	region_code: Option<&'a str>,
}

#[async_trait::async_trait]
impl<'a> GeocodeLookup for SessionAwareGeocoder<'a> {
	async fn geocode(&self, text: &str) -> Option<LatLng> {
		let key = text.trim().to_lowercase();
		if let Some(coords) = self.snapshot.get(&key) {
			return Some(*coords);
		}
		self.client.geocode(text, self.region_code).await.ok().flatten()
	}
}

fn assistant_language_for(language: Language) -> &'static str {
	match language {
		Language::He => "he",
		Language::Ar => "ar",
		Language::Ru => "ru",
		Language::Fr => "fr",
		Language::Es => "es",
		Language::En | Language::Other | Language::Unknown => "en",
	}
}

/// The two ambiguous single tokens ("parking" / "חניה") that get a
/// bespoke clarification choice set. Kept narrow and explicit rather
/// than a general ambiguity model — anything else that fails the
/// deterministic gate gets the generic clarify template instead.
fn ambiguous_token_choices(text: &str, language: Language) -> Option<Vec<(&'static str, &'static str)>> {
	let trimmed = text.trim();
	match language {
		Language::He if trimmed == "חניה" => {
			Some(vec![("🅿️", "כן, עם חניה"), ("🔍", "לא, זה שם המסעדה")])
		}
		Language::En if trimmed.eq_ignore_ascii_case("parking") => {
			Some(vec![("🅿️", "Yes, with parking"), ("🔍", "No, that's the restaurant's name")])
		}
		_ => None,
	}
}

struct ClarifyOutcome {
	scenario: Scenario,
	message: String,
	actions: Vec<serde_json::Value>,
	failure_reason: Option<&'static str>,
}

fn deterministic_clarify(scenario: Scenario, assistant_language: &str, message_override: Option<String>) -> ClarifyOutcome {
	let plan = rse::build_plan(RseInput {
		query_present: scenario != Scenario::MissingQuery,
		location_present: scenario != Scenario::MissingLocation,
		route_is_clarify: true,
		confidence: 1.0,
		results: vec![],
		closing_soon: 0,
		nearby_city: None,
		nearby_is_different_city: false,
		nearby_distance_meters: None,
		prior_unsuccessful_streak: 0,
	});
	let message = message_override.unwrap_or_else(|| i18n::template(&plan, assistant_language));
	ClarifyOutcome { scenario: plan.scenario, message, actions: vec![], failure_reason: None }
}

impl Orchestrator {
	pub fn new(state: AppState) -> Arc<Self> {
		Arc::new(Self { state, cancellations: DashMap::new() })
	}

	/// Cooperative cancellation: a caller (e.g. a DELETE endpoint beyond
	/// the submit/poll/health surfaces) can look up the in-flight token
	/// by request id.
	pub fn cancel(&self, request_id: &str) {
		if let Some(token) = self.cancellations.get(request_id) {
			token.cancel();
		}
	}

	/// On shutdown, enumerate RUNNING jobs and mark the stale ones
	/// `DONE_STOPPED` — a job whose heartbeat is younger than
	/// `staleRunningThresholdSeconds` is still making progress and is
	/// left to finish on its own during the grace window; cancellation
	/// only targets jobs the staleness sweep actually stops. Waits up to
	/// `grace` for the drain either way.
	pub async fn shutdown(&self, grace: Duration) {
		let running = self.state.job_store.get_running_jobs().await;
		let threshold = self.state.settings.stale_running_threshold_seconds;
		let now = chrono::Utc::now().timestamp();
		let stale: Vec<_> = running.into_iter().filter(|job| now - job.updated_at >= threshold).collect();
		info!(target: "orchestrator", count = stale.len(), "shutdown: stopping stale running jobs");
		for job in &stale {
			self.cancel(&job.request_id);
			self.state.job_store.set_status(&job.request_id, crate::models::job::JobStatus::DoneStopped, Some(100)).await;
		}
		sleep(grace).await;
	}

	/// Computes idempotency, creates (or reuses) the job, and spawns
	/// the pipeline task. Returns immediately — callers poll
	/// `GET /search/{requestId}/result` for the terminal outcome.
	pub async fn submit(self: &Arc<Self>, mut request: SearchRequest, session_id: String) -> SubmitOutcome {
		if request.clear_context {
			self.state.sessions.reset(&session_id);
		}

		let idempotency_key = request.idempotency_key.clone().unwrap_or_else(|| {
			format!(
				"auto:{session_id}:{}:async:{}",
				normalize_query(&request.query),
				location_hash(request.user_location)
			)
		});

		if let Some(existing) =
			self.state.job_store.find_by_idempotency_key(&idempotency_key, self.state.settings.idempotency_fresh_window_ms).await
		{
			return SubmitOutcome { request_id: existing.request_id, deduplicated: true };
		}

		let request_id = request.request_id.take().unwrap_or_else(|| format!("req_{}", uuid::Uuid::new_v4()));
		self.state
			.job_store
			.create(
				&request_id,
				NewJob {
					session_id: Some(session_id.clone()),
					query: request.query.clone(),
					owner_user_id: None,
					owner_session_id: Some(session_id.clone()),
					idempotency_key: Some(idempotency_key),
				},
			)
			.await;
		self.state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::CREATED)).await;
		info!(target: "orchestrator", request_id = %request_id, "job_created");

		let token = CancellationToken::new();
		self.cancellations.insert(request_id.clone(), token.clone());

		let state = self.state.clone();
		let req_id = request_id.clone();
		tokio::spawn(async move {
			tokio::select! {
				_ = token.cancelled() => {
					warn!(target: "orchestrator", request_id = %req_id, "pipeline cancelled");
					state.job_store.set_status(&req_id, crate::models::job::JobStatus::DoneStopped, Some(100)).await;
				}
				_ = run_pipeline(state.clone(), req_id.clone(), request, session_id) => {}
			}
		});

		SubmitOutcome { request_id, deduplicated: false }
	}
}

/// Runs a heartbeat ticker alongside `fut` at the configured interval,
/// stopping as soon as `fut` resolves. `update_heartbeat` itself is a
/// no-op once the job reaches a terminal status, so an overshoot tick
/// after completion is harmless.
async fn with_heartbeat<T>(state: &AppState, request_id: &str, fut: impl std::future::Future<Output = T>) -> T {
	let interval = state.settings.heartbeat_interval();
	let job_store = state.job_store.clone();
	let id = request_id.to_string();
	let heartbeat = tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.tick().await;
		loop {
			ticker.tick().await;
			job_store.update_heartbeat(&id).await;
		}
	});
	let result = fut.await;
	heartbeat.abort();
	result
}

async fn finalize_clarify(
	state: &AppState,
	request_id: &str,
	trace_id: &str,
	outcome: ClarifyOutcome,
) {
	let body = json!({
		"requestId": request_id,
		"results": [],
		"meta": {
			"scenario": format!("{:?}", outcome.scenario),
			"traceId": trace_id,
			"failureReason": outcome.failure_reason,
		},
		"assist": {
			"message": outcome.message,
			"mode": "RECOVERY",
			"actions": outcome.actions,
		},
	});
	state.job_store.set_result(request_id, body).await;
	state.job_store.set_status(request_id, crate::models::job::JobStatus::DoneClarify, Some(100)).await;
}

async fn run_pipeline(state: AppState, request_id: String, request: SearchRequest, session_id: String) {
	let trace_id = format!("trace_{}", uuid::Uuid::new_v4());

	// C4: Gate Stage. Purely deterministic fast path; a query failing
	// it never reaches an LLM call.
	let gate_result = gate::run_gate(&request.query);
	state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::GATE)).await;

	if !gate_result.passed {
		let assistant_language = assistant_language_for(gate_result.language);
		let outcome = match gate_result.reason {
			GateReason::EmptyText => deterministic_clarify(Scenario::MissingQuery, assistant_language, None),
			GateReason::NonFoodQuery => {
				if let Some(choices) = ambiguous_token_choices(&request.query, gate_result.language) {
					let actions: Vec<serde_json::Value> =
						choices.into_iter().map(|(emoji, label)| json!({"emoji": emoji, "label": label})).collect();
					let message = match assistant_language {
						"he" => "האם אתה מחפש חניה או שזה שם של מסעדה?".to_string(),
						_ => "Are you looking for parking, or is that a restaurant name?".to_string(),
					};
					ClarifyOutcome { scenario: Scenario::ClarifyNeeded, message, actions, failure_reason: None }
				} else {
					deterministic_clarify(Scenario::ClarifyNeeded, assistant_language, None)
				}
			}
			GateReason::Valid => unreachable!("passed gate can't carry Valid as a failure reason"),
		};
		finalize_clarify(&state, &request_id, &trace_id, outcome).await;
		return;
	}

	// C5: Intent Stage.
	let mut intent = run_intent_stage(
		state.intent_llm.as_ref(),
		&request.query,
		INTENT_TIMEOUT,
		request.user_location.is_some(),
	)
	.await;
	intent.user_location = request.user_location;
	state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::INTENT)).await;

	// Early TEXTSEARCH location guard (§4.12.3): never contact the
	// provider for a text search with no location signal at all.
	if intent.route == Route::Textsearch
		&& intent.user_location.is_none()
		&& intent.city_text.as_deref().map(str::trim).unwrap_or("").is_empty()
	{
		let outcome = ClarifyOutcome {
			scenario: Scenario::MissingLocation,
			message: i18n::template(
				&rse::build_plan(RseInput {
					query_present: true,
					location_present: false,
					route_is_clarify: true,
					confidence: intent.confidence,
					results: vec![],
					closing_soon: 0,
					nearby_city: None,
					nearby_is_different_city: false,
					nearby_distance_meters: None,
					prior_unsuccessful_streak: 0,
				}),
				&intent.assistant_language,
			),
			actions: vec![],
			failure_reason: Some("LOCATION_REQUIRED"),
		};
		finalize_clarify(&state, &request_id, &trace_id, outcome).await;
		return;
	}

	if intent.route == Route::Clarify {
		let scenario = if intent.reason.as_deref() == Some("missing_user_location") {
			Scenario::MissingLocation
		} else {
			Scenario::ClarifyNeeded
		};
		let outcome = deterministic_clarify(scenario, &intent.assistant_language, None);
		finalize_clarify(&state, &request_id, &trace_id, outcome).await;
		return;
	}

	// Parallel fan-out: C8 (shared filters, synchronous/cheap) runs
	// inline; C6 (route mapping) runs concurrently with it via
	// `tokio::join!` since both only need the intent.
	let filters = shared_filters::resolve_filters(&intent);
	let plan_result = map_route(state.route_llm.as_ref(), &intent, &filters, MAPPER_TIMEOUT).await;

	let plan = match plan_result {
		Ok(plan) => plan,
		Err(_) => {
			// NEARBY mapping hard-failed without a user location —
			// degrade the whole pipeline to CLARIFY rather than raise.
			let outcome = deterministic_clarify(Scenario::MissingLocation, &intent.assistant_language, None);
			finalize_clarify(&state, &request_id, &trace_id, outcome).await;
			return;
		}
	};

	let street_anchor = grouping::is_street_anchor(&intent.location_anchor);

	let fetch_outcome = with_heartbeat(&state, &request_id, async {
		fetch_and_group(&state, &session_id, &intent, &plan, street_anchor, &filters).await
	})
	.await;

	state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::PROVIDER_FETCH)).await;

	let (mut flat_results, groups, street_grouping_enabled) = match fetch_outcome {
		Ok(v) => v,
		Err(_) => {
			state
				.job_store
				.set_error(&request_id, "SEARCH_FAILED", "provider fetch failed", ErrorKind::UpstreamError)
				.await;
			return;
		}
	};

	let before = flat_results.len();
	flat_results.retain(|r| {
		shared_filters::matches_open_now(filters.open_now_requested, r)
	});
	let dropped_count = before - flat_results.len();

	// When the primary area came up completely empty, one relaxed
	// lookup tells us whether a different known city actually has
	// matches worth mentioning, rather than leaving `ZeroDifferentCity`
	// permanently unreachable.
	let (nearby_is_different_city, different_city_name, nearby_distance_meters) =
		if flat_results.is_empty() && !street_grouping_enabled {
			resolve_different_city_fallback(&state, &intent, &plan).await
		} else {
			(false, None, None)
		};

	state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::POST_CONSTRAINTS)).await;

	// Cache the raw fetch for soft-filter requery, under the owning
	// session — the getter enforces ownership on read.
	state
		.job_store
		.set_candidate_pool(
			&request_id,
			crate::models::job::CandidatePool {
				candidates: flat_results.clone(),
				search_context: json!({"route": plan.kind_tag()}),
				fetched_at: chrono::Utc::now().timestamp(),
				route: plan.kind_tag().to_string(),
			},
		)
		.await;

	// C10: classify and build the structured response plan.
	let prior_unsuccessful_streak = state.sessions.with_session(&session_id, |ctx| {
		ctx.chat_back_memory.scenario_counts.get(&Scenario::ZeroNearbyExists).copied().unwrap_or(0)
			+ ctx.chat_back_memory.scenario_counts.get(&Scenario::ZeroDifferentCity).copied().unwrap_or(0)
			+ ctx.chat_back_memory.scenario_counts.get(&Scenario::ManyAllClosed).copied().unwrap_or(0)
			+ ctx.chat_back_memory.scenario_counts.get(&Scenario::FewAllClosed).copied().unwrap_or(0)
	});

	let plan_input = RseInput {
		query_present: true,
		location_present: true,
		route_is_clarify: false,
		confidence: intent.confidence,
		results: flat_results.clone(),
		closing_soon: 0,
		nearby_city: if nearby_is_different_city { different_city_name } else { filters.canonical_city.map(str::to_string) },
		nearby_is_different_city,
		nearby_distance_meters,
		prior_unsuccessful_streak,
	};
	let mut response_plan = rse::build_plan(plan_input);
	response_plan.filters.dropped_count = dropped_count;

	state.job_store.set_status(&request_id, crate::models::job::JobStatus::Running, Some(progress::RANKING)).await;

	// C11: ChatBack Generator. The dashmap guard can't be held across an
	// `.await`, so the memory is cloned out, mutated by `generate`, and
	// written back once the message is final.
	let mut memory = state.sessions.with_session(&session_id, |ctx| ctx.chat_back_memory.clone());
	let assistant_message = chatback::generate(
		state.chatback_llm.as_deref(),
		&response_plan,
		&intent.assistant_language,
		&mut memory,
	)
	.await;
	state.sessions.with_session(&session_id, |ctx| {
		ctx.chat_back_memory = memory;
		ctx.push_turn(crate::models::session::ConversationTurn {
			query: request.query.clone(),
			assistant_message: assistant_message.clone(),
			timestamp: chrono::Utc::now().timestamp(),
		});
		ctx.current_intent = Some(intent.clone());
	});

	let body = json!({
		"requestId": request_id,
		"results": flat_results,
		"groups": groups,
		"meta": {
			"route": format!("{:?}", intent.route),
			"scenario": format!("{:?}", response_plan.scenario),
			"traceId": trace_id,
			"streetGrouping": { "enabled": street_grouping_enabled },
		},
		"assist": {
			"message": assistant_message,
			"suggestedActions": response_plan.suggested_actions,
		},
	});

	state.job_store.set_result(&request_id, body).await;
	let terminal_status = if response_plan.scenario == Scenario::ClarifyNeeded {
		crate::models::job::JobStatus::DoneClarify
	} else {
		crate::models::job::JobStatus::DoneSuccess
	};
	state.job_store.set_status(&request_id, terminal_status, Some(100)).await;
}

/// Fires one relaxed, unbiased text-search query (food anchor only, no
/// city text or bias) to check whether the provider has anything at all
/// outside the requested city. Only called after the primary fetch came
/// up completely empty for a city-anchored text search — never for
/// NEARBY/LANDMARK routes or a street-grouped fetch, where "a different
/// city" isn't a meaningful fallback. Errors here are swallowed: a
/// failed exploratory lookup just leaves the zero-result scenario as a
/// same-area miss rather than escalating to a request failure.
async fn resolve_different_city_fallback(
	state: &AppState,
	intent: &Intent,
	plan: &ProviderPlan,
) -> (bool, Option<String>, Option<f64>) {
	let requested_city = match intent.city_text.as_deref() {
		Some(c) if !c.trim().is_empty() => c,
		_ => return (false, None, None),
	};
	let ProviderPlan::TextSearch { provider_language, region_code, cuisine_key, .. } = plan else {
		return (false, None, None);
	};
	let relaxed = ProviderPlan::TextSearch {
		text_query: intent.food_anchor.kind.clone(),
		provider_language: provider_language.clone(),
		region_code: region_code.clone(),
		bias: None,
		city_text: None,
		cuisine_key: cuisine_key.clone(),
		strictness: crate::models::plan::Strictness::RelaxIfEmpty,
	};
	let fallback_results = match provider::fetch_results(state.places.as_ref(), &relaxed).await {
		Ok(r) => r,
		Err(_) => return (false, None, None),
	};
	for result in &fallback_results {
		let Some(found_city) = city_alias::find_in_text(&result.formatted_address) else { continue };
		if city_alias::same_city(requested_city, found_city) == city_alias::CityMatch::Different {
			let distance = intent.user_location.map(|origin| crate::models::result::haversine_meters(origin, result.coordinates));
			return (true, Some(city_alias::display_name(found_city)), distance);
		}
	}
	(false, None, None)
}

/// Resolves a center when one is needed (street-grouping or a Nearby
/// plan without an already-known center), executes either the
/// dual-radius grouped fetch or a single plan fetch through the cache
/// guard, and reports whether street-grouping actually fired.
async fn fetch_and_group(
	state: &AppState,
	session_id: &str,
	intent: &Intent,
	plan: &ProviderPlan,
	street_anchor: bool,
	filters: &shared_filters::SharedFilters,
) -> Result<(Vec<PlaceResult>, Vec<crate::models::result::ResultGroup>, bool), provider::ProviderError> {
	if street_anchor {
		let snapshot = state.sessions.validated_cities_snapshot(session_id);
		let geocoder = SessionAwareGeocoder { client: state.geocode.as_ref(), snapshot: &snapshot, region_code: filters.region_code.as_deref() };
		let center_result = resolvers::resolve_center(
			intent,
			&GpsContext { gps_coords: intent.user_location },
			&geocoder,
		)
		.await;

		if let Some(center) = center_result.center {
			if center_result.source == resolvers::CenterSource::Geocoded {
				let key = intent.location_anchor.text.trim().to_lowercase();
				if !key.is_empty() {
					state.sessions.record_validated_city(session_id, key, center);
				}
			}
			let keyword = if intent.food_anchor.present { Some(intent.food_anchor.kind.clone()) } else { None };
			let (flat, groups) = grouping::fetch_grouped(
				state.places.as_ref(),
				center,
				keyword,
				intent.language.clone(),
				state.settings.street_search_exact_radius_meters,
				state.settings.street_search_nearby_radius_meters,
			)
			.await?;
			let groups = apply_group_thresholds(groups, state);
			return Ok((flat, groups, true));
		}
		// Couldn't resolve a center for the street anchor — fall
		// through to a normal single-plan fetch instead of failing
		// the whole request over a grouping nicety.
	}

	match state.cache_guard.check(plan).await {
		CacheOutcome::Hit(results) => Ok((results, vec![], false)),
		CacheOutcome::Miss => {
			let results = provider::fetch_results(state.places.as_ref(), plan).await?;
			state.cache_guard.store(plan, results.clone()).await;
			Ok((results, vec![], false))
		}
	}
}

fn apply_group_thresholds(
	groups: Vec<crate::models::result::ResultGroup>,
	state: &AppState,
) -> Vec<crate::models::result::ResultGroup> {
	let min_exact = state.settings.street_search_min_exact_results;
	let min_nearby = state.settings.street_search_min_nearby_results;
	let exact_count = groups.iter().find(|g| g.kind == crate::models::result::GroupKind::Exact).map(|g| g.results.len()).unwrap_or(0);

	groups
		.into_iter()
		.filter(|g| {
			if g.results.is_empty() {
				return false;
			}
			if g.kind == crate::models::result::GroupKind::Nearby {
				return exact_count < min_exact || g.results.len() >= min_nearby;
			}
			true
		})
		.collect()
}
