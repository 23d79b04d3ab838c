/*
 * tests/pipeline.rs
 *
 * End-to-end tests for the search pipeline orchestrator
 *
 * Purpose:
 *   Drives `Orchestrator::submit` against fakes for every external
 *   collaborator (LLMs, places provider, geocoder) and polls the job
 *   store for the terminal outcome, the way a real client would poll
 *   `GET /search/{requestId}/result`.
 */

extern crate foodfinder_core as app;

use std::sync::Arc;
use std::time::Duration;

use app::cache_guard::{CacheGuard, InMemoryResultCache};
use app::config::Settings;
use app::jobstore::memory::InMemoryJobStore;
use app::jobstore::JobStore;
use app::llm::fakes::{FakeIntentLlmClient, default_fake_intent};
use app::llm::null::NullRouteLlmClient;
use app::models::intent::{Intent, LocationAnchor, LocationAnchorType};
use app::models::job::JobStatus;
use app::models::request::{LatLng, SearchRequest};
use app::orchestrator::{AppState, Orchestrator, SessionStore};
use app::provider::fakes::{FakeGeocoder, FakePlacesProvider};
use app::provider::{Page, RawPlace};

fn raw(id: &str, open_now: Option<bool>) -> RawPlace {
	raw_at(id, open_now, "123 Main St")
}

fn raw_at(id: &str, open_now: Option<bool>, formatted_address: &str) -> RawPlace {
	RawPlace {
		id: id.to_string(),
		display_name: format!("Place {id}"),
		formatted_address: formatted_address.to_string(),
		coordinates: LatLng::new(32.08, 34.78),
		rating: Some(4.3),
		rating_count: Some(50),
		primary_type: Some("restaurant".to_string()),
		types: vec!["restaurant".to_string()],
		open_now,
	}
}

fn test_state(intent: Intent, pages: Vec<Page>, geocode_response: Option<LatLng>) -> (Arc<Orchestrator>, Arc<InMemoryJobStore>) {
	let job_store = InMemoryJobStore::new();
	let cache = InMemoryResultCache::new(60);
	let cache_guard = Arc::new(CacheGuard::new(cache, Duration::from_millis(500)));

	let state = AppState {
		job_store: job_store.clone(),
		cache_guard,
		settings: Arc::new(Settings::default()),
		intent_llm: Arc::new(FakeIntentLlmClient { response: intent }),
		route_llm: Arc::new(NullRouteLlmClient),
		chatback_llm: None,
		places: Arc::new(FakePlacesProvider { pages: std::sync::Mutex::new(pages) }),
		geocode: Arc::new(FakeGeocoder { response: geocode_response }),
		sessions: SessionStore::new(),
	};
	(Orchestrator::new(state), job_store)
}

/// Polls the job store until the job reaches a terminal status or the
/// attempt budget runs out. The orchestrator's pipeline runs on a
/// spawned task, so this yields repeatedly to let it make progress on
/// the test runtime's scheduler.
async fn await_terminal(job_store: &InMemoryJobStore, request_id: &str) -> app::models::job::Job {
	for _ in 0..200 {
		if let Some(job) = job_store.get_job(request_id).await {
			if job.status.is_terminal() {
				return job;
			}
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	panic!("job {request_id} never reached a terminal status");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn textsearch_with_city_reaches_exact_match() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.city_text = Some("Jerusalem".to_string());
	intent.location_anchor = LocationAnchor { text: "Jerusalem".to_string(), kind: LocationAnchorType::City, present: true };

	let pages = vec![Page { places: vec![raw("a", Some(true)), raw("b", Some(true))], next_page_token: None }];
	let (orchestrator, job_store) = test_state(intent, pages, None);

	let outcome = orchestrator.submit(SearchRequest {
		query: "pizza in jerusalem".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneSuccess);
	let result = job.result.unwrap();
	assert_eq!(result["results"].as_array().unwrap().len(), 2);
	assert_eq!(result["meta"]["scenario"], "ExactMatch");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn street_anchor_triggers_dual_radius_grouping() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.location_anchor =
		LocationAnchor { text: "dizengoff street 50".to_string(), kind: LocationAnchorType::Street, present: true };

	// Two overlapping pages feed the concurrent exact/nearby fetches;
	// "b" appears in both so the combined flat list dedupes it once.
	let pages = vec![
		Page { places: vec![raw("a", Some(true)), raw("b", Some(true))], next_page_token: None },
		Page { places: vec![raw("b", Some(true)), raw("c", Some(true))], next_page_token: None },
	];
	let (orchestrator, job_store) = test_state(intent, pages, Some(LatLng::new(32.08, 34.78)));

	let outcome = orchestrator.submit(SearchRequest {
		query: "pizza on dizengoff street 50".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneSuccess);
	let result = job.result.unwrap();
	assert_eq!(result["results"].as_array().unwrap().len(), 3);
	assert_eq!(result["groups"].as_array().unwrap().len(), 2);
	assert_eq!(result["meta"]["streetGrouping"]["enabled"], true);
	// "a" and "b" both land in the EXACT radius, so the EXACT group is
	// non-empty and this is a real match, not a zero-exact/nearby-only miss.
	assert_eq!(result["meta"]["scenario"], "ExactMatch");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn street_anchor_with_empty_exact_group_is_zero_nearby_exists() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.location_anchor =
		LocationAnchor { text: "dizengoff street 50".to_string(), kind: LocationAnchorType::Street, present: true };

	// The EXACT-radius fetch comes back empty; only the wider NEARBY
	// fetch finds anything, so the flat total (3) must not read as a
	// match — the EXACT group itself is what's empty.
	let pages = vec![
		Page { places: vec![], next_page_token: None },
		Page { places: vec![raw("a", Some(true)), raw("b", Some(true)), raw("c", Some(true))], next_page_token: None },
	];
	let (orchestrator, job_store) = test_state(intent, pages, Some(LatLng::new(32.08, 34.78)));

	let outcome = orchestrator.submit(SearchRequest {
		query: "pizza on dizengoff street 50".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneSuccess);
	let result = job.result.unwrap();
	assert_eq!(result["results"].as_array().unwrap().len(), 3);
	assert_eq!(result["meta"]["scenario"], "ZeroNearbyExists");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ambiguous_single_token_parking_offers_bespoke_choices() {
	// Never reaches the intent stage: the gate stops a bare "parking"
	// before any LLM call.
	let (orchestrator, job_store) = test_state(default_fake_intent(), vec![], None);

	let outcome = orchestrator.submit(SearchRequest {
		query: "parking".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneClarify);
	let result = job.result.unwrap();
	let actions = result["assist"]["actions"].as_array().unwrap();
	assert_eq!(actions.len(), 2);
	assert_eq!(actions[0]["emoji"], "🅿️");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn textsearch_without_any_location_signal_clarifies_early() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.city_text = None;
	intent.location_anchor = LocationAnchor::default();

	let (orchestrator, job_store) = test_state(intent, vec![], None);

	let outcome = orchestrator.submit(SearchRequest {
		query: "good pizza".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneClarify);
	let result = job.result.unwrap();
	assert_eq!(result["meta"]["failureReason"], "LOCATION_REQUIRED");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn identical_submit_before_completion_is_deduplicated() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.city_text = Some("Haifa".to_string());
	intent.location_anchor = LocationAnchor { text: "Haifa".to_string(), kind: LocationAnchorType::City, present: true };

	let pages = vec![Page { places: vec![raw("a", Some(true))], next_page_token: None }];
	let (orchestrator, job_store) = test_state(intent, pages, None);

	let request = || SearchRequest {
		query: "sushi in haifa".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: Some("fixed-key".to_string()),
		clear_context: false,
	};

	let first = orchestrator.submit(request(), "sess_1".to_string()).await;
	assert!(!first.deduplicated);
	let second = orchestrator.submit(request(), "sess_1".to_string()).await;
	assert!(second.deduplicated);
	assert_eq!(second.request_id, first.request_id);

	await_terminal(&job_store, &first.request_id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_results_in_the_requested_area_is_flagged_not_an_error() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.city_text = Some("Eilat".to_string());
	intent.location_anchor = LocationAnchor { text: "Eilat".to_string(), kind: LocationAnchorType::City, present: true };

	let (orchestrator, job_store) = test_state(intent, vec![], None);

	let outcome = orchestrator.submit(SearchRequest {
		query: "ramen in eilat".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneSuccess);
	let result = job.result.unwrap();
	assert_eq!(result["results"].as_array().unwrap().len(), 0);
	assert_eq!(result["meta"]["scenario"], "ZeroNearbyExists");
	let actions = result["assist"]["suggestedActions"].as_array().unwrap();
	assert!(!actions.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_primary_search_with_a_hit_in_another_city_is_zero_different_city() {
	let mut intent = default_fake_intent();
	intent.route = app::models::intent::Route::Textsearch;
	intent.city_text = Some("Netanya".to_string());
	intent.location_anchor = LocationAnchor { text: "Netanya".to_string(), kind: LocationAnchorType::City, present: true };

	// The primary, city-biased fetch comes back empty; the relaxed
	// fallback fetch that follows finds a hit whose address names a
	// different known city.
	let pages = vec![
		Page { places: vec![], next_page_token: None },
		Page { places: vec![raw_at("a", Some(true), "12 Herzl St, Haifa, Israel")], next_page_token: None },
	];
	let (orchestrator, job_store) = test_state(intent, pages, None);

	let outcome = orchestrator.submit(SearchRequest {
		query: "shawarma in netanya".to_string(),
		session_id: Some("sess_1".to_string()),
		user_location: None,
		locale: None,
		request_id: None,
		idempotency_key: None,
		clear_context: false,
	}, "sess_1".to_string()).await;

	let job = await_terminal(&job_store, &outcome.request_id).await;
	assert_eq!(job.status, JobStatus::DoneSuccess);
	let result = job.result.unwrap();
	assert_eq!(result["results"].as_array().unwrap().len(), 0);
	assert_eq!(result["meta"]["scenario"], "ZeroDifferentCity");
}
