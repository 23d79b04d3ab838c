#![allow(unexpected_cfgs)]

mod cache_guard;
mod chatback;
mod city_alias;
mod config;
mod controllers;
mod error;
mod gate;
mod global;
mod grouping;
mod i18n;
mod intent_stage;
mod jobstore;
mod landmark_registry;
mod llm;
mod log;
mod middleware;
mod models;
mod orchestrator;
mod provider;
mod resolvers;
mod route_mappers;
mod rse;
mod shared_filters;

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use http::{Method, header::HeaderValue};
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::cache_guard::{CacheGuard, InMemoryResultCache};
use crate::config::Settings;
use crate::llm::null::{NullIntentLlmClient, NullRouteLlmClient};
use crate::orchestrator::{AppState, Orchestrator, SessionStore};
use crate::provider::fakes::{FakeGeocoder, FakePlacesProvider};

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
	log::init_panic_handler();
	log::init_logger();

	let settings = Settings::from_env();
	let bind_address = settings.bind_address.clone();

	let job_store = jobstore::factory::create(&settings).await;
	let sessions = SessionStore::new();

	// Production Places/Geocode adapters would wrap `google_maps::places`;
	// none has been wired yet, so the fakes stand in until a real API key
	// is configured.
	let places = Arc::new(FakePlacesProvider::default());
	let geocode = Arc::new(FakeGeocoder { response: None });

	let cache = InMemoryResultCache::new(settings.persistent_store_ttl_seconds);
	let cache_guard = Arc::new(CacheGuard::new(cache, settings.cache_guard_timeout()));

	// Every LLM collaborator falls back to a deterministic null client
	// for now (see `llm::null`) — `DEPLOY_LLM` is reserved for the day a
	// real `langchain_rust` adapter lands.
	let state = AppState {
		job_store,
		cache_guard,
		settings: Arc::new(settings),
		intent_llm: Arc::new(NullIntentLlmClient),
		route_llm: Arc::new(NullRouteLlmClient),
		chatback_llm: None,
		places,
		geocode,
		sessions,
	};

	let orchestrator = Orchestrator::new(state.clone());

	let cors = match env::var("FRONTEND_URL") {
		Ok(url) => CorsLayer::new().allow_origin(url.parse::<HeaderValue>().expect("invalid FRONTEND_URL format")),
		Err(_) => CorsLayer::new().allow_origin(tower_http::cors::Any),
	}
	.allow_methods([Method::GET, Method::POST])
	.allow_headers([
		http::header::CONTENT_TYPE,
		http::header::ACCEPT,
		http::header::HeaderName::from_static("x-session-id"),
	]);

	let shutdown_orchestrator = orchestrator.clone();

	let app = axum::Router::new()
		.nest("/search", controllers::search::search_routes())
		.nest("/healthz", controllers::health::health_routes())
		.layer(Extension(orchestrator))
		.layer(Extension(state))
		.layer(cors);

	let addr = SocketAddr::from_str(&bind_address).expect("invalid BIND_ADDRESS format");
	tracing::info!(target: "main", %addr, "server starting");

	let listener = tokio::net::TcpListener::bind(addr).await?;
	axum::serve(listener, app.into_make_service())
		.with_graceful_shutdown(shutdown_handler(shutdown_orchestrator))
		.await?;

	Ok(())
}

/// SIGINT/SIGTERM triggers the job store's staleness sweep before the
/// process actually exits, so in-flight jobs past the stale threshold
/// are marked `DONE_STOPPED` rather than left RUNNING forever.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

async fn shutdown_handler(orchestrator: Arc<Orchestrator>) {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("failed to install ctrl-c handler");
	};

	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install terminate signal handler")
			.recv()
			.await;
	};

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!(target: "main", "shutdown signal received, draining running jobs");
	orchestrator.shutdown(SHUTDOWN_GRACE).await;
}
