/*
 * src/config.rs
 *
 * File for runtime configuration
 *
 * Purpose:
 *   Typed settings for every option that has an effect on the pipeline,
 *   loaded with `dotenvy` + `std::env` the way `main.rs` loads
 *   `API_BASE_URL`/`FRONTEND_URL`/`BIND_ADDRESS`. Loading itself is an
 *   ambient concern carried regardless of which features are in scope —
 *   only the *source* of config (a real secrets manager, etc.) is out
 *   of scope.
 *
 * Include:
 *   Settings         - one field per runtime configuration option
 */

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
	pub bind_address: String,
	pub enable_persistent_job_store: bool,
	pub persistent_store_ttl_seconds: i64,
	pub heartbeat_interval_seconds: u64,
	pub stale_running_threshold_seconds: i64,
	pub cache_guard_timeout_ms: u64,
	pub street_search_exact_radius_meters: i64,
	pub street_search_nearby_radius_meters: i64,
	pub street_search_min_exact_results: usize,
	pub street_search_min_nearby_results: usize,
	pub intent_retry_backoff_ms: u64,
	pub idempotency_fresh_window_ms: i64,
	pub redis_url: Option<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			bind_address: "0.0.0.0:3001".to_string(),
			enable_persistent_job_store: false,
			persistent_store_ttl_seconds: 86_400,
			heartbeat_interval_seconds: 15,
			stale_running_threshold_seconds: 90,
			cache_guard_timeout_ms: 5_000,
			street_search_exact_radius_meters: 200,
			street_search_nearby_radius_meters: 400,
			street_search_min_exact_results: 1,
			street_search_min_nearby_results: 1,
			intent_retry_backoff_ms: 250,
			idempotency_fresh_window_ms: 5_000,
			redis_url: None,
		}
	}
}

impl Settings {
	/// Reads overrides from the environment, falling back to the
	/// defaults above for anything absent or unparsable. Never panics:
	/// every option here has a sensible default, so misconfiguration
	/// degrades gracefully rather than refusing to boot.
	pub fn from_env() -> Self {
		dotenvy::dotenv().ok();
		let defaults = Self::default();

		Self {
			bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
			enable_persistent_job_store: env_bool("ENABLE_PERSISTENT_JOB_STORE", defaults.enable_persistent_job_store),
			persistent_store_ttl_seconds: env_i64(
				"PERSISTENT_STORE_TTL_SECONDS",
				defaults.persistent_store_ttl_seconds,
			),
			heartbeat_interval_seconds: env_u64("HEARTBEAT_INTERVAL_SECONDS", defaults.heartbeat_interval_seconds),
			stale_running_threshold_seconds: env_i64(
				"STALE_RUNNING_THRESHOLD_SECONDS",
				defaults.stale_running_threshold_seconds,
			),
			cache_guard_timeout_ms: env_u64("CACHE_GUARD_TIMEOUT_MS", defaults.cache_guard_timeout_ms),
			street_search_exact_radius_meters: env_i64(
				"STREET_SEARCH_EXACT_RADIUS_METERS",
				defaults.street_search_exact_radius_meters,
			),
			street_search_nearby_radius_meters: env_i64(
				"STREET_SEARCH_NEARBY_RADIUS_METERS",
				defaults.street_search_nearby_radius_meters,
			),
			street_search_min_exact_results: env_usize(
				"STREET_SEARCH_MIN_EXACT_RESULTS",
				defaults.street_search_min_exact_results,
			),
			street_search_min_nearby_results: env_usize(
				"STREET_SEARCH_MIN_NEARBY_RESULTS",
				defaults.street_search_min_nearby_results,
			),
			intent_retry_backoff_ms: env_u64("INTENT_RETRY_BACKOFF_MS", defaults.intent_retry_backoff_ms),
			idempotency_fresh_window_ms: env_i64(
				"IDEMPOTENCY_FRESH_WINDOW_MS",
				defaults.idempotency_fresh_window_ms,
			),
			redis_url: env::var("REDIS_URL").ok(),
		}
	}

	pub fn heartbeat_interval(&self) -> Duration {
		Duration::from_secs(self.heartbeat_interval_seconds)
	}

	pub fn cache_guard_timeout(&self) -> Duration {
		Duration::from_millis(self.cache_guard_timeout_ms)
	}
}

fn env_bool(key: &str, default: bool) -> bool {
	env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
	env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
	env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
	env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
