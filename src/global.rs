/*
 * src/global.rs
 *
 * File for process-wide constants
 *
 * Purpose:
 *   Fixed values rather than configurable at runtime (progress
 *   milestones, TTLs used as hard defaults, env var names). Tunable
 *   values live in `config::Settings`.
 */

pub const LOG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/logs");
pub const CRASH_LOG: &str = "crash.log";
pub const LATEST_LOG: &str = "latest.log";

pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const DEPLOY_LLM: &str = "DEPLOY_LLM";

/// Fixed progress milestones.
pub mod progress {
	pub const CREATED: u8 = 10;
	pub const GATE: u8 = 25;
	pub const INTENT: u8 = 40;
	pub const PROVIDER_FETCH: u8 = 60;
	pub const POST_CONSTRAINTS: u8 = 75;
	pub const RANKING: u8 = 90;
	pub const TERMINAL: u8 = 100;
}

/// Job TTLs.
pub const JOB_TTL_IN_MEMORY_SECONDS: i64 = 10 * 60;
pub const JOB_TTL_PERSISTED_SECONDS: i64 = 24 * 60 * 60;

/// Radius defaults by anchor type.
pub mod radius_defaults {
	pub const NEAR_ME_METERS: i64 = 1_000;
	pub const CITY_METERS: i64 = 2_000;
	pub const STREET_METERS: i64 = 200;
	pub const POI_METERS: i64 = 1_000;
	pub const GPS_METERS: i64 = 1_000;
	pub const FALLBACK_METERS: i64 = 1_000;
	pub const MIN_METERS: i64 = 1;
	pub const MAX_METERS: i64 = 50_000;
}

pub const NEARBY_MAPPER_DEFAULT_RADIUS_METERS: i64 = 500;
pub const BIAS_RADIUS_WHEN_CITY_AND_USER_LOCATION_METERS: i64 = 20_000;

pub const PROVIDER_MAX_PAGES: usize = 3;
pub const PROVIDER_MAX_RESULTS: usize = 20;

pub const ASSISTANT_LANGUAGES: [&str; 6] = ["he", "en", "ru", "ar", "fr", "es"];

pub const CHATBACK_MAX_MESSAGE_CHARS: usize = 200;
pub const CHATBACK_HASH_WINDOW: usize = 20;
