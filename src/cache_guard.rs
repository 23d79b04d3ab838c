/*
 * src/cache_guard.rs
 *
 * File for the Cache Guard (C2)
 *
 * Purpose:
 *   A deterministic lookup that short-circuits expensive provider calls
 *   for identical normalized requests. The guard never raises: miss,
 *   timeout, and error all fall through to "let the provider execute".
 *
 * Include:
 *   cache_key        - deterministic key derivation per ProviderPlan variant
 *   CacheOutcome     - Hit | Miss, the guard's own structured event payload
 *   ProviderResultCache - the storage trait the guard checks
 *   CacheGuard       - wraps a cache + timeout into the `check()` operation
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::plan::ProviderPlan;
use crate::models::result::PlaceResult;

/// Buckets a coordinate to ~1km grid cells so nearby-but-not-identical
/// centers still collide on the cache key, matching the implicit
/// intent that the guard targets "identical normalized requests" rather
/// than bit-identical floats.
fn bucket(value: f64, resolution: f64) -> i64 {
	(value / resolution).round() as i64
}

pub fn cache_key(plan: &ProviderPlan) -> String {
	match plan {
		ProviderPlan::TextSearch { text_query, region_code, provider_language, bias, .. } => {
			let normalized = text_query.trim().to_lowercase();
			let bias_bucket = bias
				.map(|b| {
					format!(
						"{}:{}:{}",
						bucket(b.center.lat, 0.01),
						bucket(b.center.lng, 0.01),
						b.radius_meters / 500
					)
				})
				.unwrap_or_else(|| "none".to_string());
			format!(
				"text:{normalized}:{}:{provider_language}:{bias_bucket}",
				region_code.as_deref().unwrap_or("none")
			)
		}
		ProviderPlan::Nearby { keyword, center, radius_meters, region_code, .. } => {
			let keyword_key = keyword.as_deref().map(str::to_lowercase).unwrap_or_else(|| "none".to_string());
			format!(
				"nearby:{keyword_key}:{}:{}:{}:{}",
				bucket(center.lat, 0.001),
				bucket(center.lng, 0.001),
				radius_meters / 50,
				region_code.as_deref().unwrap_or("none")
			)
		}
		ProviderPlan::LandmarkPlan { landmark_id: Some(id), radius_meters, cuisine_key, .. } => {
			format!(
				"landmark_search:{id}:{radius_meters}:{}",
				cuisine_key.as_deref().unwrap_or("none")
			)
		}
		ProviderPlan::LandmarkPlan { landmark_id: None, geocode_query, radius_meters, cuisine_key, .. } => {
			// No landmark_id: fall back using geocode_query.
			format!(
				"landmark_geocode:{}:{radius_meters}:{}",
				geocode_query.trim().to_lowercase(),
				cuisine_key.as_deref().unwrap_or("none")
			)
		}
	}
}

#[async_trait]
pub trait ProviderResultCache: Send + Sync {
	async fn get(&self, key: &str) -> Option<Vec<PlaceResult>>;
	async fn put(&self, key: &str, results: Vec<PlaceResult>);
}

pub struct InMemoryResultCache {
	entries: dashmap::DashMap<String, (i64, Vec<PlaceResult>)>,
	ttl_seconds: i64,
}

impl InMemoryResultCache {
	pub fn new(ttl_seconds: i64) -> Arc<Self> {
		Arc::new(Self { entries: dashmap::DashMap::new(), ttl_seconds })
	}
}

#[async_trait]
impl ProviderResultCache for InMemoryResultCache {
	async fn get(&self, key: &str) -> Option<Vec<PlaceResult>> {
		let entry = self.entries.get(key)?;
		let (stored_at, results) = entry.value().clone();
		if chrono::Utc::now().timestamp() - stored_at > self.ttl_seconds {
			drop(entry);
			self.entries.remove(key);
			return None;
		}
		Some(results)
	}

	async fn put(&self, key: &str, results: Vec<PlaceResult>) {
		self.entries.insert(key.to_string(), (chrono::Utc::now().timestamp(), results));
	}
}

pub enum CacheOutcome {
	Hit(Vec<PlaceResult>),
	Miss,
}

pub struct CacheGuard {
	cache: Arc<dyn ProviderResultCache>,
	timeout: Duration,
}

impl CacheGuard {
	pub fn new(cache: Arc<dyn ProviderResultCache>, timeout: Duration) -> Self {
		Self { cache, timeout }
	}

	/// Checks for an equivalent recently-executed plan. Every outcome —
	/// hit, miss, timeout, or internal error — emits exactly one
	/// structured event and never raises: the caller
	/// always gets back a plain `CacheOutcome`.
	pub async fn check(&self, plan: &ProviderPlan) -> CacheOutcome {
		let key = cache_key(plan);
		match tokio::time::timeout(self.timeout, self.cache.get(&key)).await {
			Ok(Some(results)) => {
				info!(target: "cache_guard", cache_key = %key, outcome = "hit", "cache guard resolved plan");
				CacheOutcome::Hit(results)
			}
			Ok(None) => {
				info!(target: "cache_guard", cache_key = %key, outcome = "miss", "cache guard resolved plan");
				CacheOutcome::Miss
			}
			Err(_) => {
				warn!(target: "cache_guard", cache_key = %key, outcome = "timeout", "cache guard timed out, falling through to provider");
				CacheOutcome::Miss
			}
		}
	}

	pub async fn store(&self, plan: &ProviderPlan, results: Vec<PlaceResult>) {
		let key = cache_key(plan);
		self.cache.put(&key, results).await;
	}
}
