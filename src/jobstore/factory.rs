/*
 * src/jobstore/factory.rs
 *
 * File for Job Store wiring
 *
 * Purpose:
 *   The factory transparently degrades to the in-memory implementation
 *   if the persistent backend fails to initialize.
 *
 * Include:
 *   create   - builds the configured backend, falling back on failure
 */

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Settings;
use crate::jobstore::JobStore;
use crate::jobstore::memory::InMemoryJobStore;
use crate::jobstore::persistent::RedisJobStore;

pub async fn create(settings: &Settings) -> Arc<dyn JobStore> {
	if settings.enable_persistent_job_store {
		if let Some(url) = &settings.redis_url {
			match RedisJobStore::connect(url, settings.persistent_store_ttl_seconds).await {
				Ok(store) => {
					info!(target: "jobstore", "using persistent (redis) job store");
					return Arc::new(store);
				}
				Err(e) => {
					warn!(target: "jobstore", error = %e, "persistent job store init failed, falling back to in-memory");
				}
			}
		} else {
			warn!(target: "jobstore", "enable_persistent_job_store set but no redis_url configured, falling back to in-memory");
		}
	}

	info!(target: "jobstore", "using in-memory job store");
	let store = InMemoryJobStore::new();
	store.spawn_sweeper();
	store
}
