/*
 * src/models/session.rs
 *
 * File for the SessionContext model
 *
 * Purpose:
 *   Per-session conversation memory. Owned by the in-process session
 *   store (see `orchestrator::SessionStore`); a ring buffer bounds
 *   history growth so a long-lived session can't accumulate an
 *   unbounded turn list.
 *
 * Include:
 *   ConversationTurn   - one user/assistant exchange
 *   ChatBackMemory     - recent message hashes + per-scenario counters
 *   SessionContext     - the full per-session record
 */

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::models::intent::Intent;
use crate::models::response_plan::Scenario;

const HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
	pub query: String,
	pub assistant_message: String,
	pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatBackMemory {
	pub recent_message_hashes: VecDeque<u64>,
	pub scenario_counts: HashMap<Scenario, u32>,
	pub turn_index: u32,
}

impl ChatBackMemory {
	pub fn record_message(&mut self, hash: u64) {
		self.recent_message_hashes.push_back(hash);
		while self.recent_message_hashes.len() > crate::global::CHATBACK_HASH_WINDOW {
			self.recent_message_hashes.pop_front();
		}
		self.turn_index += 1;
	}

	pub fn record_scenario(&mut self, scenario: Scenario) -> u32 {
		let counter = self.scenario_counts.entry(scenario).or_insert(0);
		*counter += 1;
		*counter
	}

	pub fn recently_used(&self, hash: u64) -> bool {
		self.recent_message_hashes.contains(&hash)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionContext {
	pub conversation_history: VecDeque<ConversationTurn>,
	pub current_intent: Option<Intent>,
	pub chat_back_memory: ChatBackMemory,
	/// Geocode-validated city names. Survives `reset()` — an explicit
	/// reset clears conversation history and intent, not this cache.
	pub validated_cities: HashMap<String, crate::models::request::LatLng>,
}

impl SessionContext {
	pub fn push_turn(&mut self, turn: ConversationTurn) {
		self.conversation_history.push_back(turn);
		while self.conversation_history.len() > HISTORY_CAPACITY {
			self.conversation_history.pop_front();
		}
	}

	/// Clearing a session empties `conversation_history` and
	/// `current_intent`; `validated_cities` is preserved.
	pub fn reset(&mut self) {
		self.conversation_history.clear();
		self.current_intent = None;
	}
}
