/*
 * src/chatback.rs
 *
 * File for the ChatBack Generator (C11)
 *
 * Purpose:
 *   Turns a `ResponsePlan` into the single assistant-facing message the
 *   caller sees. When an LLM collaborator is configured, its output is
 *   scanned against the forbidden-phrase list before it's trusted; a
 *   violation gets one retry with a stricter system prompt, and a
 *   second violation falls back to the deterministic i18n template
 *   rather than ever surfacing untrusted LLM text.
 *
 * Include:
 *   build_system_prompt  - NORMAL/RECOVERY system prompt text
 *   build_user_context    - plan -> short JSON-ish context for the LLM
 *   generate              - the full generate/scan/retry/fallback flow
 */

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::warn;

use crate::i18n;
use crate::llm::ChatBackLlmClient;
use crate::models::response_plan::ResponsePlan;
use crate::models::session::ChatBackMemory;

fn build_system_prompt(assistant_language: &str, recovery: bool) -> String {
	let base = format!(
		"You are a concise assistant replying in {assistant_language}. Never claim certainty you don't have, \
		 never say you are an AI, never apologize, never guarantee quality or rank a place as \"the best\"."
	);
	if recovery {
		format!("{base} Your previous reply violated these rules. Rewrite it plainly, strictly factual, no superlatives.")
	} else {
		base
	}
}

fn build_user_context(plan: &ResponsePlan) -> String {
	format!(
		"scenario={:?} total={} exact={} nearby={} openNow={} closingSoon={} fallbackOptions={}",
		plan.scenario,
		plan.results.total,
		plan.results.exact,
		plan.results.nearby,
		plan.results.open_now,
		plan.results.closing_soon,
		plan.fallback.len(),
	)
}

fn violates_forbidden_phrases(message: &str, assistant_language: &str) -> bool {
	let lowered = message.to_lowercase();
	i18n::forbidden_phrases(assistant_language).iter().any(|phrase| lowered.contains(&phrase.to_lowercase()))
}

fn hash_message(message: &str) -> u64 {
	let mut hasher = DefaultHasher::new();
	message.hash(&mut hasher);
	hasher.finish()
}

fn truncate_to_limit(message: String) -> String {
	if message.chars().count() <= crate::global::CHATBACK_MAX_MESSAGE_CHARS {
		return message;
	}
	message.chars().take(crate::global::CHATBACK_MAX_MESSAGE_CHARS).collect()
}

/// Calls the LLM collaborator (when present), scans its output, retries
/// once in recovery mode on a violation, and falls back to the
/// deterministic template on a second violation or when no collaborator
/// is configured at all. Every final message is hashed and recorded in
/// `memory` before being returned.
pub async fn generate(
	client: Option<&dyn ChatBackLlmClient>,
	plan: &ResponsePlan,
	assistant_language: &str,
	memory: &mut ChatBackMemory,
) -> String {
	let message = match client {
		None => i18n::template(plan, assistant_language),
		Some(client) => {
			let user_context = build_user_context(plan);
			let first = client.generate(&build_system_prompt(assistant_language, false), &user_context, "NORMAL").await;
			match first {
				Ok(text) if !violates_forbidden_phrases(&text, assistant_language) => truncate_to_limit(text),
				Ok(_) => {
					let retry = client
						.generate(&build_system_prompt(assistant_language, true), &user_context, "RECOVERY")
						.await;
					match retry {
						Ok(text) if !violates_forbidden_phrases(&text, assistant_language) => truncate_to_limit(text),
						_ => {
							warn!(target: "chatback", "llm output violated forbidden-phrase scan twice, using deterministic template");
							i18n::template(plan, assistant_language)
						}
					}
				}
				Err(e) => {
					warn!(target: "chatback", error = %e, "llm collaborator unavailable, using deterministic template");
					i18n::template(plan, assistant_language)
				}
			}
		}
	};

	memory.record_message(hash_message(&message));
	memory.record_scenario(plan.scenario);
	message
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::llm::LlmError;
	use crate::models::response_plan::{FilterStats, Guardrails, ResultsSummary, Scenario};
	use async_trait::async_trait;

	fn base_plan() -> ResponsePlan {
		ResponsePlan {
			scenario: Scenario::ExactMatch,
			results: ResultsSummary { total: 3, ..Default::default() },
			filters: FilterStats::default(),
			fallback: vec![],
			suggested_actions: vec![],
			constraints: Guardrails::default(),
		}
	}

	struct AlwaysViolates;
	#[async_trait]
	impl ChatBackLlmClient for AlwaysViolates {
		async fn generate(&self, _system_prompt: &str, _user_context: &str, _mode: &str) -> Result<String, LlmError> {
			Ok("No results for that one, maybe try again later.".to_string())
		}
	}

	struct CleanOnFirstTry;
	#[async_trait]
	impl ChatBackLlmClient for CleanOnFirstTry {
		async fn generate(&self, _system_prompt: &str, _user_context: &str, _mode: &str) -> Result<String, LlmError> {
			Ok("Found three places nearby, all currently open.".to_string())
		}
	}

	#[tokio::test]
	async fn no_client_uses_deterministic_template() {
		let mut memory = ChatBackMemory::default();
		let message = generate(None, &base_plan(), "en", &mut memory).await;
		assert!(message.contains("Found 3 places"));
		assert_eq!(memory.turn_index, 1);
	}

	#[tokio::test]
	async fn repeated_violation_falls_back_to_template() {
		let mut memory = ChatBackMemory::default();
		let client = AlwaysViolates;
		let message = generate(Some(&client), &base_plan(), "en", &mut memory).await;
		assert!(!violates_forbidden_phrases(&message, "en"));
	}

	#[tokio::test]
	async fn clean_llm_output_passes_through() {
		let mut memory = ChatBackMemory::default();
		let client = CleanOnFirstTry;
		let message = generate(Some(&client), &base_plan(), "en", &mut memory).await;
		assert_eq!(message, "Found three places nearby, all currently open.");
	}
}
