/*
 * src/models/response_plan.rs
 *
 * File for the ResponsePlan model
 *
 * Purpose:
 *   The structured outcome emitted by the result state engine and
 *   consumed by the chatback generator. The 11-tag scenario set is
 *   closed; `Scenario` has no catch-all variant on purpose so a missing
 *   match arm in `rse` fails to compile instead of silently defaulting.
 *
 * Include:
 *   Scenario          - the 11 closed outcome tags
 *   ResultsSummary    - totals / exact / nearby / openNow / closingSoon
 *   FilterStats       - dropped count + nearby-different-city info
 *   FallbackOption    - a typed recovery option with explanation
 *   Action            - a priority-ordered suggested action
 *   Guardrails        - constraints on the message generator
 *   ResponsePlan      - the full structured plan
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
	ExactMatch,
	LowConfidence,
	MissingQuery,
	MissingLocation,
	ZeroNearbyExists,
	ZeroDifferentCity,
	FewClosingSoon,
	FewAllClosed,
	ManyAllClosed,
	ClarifyNeeded,
	RepeatUnsuccessful,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
	pub total: usize,
	pub exact: usize,
	pub nearby: usize,
	pub open_now: usize,
	pub closing_soon: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
	pub dropped_count: usize,
	pub nearby_city: Option<String>,
	pub nearby_distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
	ExpandRadius,
	NearbyCity,
	DropConstraint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackOption {
	pub kind: FallbackKind,
	pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
	pub priority: u8,
	pub label: String,
	pub kind: FallbackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Guardrails {
	pub must_mention_count: bool,
	pub must_suggest_action: bool,
	pub can_mention_timing: bool,
	pub can_mention_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePlan {
	pub scenario: Scenario,
	pub results: ResultsSummary,
	pub filters: FilterStats,
	pub fallback: Vec<FallbackOption>,
	pub suggested_actions: Vec<Action>,
	pub constraints: Guardrails,
}
