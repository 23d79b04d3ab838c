/*
 * src/rse.rs
 *
 * File for the Result State Engine (C10)
 *
 * Purpose:
 *   Classifies the pipeline's outcome into one of eleven closed
 *   scenarios and builds the structured `ResponsePlan` the chatback
 *   generator turns into a message. Classification order is fixed and
 *   documented inline — it is not a priority list to be reordered
 *   casually, since later scenarios assume earlier ones were already
 *   ruled out.
 *
 * Include:
 *   RseInput       - every signal the classifier needs
 *   classify       - pure scenario classification
 *   build_plan     - RseInput + Scenario -> ResponsePlan
 */

use crate::models::response_plan::{Action, FallbackKind, FallbackOption, FilterStats, Guardrails, ResponsePlan, Scenario, ResultsSummary};
use crate::models::result::{GroupKind, PlaceResult};

const FEW_THRESHOLD: usize = 3;
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;
const REPEAT_THRESHOLD: u32 = 2;

#[derive(Debug, Clone)]
pub struct RseInput {
	pub query_present: bool,
	pub location_present: bool,
	pub route_is_clarify: bool,
	pub confidence: f64,
	pub results: Vec<PlaceResult>,
	pub closing_soon: usize,
	/// Set when the original search came up empty but a widened or
	/// same-city fallback query found something.
	pub nearby_city: Option<String>,
	/// True when the fallback hit above landed in a different city than
	/// the one requested, as opposed to just a wider radius in the same
	/// area.
	pub nearby_is_different_city: bool,
	/// Distance from the requester to the different-city fallback hit,
	/// when one was found and a distance could honestly be computed.
	pub nearby_distance_meters: Option<f64>,
	/// How many times this session has already landed on a
	/// zero/all-closed scenario in a row.
	pub prior_unsuccessful_streak: u32,
}

fn open_now_true_count(results: &[PlaceResult]) -> usize {
	results.iter().filter(|r| matches!(r.open_now, crate::models::result::OpenNow::True)).count()
}

/// Fixed classification order: missing inputs first, then the
/// clarify/low-confidence signals the intent stage already raised, then
/// result-count-driven scenarios, with the repeat check last since it
/// only matters once a problem scenario has already been chosen twice.
pub fn classify(input: &RseInput) -> Scenario {
	if !input.query_present {
		return Scenario::MissingQuery;
	}
	if !input.location_present && input.results.is_empty() {
		return Scenario::MissingLocation;
	}
	if input.route_is_clarify {
		return Scenario::ClarifyNeeded;
	}
	if input.confidence < LOW_CONFIDENCE_THRESHOLD {
		return Scenario::LowConfidence;
	}

	let total = input.results.len();
	let open_count = open_now_true_count(&input.results);

	// When street-anchor grouping tagged the results, an empty EXACT
	// group is "zero results here" even though the wider NEARBY group
	// found some — the flat total alone would hide that and read as a
	// match. Only results carrying a `group_kind` participate in this
	// check; an ungrouped fetch falls straight through to `total == 0`.
	let grouping_active = input.results.iter().any(|r| r.group_kind.is_some());
	let exact_count = input.results.iter().filter(|r| r.group_kind == Some(GroupKind::Exact)).count();

	if total == 0 || (grouping_active && exact_count == 0) {
		let base = if input.nearby_is_different_city { Scenario::ZeroDifferentCity } else { Scenario::ZeroNearbyExists };
		return escalate_if_repeated(base, input.prior_unsuccessful_streak);
	}

	if total <= FEW_THRESHOLD {
		if input.closing_soon > 0 {
			return Scenario::FewClosingSoon;
		}
		if open_count == 0 {
			return escalate_if_repeated(Scenario::FewAllClosed, input.prior_unsuccessful_streak);
		}
		return Scenario::ExactMatch;
	}

	if open_count == 0 {
		return escalate_if_repeated(Scenario::ManyAllClosed, input.prior_unsuccessful_streak);
	}

	Scenario::ExactMatch
}

fn escalate_if_repeated(base: Scenario, streak: u32) -> Scenario {
	if streak >= REPEAT_THRESHOLD { Scenario::RepeatUnsuccessful } else { base }
}

fn results_summary(results: &[PlaceResult], closing_soon: usize) -> ResultsSummary {
	ResultsSummary {
		total: results.len(),
		exact: results.iter().filter(|r| r.group_kind == Some(GroupKind::Exact)).count(),
		nearby: results.iter().filter(|r| r.group_kind == Some(GroupKind::Nearby)).count(),
		open_now: open_now_true_count(results),
		closing_soon,
	}
}

fn fallback_options(scenario: Scenario) -> Vec<FallbackOption> {
	match scenario {
		Scenario::ZeroNearbyExists => vec![FallbackOption {
			kind: FallbackKind::ExpandRadius,
			explanation: "Widen the search radius to find more options nearby.".to_string(),
		}],
		Scenario::ZeroDifferentCity => vec![FallbackOption {
			kind: FallbackKind::NearbyCity,
			explanation: "Show matches found in a neighboring city instead.".to_string(),
		}],
		Scenario::FewAllClosed | Scenario::ManyAllClosed => vec![FallbackOption {
			kind: FallbackKind::DropConstraint,
			explanation: "Drop the open-now requirement to see closed places too.".to_string(),
		}],
		Scenario::RepeatUnsuccessful => vec![
			FallbackOption { kind: FallbackKind::ExpandRadius, explanation: "Try a wider search area.".to_string() },
			FallbackOption { kind: FallbackKind::DropConstraint, explanation: "Relax one of the current filters.".to_string() },
		],
		_ => vec![],
	}
}

fn suggested_actions(options: &[FallbackOption]) -> Vec<Action> {
	options
		.iter()
		.enumerate()
		.map(|(i, opt)| Action { priority: i as u8, label: opt.explanation.clone(), kind: opt.kind })
		.collect()
}

fn guardrails(scenario: Scenario) -> Guardrails {
	match scenario {
		Scenario::ExactMatch | Scenario::FewClosingSoon | Scenario::FewAllClosed | Scenario::ManyAllClosed => {
			Guardrails { must_mention_count: true, must_suggest_action: false, can_mention_timing: true, can_mention_location: true }
		}
		Scenario::ZeroNearbyExists | Scenario::ZeroDifferentCity | Scenario::RepeatUnsuccessful => {
			Guardrails { must_mention_count: false, must_suggest_action: true, can_mention_timing: false, can_mention_location: true }
		}
		Scenario::MissingQuery | Scenario::MissingLocation | Scenario::ClarifyNeeded | Scenario::LowConfidence => {
			Guardrails { must_mention_count: false, must_suggest_action: false, can_mention_timing: false, can_mention_location: false }
		}
	}
}

pub fn build_plan(input: RseInput) -> ResponsePlan {
	let scenario = classify(&input);
	let results = results_summary(&input.results, input.closing_soon);
	let filters = FilterStats {
		dropped_count: 0,
		nearby_city: input.nearby_city.clone(),
		nearby_distance: input.nearby_distance_meters,
	};
	let fallback = fallback_options(scenario);
	let suggested_actions = suggested_actions(&fallback);
	let constraints = guardrails(scenario);
	ResponsePlan { scenario, results, filters, fallback, suggested_actions, constraints }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::request::LatLng;
	use crate::models::result::{Category, OpenNow};

	fn base_input() -> RseInput {
		RseInput {
			query_present: true,
			location_present: true,
			route_is_clarify: false,
			confidence: 0.9,
			results: vec![],
			closing_soon: 0,
			nearby_city: None,
			nearby_is_different_city: false,
			nearby_distance_meters: None,
			prior_unsuccessful_streak: 0,
		}
	}

	fn place(open_now: OpenNow) -> PlaceResult {
		PlaceResult {
			id: "1".to_string(),
			display_name: "P".to_string(),
			formatted_address: "a".to_string(),
			coordinates: LatLng { lat: 0.0, lng: 0.0 },
			rating: None,
			rating_count: None,
			category: Category::Restaurant,
			open_now,
			group_kind: None,
			distance_meters: None,
		}
	}

	#[test]
	fn missing_query_takes_priority_over_everything() {
		let mut input = base_input();
		input.query_present = false;
		input.route_is_clarify = true;
		assert_eq!(classify(&input), Scenario::MissingQuery);
	}

	#[test]
	fn zero_results_different_city_flagged_distinctly() {
		let mut input = base_input();
		input.nearby_is_different_city = true;
		assert_eq!(classify(&input), Scenario::ZeroDifferentCity);
	}

	#[test]
	fn zero_results_same_area_is_zero_nearby_exists() {
		let input = base_input();
		assert_eq!(classify(&input), Scenario::ZeroNearbyExists);
	}

	fn grouped_place(id: &str, kind: GroupKind) -> PlaceResult {
		PlaceResult { id: id.to_string(), group_kind: Some(kind), ..place(OpenNow::True) }
	}

	#[test]
	fn empty_exact_group_with_nonempty_nearby_group_is_zero_nearby_exists() {
		// Mirrors a street-anchor search with nothing within the EXACT
		// radius but five hits in the wider NEARBY radius — the flat
		// total (5) must not read as a match.
		let mut input = base_input();
		input.results = (0..5).map(|i| grouped_place(&i.to_string(), GroupKind::Nearby)).collect();
		assert_eq!(classify(&input), Scenario::ZeroNearbyExists);
	}

	#[test]
	fn nonempty_exact_group_is_not_affected_by_grouping_check() {
		let mut input = base_input();
		input.results = vec![grouped_place("a", GroupKind::Exact), grouped_place("b", GroupKind::Nearby)];
		assert_eq!(classify(&input), Scenario::ExactMatch);
	}

	#[test]
	fn repeated_zero_result_streak_escalates_to_repeat_unsuccessful() {
		let mut input = base_input();
		input.prior_unsuccessful_streak = 3;
		assert_eq!(classify(&input), Scenario::RepeatUnsuccessful);
	}

	#[test]
	fn many_open_results_is_exact_match() {
		let mut input = base_input();
		input.results = vec![place(OpenNow::True); 5];
		assert_eq!(classify(&input), Scenario::ExactMatch);
	}

	#[test]
	fn many_all_closed_results_flagged() {
		let mut input = base_input();
		input.results = vec![place(OpenNow::False); 5];
		assert_eq!(classify(&input), Scenario::ManyAllClosed);
	}
}
