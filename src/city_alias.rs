/*
 * src/city_alias.rs
 *
 * File for the multilingual city-name canonicalization table
 *
 * Purpose:
 *   Canonicalizes city names across Hebrew, English, and Arabic so
 *   "תל אביב" / "tel aviv" / "تل أبيب" all resolve to the same
 *   canonical key before a result's city is compared against the
 *   query's city. Distinguishes "different known city" from "unknown
 *   city" — the latter gets the benefit of the doubt.
 *
 * Include:
 *   canonicalize    - resolves free text to a canonical city key
 *   same_city       - true if two free-text city names denote one city
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

static CITY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
	let mut m = HashMap::new();
	let cities: &[(&str, &[&str])] = &[
		("tel_aviv", &["tel aviv", "tel-aviv", "telaviv", "תל אביב", "תל-אביב", "تل أبيب"]),
		("jerusalem", &["jerusalem", "ירושלים", "القدس"]),
		("haifa", &["haifa", "חיפה", "حيفا"]),
		("beer_sheva", &["beer sheva", "beersheba", "באר שבע", "بئر السبع"]),
		("eilat", &["eilat", "אילת", "إيلات"]),
		("netanya", &["netanya", "נתניה", "نتانيا"]),
		("herzliya", &["herzliya", "הרצליה", "هرتسليا"]),
		("ramat_gan", &["ramat gan", "רמת גן", "رمات غان"]),
		("givatayim", &["givatayim", "גבעתיים", "جفعاتايم"]),
		("holon", &["holon", "חולון", "حولون"]),
		("bat_yam", &["bat yam", "בת ים", "بات يام"]),
		("rishon_lezion", &["rishon lezion", "ראשון לציון", "ريشون لتسيون"]),
		("petah_tikva", &["petah tikva", "petach tikva", "פתח תקווה", "بيتح تكفا"]),
		("ashdod", &["ashdod", "אשדוד", "أشدود"]),
		("ashkelon", &["ashkelon", "אשקלון", "عسقلان"]),
		("raanana", &["raanana", "ra'anana", "רעננה", "رعنانا"]),
		("kfar_saba", &["kfar saba", "כפר סבא", "كفار سابا"]),
		("hod_hasharon", &["hod hasharon", "הוד השרון", "هود هشارون"]),
		("modiin", &["modiin", "modi'in", "מודיעין", "موديعين"]),
		("rehovot", &["rehovot", "רחובות", "رحوفوت"]),
		("nazareth", &["nazareth", "נצרת", "الناصرة"]),
		("acre", &["acre", "akko", "עכו", "عكا"]),
		("tiberias", &["tiberias", "טבריה", "طبريا"]),
		("eilat_north", &["eilat north", "צפון אילת"]),
		("lod", &["lod", "לוד", "اللد"]),
		("ramla", &["ramla", "רמלה", "الرملة"]),
		("yavne", &["yavne", "יבנה", "يبنه"]),
		("karmiel", &["karmiel", "כרמיאל", "كرمئيل"]),
		("nahariya", &["nahariya", "נהריה", "نهاريا"]),
		("afula", &["afula", "עפולה", "العفولة"]),
		("dimona", &["dimona", "דימונה", "ديمونة"]),
		("kiryat_shmona", &["kiryat shmona", "קריית שמונה", "كريات شمونة"]),
	];
	for (canonical, aliases) in cities {
		for alias in *aliases {
			m.insert(*alias, *canonical);
		}
	}
	m
});

fn normalize(text: &str) -> String {
	text.trim().to_lowercase()
}

/// Resolves free text to a canonical city key, or `None` when the text
/// doesn't match any seeded alias.
pub fn canonicalize(text: &str) -> Option<&'static str> {
	let normalized = normalize(text);
	CITY_ALIASES.get(normalized.as_str()).copied()
}

/// Scans free text (e.g. a provider's `formatted_address`) for any
/// seeded city alias as a substring, rather than requiring the whole
/// field to be just the city name. Returns the first alias found; a
/// formatted address only ever names one city in practice.
pub fn find_in_text(text: &str) -> Option<&'static str> {
	let lowered = normalize(text);
	CITY_ALIASES.iter().find(|(alias, _)| lowered.contains(*alias)).map(|(_, canonical)| *canonical)
}

/// Turns a canonical key like `"beer_sheva"` into a display string like
/// `"Beer Sheva"` for use in an assistant message.
pub fn display_name(canonical: &str) -> String {
	canonical
		.split('_')
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityMatch {
	Same,
	Different,
	Unknown,
}

/// Compares two free-text city names. Returns `Unknown` (benefit of the
/// doubt) whenever either side fails to canonicalize, rather than
/// treating an unrecognized city as a mismatch.
pub fn same_city(a: &str, b: &str) -> CityMatch {
	match (canonicalize(a), canonicalize(b)) {
		(Some(x), Some(y)) if x == y => CityMatch::Same,
		(Some(_), Some(_)) => CityMatch::Different,
		_ => CityMatch::Unknown,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hebrew_english_arabic_alias_canonicalize_to_same_key() {
		assert_eq!(canonicalize("תל אביב"), canonicalize("tel aviv"));
		assert_eq!(canonicalize("تل أبيب"), canonicalize("Tel-Aviv"));
	}

	#[test]
	fn unknown_city_is_unknown_not_mismatch() {
		assert_eq!(same_city("Atlantis", "tel aviv"), CityMatch::Unknown);
	}

	#[test]
	fn different_known_cities_are_different() {
		assert_eq!(same_city("haifa", "tel aviv"), CityMatch::Different);
	}

	#[test]
	fn find_in_text_matches_a_city_alias_inside_a_longer_address() {
		assert_eq!(find_in_text("12 Herzl St, Haifa, Israel"), Some("haifa"));
	}

	#[test]
	fn display_name_title_cases_each_word() {
		assert_eq!(display_name("beer_sheva"), "Beer Sheva");
	}
}
