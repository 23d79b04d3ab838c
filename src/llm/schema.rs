/*
 * src/llm/schema.rs
 *
 * File for versioned, hashed LLM-output JSON schemas
 *
 * Purpose:
 *   Every schema an LLM collaborator is asked to fill is versioned and
 *   hashed so drift between a prompt and its schema is caught at load
 *   time rather than at runtime. The self-check asserts every declared
 *   property appears in `required` and that `additional_properties` is
 *   false — loosening either would let a hallucinated or missing field
 *   slip through undetected.
 *
 * Include:
 *   SchemaDef         - name + version + required props + hash
 *   SchemaError       - self-check failure
 *   build_schema      - constructs + self-checks a SchemaDef
 */

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SchemaDef {
	pub name: &'static str,
	pub version: u32,
	pub properties: Vec<&'static str>,
	pub required: Vec<&'static str>,
	pub additional_properties: bool,
	pub hash: u64,
}

#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("schema '{0}' declares the same property twice: {1}")]
	DuplicateProperty(&'static str, &'static str),
	#[error("schema '{0}' allows additionalProperties, must be false")]
	AdditionalPropertiesAllowed(&'static str),
}

fn hash_schema(name: &str, version: u32, properties: &[&str]) -> u64 {
	let mut hasher = DefaultHasher::new();
	name.hash(&mut hasher);
	version.hash(&mut hasher);
	for p in properties {
		p.hash(&mut hasher);
	}
	hasher.finish()
}

/// Builds a schema definition and runs the self-check immediately. A
/// schema that fails this check is a programming error, not a runtime
/// condition — it panics at construction (called once, at process
/// startup, from each schema's constant). Every declared property is
/// required by construction (`required` mirrors `properties`); the
/// self-check instead catches the mistake of listing the same property
/// twice, which would silently make the hash and the required-count
/// misleading.
pub fn build_schema(
	name: &'static str,
	version: u32,
	properties: Vec<&'static str>,
	additional_properties: bool,
) -> SchemaDef {
	for (i, prop) in properties.iter().enumerate() {
		if properties[..i].contains(prop) {
			panic!("{}", SchemaError::DuplicateProperty(name, prop));
		}
	}
	if additional_properties {
		panic!("{}", SchemaError::AdditionalPropertiesAllowed(name));
	}
	let hash = hash_schema(name, version, &properties);
	SchemaDef { name, version, required: properties.clone(), properties, additional_properties, hash }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn valid_schema_self_checks_cleanly() {
		let schema = build_schema("intent_v1", 1, vec!["route", "confidence"], false);
		assert_eq!(schema.required.len(), 2);
		assert!(schema.hash != 0);
	}

	#[test]
	#[should_panic]
	fn additional_properties_true_panics() {
		build_schema("bad_schema", 1, vec!["route"], true);
	}
}
