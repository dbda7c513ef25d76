//! Schema reference extraction
//!
//! Collects the local `$ref` targets found anywhere below a schema node, as
//! JSON pointers without the `#` marker. `#/definitions/A` becomes the pointer
//! `/definitions/A`, which is also the schema pointer validation errors carry
//! once the reference has been followed, so the two compare directly.

use ahash::RandomState;
use indexmap::IndexSet;
use serde_json::Value;
use vouch_value::JsonPointer;

use crate::schema::subschemas;

/// Keywords that are compiled but never evaluated against an instance. A
/// reference below them could never fail, so it is not collected.
const UNEVALUATED_KEYWORDS: [&str; 2] = ["patternProperties", "dependencies"];

/// Set of reference targets, in first-seen order.
pub type ReferenceSet = IndexSet<JsonPointer, RandomState>;

/// Every local reference inside `schema`, at any depth.
///
/// Only schema positions are walked, so values of `enum` or `default` that
/// happen to contain a `$ref` member are not mistaken for references.
/// Non-local references and malformed fragments are left out.
pub fn extract_references(schema: &Value) -> ReferenceSet {
    let mut references = ReferenceSet::default();
    collect(schema, &mut references);
    references
}

/// Every local reference inside an array of schemas such as a `oneOf` value.
pub fn extract_schema_array_references(schemas: &[Value]) -> ReferenceSet {
    let mut references = ReferenceSet::default();
    for schema in schemas {
        collect(schema, &mut references);
    }
    references
}

fn collect(schema: &Value, references: &mut ReferenceSet) {
    let Value::Object(members) = schema else {
        return;
    };

    if let Some(Value::String(reference)) = members.get("$ref")
        && let Ok(target) = JsonPointer::from_fragment(reference)
    {
        references.insert(target);
    }

    for (pointer, child) in subschemas(members, &JsonPointer::root()) {
        if pointer
            .segments()
            .first()
            .is_some_and(|keyword| UNEVALUATED_KEYWORDS.contains(&keyword.as_str()))
        {
            continue;
        }
        collect(child, references);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(references: &ReferenceSet) -> Vec<String> {
        references.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_direct_references() {
        let schemas = json!([{"$ref": "#/definitions/A"}, {"$ref": "#/definitions/B"}]);
        let references = extract_schema_array_references(schemas.as_array().unwrap());
        assert_eq!(strings(&references), vec!["/definitions/A", "/definitions/B"]);
    }

    #[test]
    fn test_nested_compositions_are_captured() {
        let schema = json!({
            "allOf": [
                {"properties": {"x": {"$ref": "#/definitions/X"}}},
                {"anyOf": [{"items": {"$ref": "#/definitions/Y"}}]}
            ]
        });
        assert_eq!(
            strings(&extract_references(&schema)),
            vec!["/definitions/X", "/definitions/Y"]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let schemas = json!([
            {"$ref": "#/definitions/A"},
            {"not": {"$ref": "#/definitions/A"}}
        ]);
        let references = extract_schema_array_references(schemas.as_array().unwrap());
        assert_eq!(strings(&references), vec!["/definitions/A"]);
    }

    #[test]
    fn test_inline_schemas_have_no_references() {
        let schemas = json!([{"type": "string"}, {"type": "integer"}]);
        assert!(extract_schema_array_references(schemas.as_array().unwrap()).is_empty());
    }

    #[test]
    fn test_data_keywords_and_remote_refs_are_ignored() {
        let schema = json!({
            "enum": [{"$ref": "#/definitions/NotAReference"}],
            "default": {"$ref": "#/definitions/Nope"},
            "oneOf": [{"$ref": "other.json#/definitions/Remote"}]
        });
        assert!(extract_references(&schema).is_empty());
    }

    #[test]
    fn test_unevaluated_keywords_are_skipped() {
        let schema = json!({
            "patternProperties": {"^x": {"$ref": "#/definitions/P"}},
            "dependencies": {"a": {"$ref": "#/definitions/D"}},
            "definitions": {"Local": {"$ref": "#/definitions/Kept"}}
        });
        assert_eq!(strings(&extract_references(&schema)), vec!["/definitions/Kept"]);
    }

    #[test]
    fn test_property_named_ref_is_a_schema_position() {
        let schema = json!({"properties": {"$ref": {"$ref": "#/definitions/Named"}}});
        assert_eq!(strings(&extract_references(&schema)), vec!["/definitions/Named"]);
    }
}
