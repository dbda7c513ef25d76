//! Schema compilation
//!
//! Walks the schema from the root, compiling every reachable node once into
//! the keyword validators the processor runs. Keywords are checked here, so a
//! malformed schema never reaches validation.

use std::collections::VecDeque;

use ahash::RandomState;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};
use vouch_value::{JsonPointer, ValueKind, ValueSet};

use crate::config::ValidatorOptions;
use crate::error::SchemaError;
use crate::schema::{CompiledNode, subschemas};
use crate::validate::KeywordValidator;
use crate::validate::composition::{AllOfValidator, AnyOfValidator, NotValidator};
use crate::validate::compound::{
    Additional, Items, ItemsValidator, MaxItemsValidator, MinItemsValidator, PropertiesValidator,
    RequiredValidator, UniqueItemsValidator,
};
use crate::validate::enumeration::EnumValidator;
use crate::validate::primitive::{
    MaxLengthValidator, MaximumValidator, MinLengthValidator, MinimumValidator,
    MultipleOfValidator, PatternValidator, TypeValidator,
};
use crate::validate::reference::ReferenceValidator;
use crate::validate::union::OneOfValidator;

type Nodes = IndexMap<JsonPointer, CompiledNode, RandomState>;

pub(crate) fn compile(root: &Value, options: &ValidatorOptions) -> Result<Nodes, SchemaError> {
    let mut nodes = Nodes::default();
    let mut pending = VecDeque::from([JsonPointer::root()]);

    while let Some(pointer) = pending.pop_front() {
        if nodes.contains_key(&pointer) {
            continue;
        }
        let Some(schema) = pointer.resolve(root) else {
            // Targets are resolved before being queued; children come from
            // the parent value itself.
            continue;
        };
        let Value::Object(members) = schema else {
            return Err(SchemaError::NotASchema {
                pointer,
                found: ValueKind::of(schema, options.numeric_equality),
            });
        };

        let ctx = BuildContext {
            root,
            pointer: &pointer,
            members,
            options,
        };
        let (node, children) = ctx.compile_node()?;
        trace!(schema = %pointer, keywords = ?node.keywords().collect::<Vec<_>>(), "compiled node");
        pending.extend(children);
        nodes.insert(pointer, node);
    }

    debug!(nodes = nodes.len(), "compiled schema");
    Ok(nodes)
}

// =============================================================================
// BuildContext
// =============================================================================

struct BuildContext<'a> {
    root: &'a Value,
    pointer: &'a JsonPointer,
    members: &'a Map<String, Value>,
    options: &'a ValidatorOptions,
}

impl BuildContext<'_> {
    /// Validators of this node, plus the nodes to compile next.
    fn compile_node(&self) -> Result<(CompiledNode, Vec<JsonPointer>), SchemaError> {
        if let Some(reference) = self.members.get("$ref") {
            let target = self.reference(reference)?;
            // Siblings of `$ref` are ignored; definitions still get compiled.
            let mut children = vec![target.clone()];
            children.extend(self.definitions());
            let node = CompiledNode {
                validators: vec![Box::new(ReferenceValidator { target })],
            };
            return Ok((node, children));
        }

        let mut validators: Vec<Box<dyn KeywordValidator>> = Vec::new();
        self.push_type(&mut validators)?;
        self.push_enum(&mut validators)?;
        self.push_number_keywords(&mut validators)?;
        self.push_string_keywords(&mut validators)?;
        self.push_array_keywords(&mut validators)?;
        self.push_object_keywords(&mut validators)?;
        self.push_compositions(&mut validators)?;

        let children = subschemas(self.members, self.pointer)
            .into_iter()
            .map(|(pointer, _)| pointer)
            .collect();
        Ok((CompiledNode { validators }, children))
    }

    fn invalid(&self, keyword: &str, expected: &'static str) -> SchemaError {
        SchemaError::InvalidKeyword {
            keyword: keyword.to_string(),
            expected,
            pointer: self.pointer.clone(),
        }
    }

    fn definitions(&self) -> Vec<JsonPointer> {
        match self.members.get("definitions") {
            Some(Value::Object(definitions)) => {
                let base = self.pointer.child("definitions");
                definitions.keys().map(|name| base.child(name.as_str())).collect()
            }
            _ => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Keyword value readers
    // -------------------------------------------------------------------------

    fn reference(&self, value: &Value) -> Result<JsonPointer, SchemaError> {
        let Value::String(reference) = value else {
            return Err(self.invalid("$ref", "a string"));
        };
        if !reference.starts_with('#') {
            return Err(SchemaError::UnsupportedReference {
                reference: reference.clone(),
                pointer: self.pointer.clone(),
            });
        }
        let target =
            JsonPointer::from_fragment(reference).map_err(|source| SchemaError::InvalidReference {
                reference: reference.clone(),
                pointer: self.pointer.clone(),
                source,
            })?;
        if target.resolve(self.root).is_none() {
            return Err(SchemaError::UnresolvedReference {
                reference: reference.clone(),
                pointer: self.pointer.clone(),
            });
        }
        Ok(target)
    }

    fn number(&self, keyword: &str) -> Result<Option<&'_ Number>, SchemaError> {
        match self.members.get(keyword) {
            None => Ok(None),
            Some(Value::Number(number)) => Ok(Some(number)),
            Some(_) => Err(self.invalid(keyword, "a number")),
        }
    }

    fn boolean(&self, keyword: &str) -> Result<bool, SchemaError> {
        match self.members.get(keyword) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(self.invalid(keyword, "a boolean")),
        }
    }

    fn bound(&self, keyword: &str) -> Result<Option<u64>, SchemaError> {
        match self.members.get(keyword) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.invalid(keyword, "a non-negative integer")),
        }
    }

    /// Pointers of the sub-schemas in an array keyword.
    fn schema_array(&self, keyword: &str) -> Result<Option<Vec<JsonPointer>>, SchemaError> {
        match self.members.get(keyword) {
            None => Ok(None),
            Some(Value::Array(schemas)) => Ok(Some(
                (0..schemas.len())
                    .map(|i| self.pointer.keyword_index(keyword, i))
                    .collect(),
            )),
            Some(_) => Err(self.invalid(keyword, "an array of schemas")),
        }
    }

    fn additional(&self, keyword: &str) -> Result<Additional, SchemaError> {
        match self.members.get(keyword) {
            None | Some(Value::Bool(true)) => Ok(Additional::Allowed),
            Some(Value::Bool(false)) => Ok(Additional::Forbidden),
            Some(Value::Object(_)) => Ok(Additional::Schema(self.pointer.child(keyword))),
            Some(_) => Err(self.invalid(keyword, "a boolean or a schema")),
        }
    }

    // -------------------------------------------------------------------------
    // Keyword groups, in evaluation order
    // -------------------------------------------------------------------------

    fn push_type(&self, validators: &mut Vec<Box<dyn KeywordValidator>>) -> Result<(), SchemaError> {
        const EXPECTED: &str = "a type name or an array of type names";
        let expected = match self.members.get("type") {
            None => return Ok(()),
            Some(Value::String(name)) => {
                vec![ValueKind::from_name(name).ok_or_else(|| self.invalid("type", EXPECTED))?]
            }
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str()
                        .and_then(ValueKind::from_name)
                        .ok_or_else(|| self.invalid("type", EXPECTED))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(self.invalid("type", EXPECTED)),
        };
        validators.push(Box::new(TypeValidator { expected }));
        Ok(())
    }

    fn push_enum(&self, validators: &mut Vec<Box<dyn KeywordValidator>>) -> Result<(), SchemaError> {
        match self.members.get("enum") {
            None => Ok(()),
            Some(Value::Array(values)) => {
                validators.push(Box::new(EnumValidator {
                    values: ValueSet::from_values(values, self.options.numeric_equality),
                }));
                Ok(())
            }
            Some(_) => Err(self.invalid("enum", "an array")),
        }
    }

    fn push_number_keywords(
        &self,
        validators: &mut Vec<Box<dyn KeywordValidator>>,
    ) -> Result<(), SchemaError> {
        let exclusive_minimum = self.boolean("exclusiveMinimum")?;
        let exclusive_maximum = self.boolean("exclusiveMaximum")?;

        if let Some(minimum) = self.number("minimum")?.and_then(Number::as_f64) {
            validators.push(Box::new(MinimumValidator {
                minimum,
                exclusive: exclusive_minimum,
            }));
        }
        if let Some(maximum) = self.number("maximum")?.and_then(Number::as_f64) {
            validators.push(Box::new(MaximumValidator {
                maximum,
                exclusive: exclusive_maximum,
            }));
        }
        if let Some(divisor) = self.number("multipleOf")? {
            if !divisor.as_f64().is_some_and(|d| d > 0.0) {
                return Err(self.invalid("multipleOf", "a number greater than 0"));
            }
            validators.push(Box::new(MultipleOfValidator {
                divisor: divisor.clone(),
            }));
        }
        Ok(())
    }

    fn push_string_keywords(
        &self,
        validators: &mut Vec<Box<dyn KeywordValidator>>,
    ) -> Result<(), SchemaError> {
        if let Some(min) = self.bound("minLength")? {
            validators.push(Box::new(MinLengthValidator { min }));
        }
        if let Some(max) = self.bound("maxLength")? {
            validators.push(Box::new(MaxLengthValidator { max }));
        }
        match self.members.get("pattern") {
            None => {}
            Some(Value::String(pattern)) => {
                let pattern = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                    pointer: self.pointer.clone(),
                    source,
                })?;
                validators.push(Box::new(PatternValidator { pattern }));
            }
            Some(_) => return Err(self.invalid("pattern", "a string")),
        }
        Ok(())
    }

    fn push_array_keywords(
        &self,
        validators: &mut Vec<Box<dyn KeywordValidator>>,
    ) -> Result<(), SchemaError> {
        let additional = self.additional("additionalItems")?;
        match self.members.get("items") {
            None => {}
            Some(Value::Object(_)) => validators.push(Box::new(ItemsValidator {
                items: Items::Single(self.pointer.child("items")),
                additional,
            })),
            Some(Value::Array(schemas)) => validators.push(Box::new(ItemsValidator {
                items: Items::Tuple(
                    (0..schemas.len())
                        .map(|i| self.pointer.keyword_index("items", i))
                        .collect(),
                ),
                additional,
            })),
            Some(_) => return Err(self.invalid("items", "a schema or an array of schemas")),
        }
        if let Some(min) = self.bound("minItems")? {
            validators.push(Box::new(MinItemsValidator { min }));
        }
        if let Some(max) = self.bound("maxItems")? {
            validators.push(Box::new(MaxItemsValidator { max }));
        }
        if self.boolean("uniqueItems")? {
            validators.push(Box::new(UniqueItemsValidator));
        }
        Ok(())
    }

    fn push_object_keywords(
        &self,
        validators: &mut Vec<Box<dyn KeywordValidator>>,
    ) -> Result<(), SchemaError> {
        let properties = match self.members.get("properties") {
            None => None,
            Some(Value::Object(properties)) => {
                let base = self.pointer.child("properties");
                Some(
                    properties
                        .keys()
                        .map(|name| (name.clone(), base.child(name.as_str())))
                        .collect::<IndexMap<_, _>>(),
                )
            }
            Some(_) => return Err(self.invalid("properties", "an object of schemas")),
        };
        let additional = self.additional("additionalProperties")?;
        match (properties, additional) {
            (None, Additional::Allowed) => {}
            (Some(properties), additional) => validators.push(Box::new(PropertiesValidator {
                keyword: "properties",
                properties,
                additional,
            })),
            (None, additional) => validators.push(Box::new(PropertiesValidator {
                keyword: "additionalProperties",
                properties: IndexMap::new(),
                additional,
            })),
        }

        match self.members.get("required") {
            None => {}
            Some(Value::Array(names)) => {
                let required = names
                    .iter()
                    .map(|name| {
                        name.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| self.invalid("required", "an array of strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                validators.push(Box::new(RequiredValidator { required }));
            }
            Some(_) => return Err(self.invalid("required", "an array of strings")),
        }
        Ok(())
    }

    fn push_compositions(
        &self,
        validators: &mut Vec<Box<dyn KeywordValidator>>,
    ) -> Result<(), SchemaError> {
        if let Some(schemas) = self.schema_array("allOf")? {
            validators.push(Box::new(AllOfValidator { schemas }));
        }
        if let Some(schemas) = self.schema_array("anyOf")? {
            validators.push(Box::new(AnyOfValidator { schemas }));
        }
        if let Some(candidates) = self.schema_array("oneOf")? {
            validators.push(Box::new(OneOfValidator { candidates }));
        }
        if self.members.contains_key("not") {
            validators.push(Box::new(NotValidator {
                schema: self.pointer.child("not"),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDocument;
    use serde_json::json;

    fn compile_error(schema: Value) -> SchemaError {
        SchemaDocument::compile(schema, ValidatorOptions::default()).unwrap_err()
    }

    fn keywords(schema: Value) -> Vec<&'static str> {
        let document = SchemaDocument::compile(schema, ValidatorOptions::default()).unwrap();
        document
            .node(&JsonPointer::root())
            .unwrap()
            .keywords()
            .collect()
    }

    #[test]
    fn test_keyword_order_is_fixed() {
        let schema = json!({
            "oneOf": [{}],
            "required": ["a"],
            "enum": [{"a": 1}],
            "type": "object",
            "not": {}
        });
        assert_eq!(keywords(schema), vec!["type", "enum", "required", "oneOf", "not"]);
    }

    #[test]
    fn test_unknown_keywords_are_ignored() {
        assert!(keywords(json!({"format": "email", "title": "x"})).is_empty());
    }

    #[test]
    fn test_ref_siblings_are_not_compiled() {
        let schema = json!({"$ref": "#/definitions/A", "type": 3, "definitions": {"A": {}}});
        assert_eq!(keywords(schema), vec!["$ref"]);
    }

    #[test]
    fn test_one_of_must_be_an_array() {
        let error = compile_error(json!({"oneOf": {"type": "string"}}));
        assert_eq!(
            error.to_string(),
            "keyword \"oneOf\" at (root) must be an array of schemas"
        );
    }

    #[test]
    fn test_empty_one_of_compiles() {
        assert_eq!(keywords(json!({"oneOf": []})), vec!["oneOf"]);
    }

    #[test]
    fn test_enum_must_be_an_array() {
        assert!(matches!(
            compile_error(json!({"enum": "red"})),
            SchemaError::InvalidKeyword { ref keyword, .. } if keyword == "enum"
        ));
    }

    #[test]
    fn test_candidate_must_be_an_object() {
        let error = compile_error(json!({"oneOf": [{}, 3]}));
        assert_eq!(error.to_string(), "schema at /oneOf/1 must be an object, got integer");
    }

    #[test]
    fn test_reference_errors() {
        assert!(matches!(
            compile_error(json!({"$ref": "other.json#/definitions/A"})),
            SchemaError::UnsupportedReference { .. }
        ));
        assert!(matches!(
            compile_error(json!({"$ref": "#/definitions/Missing"})),
            SchemaError::UnresolvedReference { .. }
        ));
        assert!(matches!(
            compile_error(json!({"$ref": "#definitions"})),
            SchemaError::InvalidReference { .. }
        ));
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(matches!(
            compile_error(json!({"minLength": -1})),
            SchemaError::InvalidKeyword { expected: "a non-negative integer", .. }
        ));
        assert!(matches!(
            compile_error(json!({"multipleOf": 0})),
            SchemaError::InvalidKeyword { expected: "a number greater than 0", .. }
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            compile_error(json!({"pattern": "("})),
            SchemaError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_definitions_are_compiled_even_if_unreferenced() {
        let error = compile_error(json!({"definitions": {"Broken": {"type": "text"}}}));
        assert!(matches!(
            error,
            SchemaError::InvalidKeyword { ref pointer, .. } if pointer.to_string() == "/definitions/Broken"
        ));
    }

    #[test]
    fn test_recursive_reference_compiles_once() {
        let schema = json!({
            "definitions": {"List": {"items": {"$ref": "#/definitions/List"}}},
            "$ref": "#/definitions/List"
        });
        let document = SchemaDocument::compile(schema, ValidatorOptions::default()).unwrap();
        assert_eq!(document.node_count(), 3);
    }
}
