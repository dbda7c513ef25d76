//! Compiled schema documents
//!
//! A [`SchemaDocument`] owns the schema value and, for every schema node
//! reachable from the root, the keyword validators compiled for it. Nodes are
//! addressed by their JSON pointer, the same pointer that validation errors
//! report as the failing schema location.

use ahash::RandomState;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use vouch_value::JsonPointer;

use crate::build;
use crate::config::ValidatorOptions;
use crate::error::SchemaError;
use crate::validate::KeywordValidator;

/// Keywords whose value is an object mapping names to schemas.
pub(crate) const SCHEMA_MAP_KEYWORDS: [&str; 3] = ["properties", "patternProperties", "definitions"];

/// Keywords whose value is an array of schemas.
pub(crate) const SCHEMA_ARRAY_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// The keyword validators of one schema node, in evaluation order.
#[derive(Debug, Default)]
pub struct CompiledNode {
    pub validators: Vec<Box<dyn KeywordValidator>>,
}

impl CompiledNode {
    /// Keywords handled by this node, in evaluation order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.iter().map(|v| v.keyword())
    }
}

#[derive(Debug)]
pub struct SchemaDocument {
    root: Value,
    nodes: IndexMap<JsonPointer, CompiledNode, RandomState>,
    options: ValidatorOptions,
}

impl SchemaDocument {
    /// Compile every schema node reachable from the root.
    pub fn compile(root: Value, options: ValidatorOptions) -> Result<Self, SchemaError> {
        let nodes = build::compile(&root, &options)?;
        Ok(Self {
            root,
            nodes,
            options,
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// The raw schema value at `pointer`.
    pub fn resolve(&self, pointer: &JsonPointer) -> Option<&Value> {
        pointer.resolve(&self.root)
    }

    /// The compiled node at `pointer`, if that location holds a reachable schema.
    pub fn node(&self, pointer: &JsonPointer) -> Option<&CompiledNode> {
        self.nodes.get(pointer)
    }

    /// Pointers of all compiled nodes, in compilation order.
    pub fn pointers(&self) -> impl Iterator<Item = &JsonPointer> {
        self.nodes.keys()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Direct sub-schemas of a schema object, with their pointers.
///
/// Keywords holding a value of the wrong JSON type are skipped here; the
/// keyword's own compiler reports them.
pub(crate) fn subschemas<'v>(
    members: &'v Map<String, Value>,
    pointer: &JsonPointer,
) -> Vec<(JsonPointer, &'v Value)> {
    let mut children = Vec::new();

    for keyword in SCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(map)) = members.get(keyword) {
            let base = pointer.child(keyword);
            children.extend(map.iter().map(|(name, schema)| (base.child(name.as_str()), schema)));
        }
    }

    for keyword in SCHEMA_ARRAY_KEYWORDS {
        if let Some(Value::Array(schemas)) = members.get(keyword) {
            children.extend(
                schemas
                    .iter()
                    .enumerate()
                    .map(|(i, schema)| (pointer.keyword_index(keyword, i), schema)),
            );
        }
    }

    match members.get("items") {
        Some(schema @ Value::Object(_)) => children.push((pointer.child("items"), schema)),
        Some(Value::Array(schemas)) => children.extend(
            schemas
                .iter()
                .enumerate()
                .map(|(i, schema)| (pointer.keyword_index("items", i), schema)),
        ),
        _ => {}
    }

    for keyword in ["additionalProperties", "additionalItems"] {
        if let Some(schema @ Value::Object(_)) = members.get(keyword) {
            children.push((pointer.child(keyword), schema));
        }
    }

    if let Some(schema) = members.get("not") {
        children.push((pointer.child("not"), schema));
    }

    if let Some(Value::Object(dependencies)) = members.get("dependencies") {
        let base = pointer.child("dependencies");
        children.extend(
            dependencies
                .iter()
                .filter(|(_, dependency)| dependency.is_object())
                .map(|(name, schema)| (base.child(name.as_str()), schema)),
        );
    }

    children
}
