use serde::Deserialize;
use serde_json::Value;
use vouch_schema::ValidatorOptions;

/// One schema and the instances checked against it.
///
/// Case files hold an array of groups:
///
/// ```json
/// [{
///   "description": "shapes",
///   "schema": {"oneOf": [...]},
///   "tests": [{"description": "circle", "instance": {...}, "valid": true}]
/// }]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CaseGroup {
    pub description: String,
    pub schema: Value,
    #[serde(default)]
    pub options: ValidatorOptions,
    /// Expected compile failure; the message must contain this text.
    #[serde(default)]
    pub schema_error: Option<String>,
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestCase {
    pub description: String,
    pub instance: Value,
    /// Expected validity; absent when validation is expected to abort.
    #[serde(default)]
    pub valid: Option<bool>,
    /// Expected abort; the processing error message must contain this text.
    #[serde(default)]
    pub processing_error: Option<String>,
    /// Messages of the top-level failures, in order.
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub union: Option<UnionExpectation>,
}

/// Expected outcome of the `oneOf` at `pointer` (the root when absent).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnionExpectation {
    #[serde(default)]
    pub pointer: String,
    pub matched: usize,
    /// Attributed definition pointer, or null for none.
    pub matching: Option<String>,
}
