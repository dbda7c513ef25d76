//! Validation error types
//!
//! Two categories of errors:
//! - `ValidationError`: instance mismatches accumulated in a report (non-fatal)
//! - `ProcessingError`: problems that abort the whole validation call

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use thiserror::Error;
use vouch_value::{JsonPointer, ValueKind};

use crate::error::{SchemaError, location};

// =============================================================================
// ProcessingError (fail-fast)
// =============================================================================

/// Errors that stop validation immediately.
///
/// These point at a broken schema or a broken invariant, not at a mismatch in
/// the instance being validated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    #[error("oneOf at {} cannot attribute the match: {source}", location(schema))]
    AttributionAmbiguity {
        schema: JsonPointer,
        source: AmbiguousAttribution,
    },

    #[error("reference chain at {} exceeded {depth} hops without consuming the instance", location(schema))]
    ReferenceDepthExceeded { schema: JsonPointer, depth: usize },

    #[error("no compiled schema at {}", location(pointer))]
    UnknownSchemaNode { pointer: JsonPointer },

    #[error("schema at {} has no \"{keyword}\" keyword", location(pointer))]
    MissingKeyword {
        keyword: &'static str,
        pointer: JsonPointer,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// More than one referenced definition was never the source of a failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("references {} all validated the instance", join(survivors))]
pub struct AmbiguousAttribution {
    pub survivors: Vec<JsonPointer>,
}

// =============================================================================
// ValidationError (accumulated)
// =============================================================================

/// Pointer-keyed reports of the sub-schemas of a composition keyword.
pub type SubReports = IndexMap<JsonPointer, Vec<ValidationError>>;

/// One failure of an instance against a schema node.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {}", location(instance))]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Location in the instance.
    pub instance: JsonPointer,
    /// Schema node whose keyword raised the failure.
    pub schema: JsonPointer,
    /// Reference targets followed to reach `schema`, outermost first.
    pub via: Vec<JsonPointer>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("instance type ({actual}) does not match any allowed primitive type (allowed: {})", join(expected))]
    TypeMismatch {
        expected: Vec<ValueKind>,
        actual: ValueKind,
    },

    #[error("instance does not match any enumerated element")]
    EnumMismatch { allowed: Value },

    #[error("instance failed to match exactly one schema (matched {matched} out of {total})")]
    OneOfFailed {
        matched: usize,
        total: usize,
        reports: SubReports,
        matching: Option<JsonPointer>,
    },

    #[error("instance failed to match at least one required schema among {total}")]
    AnyOfFailed { total: usize, reports: SubReports },

    #[error("instance failed to match all required schemas (matched only {matched} out of {total})")]
    AllOfFailed {
        matched: usize,
        total: usize,
        reports: SubReports,
    },

    #[error("instance matched a schema which it should not have")]
    NotFailed,

    #[error("object has missing required properties ({})", quoted(missing))]
    MissingRequired {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error("object instance has properties which are not allowed by the schema: {}", quoted(unwanted))]
    AdditionalProperties { unwanted: Vec<String> },

    #[error("array instance has more items than allowed by the schema (allowed: {allowed}, found: {found})")]
    AdditionalItems { allowed: usize, found: usize },

    #[error("array is too short: must have at least {min} elements but instance has {found} elements")]
    MinItems { min: u64, found: usize },

    #[error("array is too long: must have at most {max} elements but instance has {found} elements")]
    MaxItems { max: u64, found: usize },

    #[error("array must not contain duplicate elements")]
    UniqueItems,

    #[error("{}", minimum_message(*minimum, *exclusive, *found))]
    Minimum {
        minimum: f64,
        exclusive: bool,
        found: f64,
    },

    #[error("{}", maximum_message(*maximum, *exclusive, *found))]
    Maximum {
        maximum: f64,
        exclusive: bool,
        found: f64,
    },

    #[error("remainder of division is not zero ({found} / {divisor})")]
    MultipleOf { divisor: f64, found: f64 },

    #[error("string is too short (length: {found}, required minimum: {min})")]
    MinLength { min: u64, found: usize },

    #[error("string is too long (length: {found}, maximum allowed: {max})")]
    MaxLength { max: u64, found: usize },

    #[error("ECMA 262 regex \"{pattern}\" does not match input string \"{found}\"")]
    Pattern { pattern: String, found: String },
}

fn join(pointers_or_kinds: &[impl ToString]) -> String {
    pointers_or_kinds
        .iter()
        .map(|item| format!("\"{}\"", item.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quoted(names: &[String]) -> String {
    join(names)
}

fn minimum_message(minimum: f64, exclusive: bool, found: f64) -> String {
    if exclusive {
        format!("numeric instance is not strictly greater than the required minimum {minimum}")
    } else {
        format!("numeric instance is lower than the required minimum (minimum: {minimum}, found: {found})")
    }
}

fn maximum_message(maximum: f64, exclusive: bool, found: f64) -> String {
    if exclusive {
        format!("numeric instance is not strictly lower than the required maximum {maximum}")
    } else {
        format!("numeric instance is greater than the required maximum (maximum: {maximum}, found: {found})")
    }
}

impl ValidationErrorKind {
    /// The schema keyword that raised this failure.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type",
            Self::EnumMismatch { .. } => "enum",
            Self::OneOfFailed { .. } => "oneOf",
            Self::AnyOfFailed { .. } => "anyOf",
            Self::AllOfFailed { .. } => "allOf",
            Self::NotFailed => "not",
            Self::MissingRequired { .. } => "required",
            Self::AdditionalProperties { .. } => "additionalProperties",
            Self::AdditionalItems { .. } => "additionalItems",
            Self::MinItems { .. } => "minItems",
            Self::MaxItems { .. } => "maxItems",
            Self::UniqueItems => "uniqueItems",
            Self::Minimum { .. } => "minimum",
            Self::Maximum { .. } => "maximum",
            Self::MultipleOf { .. } => "multipleOf",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Pattern { .. } => "pattern",
        }
    }

    /// Sub-schema reports carried by composition failures.
    pub fn nested_reports(&self) -> Option<&SubReports> {
        match self {
            Self::OneOfFailed { reports, .. }
            | Self::AnyOfFailed { reports, .. }
            | Self::AllOfFailed { reports, .. } => Some(reports),
            _ => None,
        }
    }

    /// Keyword-specific message arguments, as rendered by `to_json`.
    fn arguments(&self) -> Map<String, Value> {
        let arguments = match self {
            Self::TypeMismatch { expected, actual } => json!({
                "found": actual.as_str(),
                "expected": expected.iter().map(ValueKind::as_str).collect::<Vec<_>>(),
            }),
            Self::EnumMismatch { allowed } => json!({ "enum": allowed }),
            Self::OneOfFailed {
                matched,
                total,
                reports,
                matching,
            } => json!({
                "matched": matched,
                "nrSchemas": total,
                "reports": reports_to_json(reports),
                "matching": matching.as_ref().map(ToString::to_string),
            }),
            Self::AnyOfFailed { total, reports } => json!({
                "nrSchemas": total,
                "reports": reports_to_json(reports),
            }),
            Self::AllOfFailed {
                matched,
                total,
                reports,
            } => json!({
                "matched": matched,
                "nrSchemas": total,
                "reports": reports_to_json(reports),
            }),
            Self::NotFailed | Self::UniqueItems => json!({}),
            Self::MissingRequired { required, missing } => {
                json!({ "required": required, "missing": missing })
            }
            Self::AdditionalProperties { unwanted } => json!({ "unwanted": unwanted }),
            Self::AdditionalItems { allowed, found } => {
                json!({ "allowed": allowed, "found": found })
            }
            Self::MinItems { min, found } | Self::MinLength { min, found } => {
                json!({ "minimum": min, "found": found })
            }
            Self::MaxItems { max, found } | Self::MaxLength { max, found } => {
                json!({ "maximum": max, "found": found })
            }
            Self::Minimum {
                minimum,
                exclusive,
                found,
            } => json!({ "minimum": minimum, "exclusiveMinimum": exclusive, "found": found }),
            Self::Maximum {
                maximum,
                exclusive,
                found,
            } => json!({ "maximum": maximum, "exclusiveMaximum": exclusive, "found": found }),
            Self::MultipleOf { divisor, found } => json!({ "divisor": divisor, "found": found }),
            Self::Pattern { pattern, found } => json!({ "regex": pattern, "string": found }),
        };
        match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

fn reports_to_json(reports: &SubReports) -> Value {
    Value::Object(
        reports
            .iter()
            .map(|(pointer, errors)| {
                (
                    pointer.to_string(),
                    Value::Array(errors.iter().map(ValidationError::to_json).collect()),
                )
            })
            .collect(),
    )
}

impl ValidationError {
    /// Machine-readable form of this error, for report formatters.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("keyword".to_string(), json!(self.kind.keyword()));
        object.insert("message".to_string(), json!(self.kind.to_string()));
        object.insert(
            "instance".to_string(),
            json!({ "pointer": self.instance.to_string() }),
        );
        object.insert(
            "schema".to_string(),
            json!({ "pointer": self.schema.to_string() }),
        );
        if !self.via.is_empty() {
            object.insert(
                "via".to_string(),
                json!(self.via.iter().map(ToString::to_string).collect::<Vec<_>>()),
            );
        }
        object.extend(self.kind.arguments());
        Value::Object(object)
    }

    /// Schema pointers this failure is attributed to: the raising node and
    /// every reference target followed on the way there.
    pub fn identities(&self) -> impl Iterator<Item = &JsonPointer> {
        core::iter::once(&self.schema).chain(self.via.iter())
    }

    /// `identities` of this failure followed by those of every failure in
    /// its nested reports, depth first.
    pub fn source_identities(&self) -> Vec<&JsonPointer> {
        let mut identities: Vec<&JsonPointer> = self.identities().collect();
        if let Some(reports) = self.kind.nested_reports() {
            for error in reports.values().flatten() {
                identities.extend(error.source_identities());
            }
        }
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(s: &str) -> JsonPointer {
        JsonPointer::parse(s).unwrap()
    }

    #[test]
    fn test_enum_message() {
        let error = ValidationError {
            kind: ValidationErrorKind::EnumMismatch {
                allowed: json!([1, 2]),
            },
            instance: JsonPointer::root(),
            schema: JsonPointer::root(),
            via: Vec::new(),
        };
        assert_eq!(
            error.to_string(),
            "instance does not match any enumerated element at (root)"
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let kind = ValidationErrorKind::TypeMismatch {
            expected: vec![ValueKind::String, ValueKind::Null],
            actual: ValueKind::Integer,
        };
        assert_eq!(
            kind.to_string(),
            "instance type (integer) does not match any allowed primitive type (allowed: \"string\", \"null\")"
        );
    }

    #[test]
    fn test_minimum_messages() {
        let inclusive = ValidationErrorKind::Minimum {
            minimum: 3.0,
            exclusive: false,
            found: 1.5,
        };
        assert_eq!(
            inclusive.to_string(),
            "numeric instance is lower than the required minimum (minimum: 3, found: 1.5)"
        );
        let exclusive = ValidationErrorKind::Minimum {
            minimum: 3.0,
            exclusive: true,
            found: 3.0,
        };
        assert_eq!(
            exclusive.to_string(),
            "numeric instance is not strictly greater than the required minimum 3"
        );
    }

    #[test]
    fn test_one_of_to_json() {
        let mut reports = SubReports::new();
        reports.insert(
            pointer("/oneOf/0"),
            vec![ValidationError {
                kind: ValidationErrorKind::TypeMismatch {
                    expected: vec![ValueKind::String],
                    actual: ValueKind::Integer,
                },
                instance: JsonPointer::root(),
                schema: pointer("/definitions/A"),
                via: vec![pointer("/definitions/A")],
            }],
        );
        reports.insert(pointer("/oneOf/1"), Vec::new());
        let error = ValidationError {
            kind: ValidationErrorKind::OneOfFailed {
                matched: 0,
                total: 2,
                reports,
                matching: Some(pointer("/definitions/B")),
            },
            instance: pointer("/shape"),
            schema: JsonPointer::root(),
            via: Vec::new(),
        };

        let json = error.to_json();
        assert_eq!(json["keyword"], "oneOf");
        assert_eq!(
            json["message"],
            "instance failed to match exactly one schema (matched 0 out of 2)"
        );
        assert_eq!(json["instance"]["pointer"], "/shape");
        assert_eq!(json["matched"], 0);
        assert_eq!(json["nrSchemas"], 2);
        assert_eq!(json["matching"], "/definitions/B");
        assert_eq!(json["reports"]["/oneOf/1"], json!([]));
        assert_eq!(json["reports"]["/oneOf/0"][0]["schema"]["pointer"], "/definitions/A");
        assert_eq!(json["reports"]["/oneOf/0"][0]["via"], json!(["/definitions/A"]));
        assert!(json.get("via").is_none());
    }

    #[test]
    fn test_identities_include_via() {
        let error = ValidationError {
            kind: ValidationErrorKind::NotFailed,
            instance: JsonPointer::root(),
            schema: pointer("/definitions/C/not"),
            via: vec![pointer("/definitions/A"), pointer("/definitions/C")],
        };
        let identities: Vec<String> = error.identities().map(ToString::to_string).collect();
        assert_eq!(
            identities,
            vec!["/definitions/C/not", "/definitions/A", "/definitions/C"]
        );
    }

    #[test]
    fn test_source_identities_descend_into_reports() {
        let mut reports = SubReports::new();
        reports.insert(
            pointer("/anyOf/0"),
            vec![ValidationError {
                kind: ValidationErrorKind::NotFailed,
                instance: JsonPointer::root(),
                schema: pointer("/definitions/X/not"),
                via: vec![pointer("/definitions/X")],
            }],
        );
        let error = ValidationError {
            kind: ValidationErrorKind::AnyOfFailed { total: 1, reports },
            instance: JsonPointer::root(),
            schema: pointer("/definitions/U"),
            via: vec![pointer("/definitions/U")],
        };
        let identities: Vec<String> = error
            .source_identities()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            identities,
            vec![
                "/definitions/U",
                "/definitions/U",
                "/definitions/X/not",
                "/definitions/X"
            ]
        );
    }

    #[test]
    fn test_ambiguity_message() {
        let error = ProcessingError::AttributionAmbiguity {
            schema: JsonPointer::root(),
            source: AmbiguousAttribution {
                survivors: vec![pointer("/definitions/A"), pointer("/definitions/B")],
            },
        };
        assert_eq!(
            error.to_string(),
            "oneOf at (root) cannot attribute the match: references \"/definitions/A\", \"/definitions/B\" all validated the instance"
        );
    }
}
