//! Draft-v4 JSON Schema validation with `oneOf` attribution
//!
//! Schemas are compiled once into a [`Validator`]; instances are then checked
//! against it. Besides the usual pass/fail report, a failed `oneOf` names the
//! referenced definition the instance matched best, so diagnostics can point
//! at the intended alternative instead of listing every candidate.
//!
//! ```
//! use serde_json::json;
//! use vouch_schema::{Validator, ValidationErrorKind};
//!
//! let validator = Validator::new(json!({
//!     "definitions": {
//!         "Circle": {"required": ["radius"]},
//!         "Square": {"required": ["side"]}
//!     },
//!     "oneOf": [{"$ref": "#/definitions/Circle"}, {"$ref": "#/definitions/Square"}]
//! }))
//! .unwrap();
//!
//! assert!(validator.is_valid(&json!({"radius": 1})).unwrap());
//!
//! let output = validator.validate(&json!({"sides": 4})).unwrap();
//! assert!(matches!(
//!     output.errors[0].kind,
//!     ValidationErrorKind::OneOfFailed { matched: 0, total: 2, .. }
//! ));
//! ```

mod build;
pub mod config;
pub mod error;
pub mod refs;
pub mod schema;
pub mod validate;

pub use config::ValidatorOptions;
pub use error::SchemaError;
pub use refs::{ReferenceSet, extract_references, extract_schema_array_references};
pub use schema::{CompiledNode, SchemaDocument};
pub use validate::{
    AmbiguousAttribution, KeywordValidator, ListReport, OutcomeTracker, ProcessingError,
    ProcessingReport, Processor, UnionOutcome, ValidationData, ValidationError,
    ValidationErrorKind, ValidationOutput, Validator, validate,
};

pub use vouch_value::{JsonPointer, NumericEquality};
