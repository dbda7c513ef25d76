//! Instance validation
//!
//! # Architecture
//!
//! - `Processor`: Runs the compiled keyword validators of one schema node
//! - Keyword validators: Implement [`KeywordValidator`], one per keyword family
//! - `ProcessingReport`: Sink the validators log failures into
//!
//! # Error Handling
//!
//! Two categories of errors:
//! - `ValidationError`: Instance mismatches accumulated in a report (non-fatal)
//! - `ProcessingError`: Broken schemas or invariants causing fail-fast
//!
//! # `oneOf` attribution
//!
//! Candidates of a `oneOf` share one [`OutcomeTracker`]. Referenced
//! definitions that never fail while the candidates run are attributed as
//! the `matching` definition of the union, whether or not the union passes.

pub(crate) mod composition;
pub(crate) mod compound;
mod context;
pub(crate) mod enumeration;
mod error;
pub(crate) mod primitive;
pub(crate) mod reference;
mod tracker;
pub(crate) mod union;

pub use context::{ListReport, ProcessingReport, ValidationData, ValidationOutput};
pub use error::{
    AmbiguousAttribution, ProcessingError, SubReports, ValidationError, ValidationErrorKind,
};
pub use tracker::OutcomeTracker;
pub use union::UnionOutcome;

use serde_json::Value;
use tracing::trace;
use vouch_value::JsonPointer;

use crate::config::ValidatorOptions;
use crate::error::SchemaError;
use crate::schema::SchemaDocument;

// =============================================================================
// Public API
// =============================================================================

/// Validate an instance against a schema in one call.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let schema = json!({"enum": ["red", "green"]});
/// let output = vouch_schema::validate(&schema, &json!("blue")).unwrap();
/// assert!(!output.is_valid);
/// ```
pub fn validate(schema: &Value, instance: &Value) -> Result<ValidationOutput, ProcessingError> {
    Validator::new(schema.clone())?.validate(instance)
}

/// A compiled schema, ready to validate any number of instances.
///
/// Immutable once built; share it across threads freely.
#[derive(Debug)]
pub struct Validator {
    schema: SchemaDocument,
}

impl Validator {
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        Self::with_options(schema, ValidatorOptions::default())
    }

    pub fn with_options(schema: Value, options: ValidatorOptions) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: SchemaDocument::compile(schema, options)?,
        })
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    pub fn processor(&self) -> Processor<'_> {
        Processor::new(&self.schema)
    }

    pub fn validate(&self, instance: &Value) -> Result<ValidationOutput, ProcessingError> {
        let report = self.processor().trial(&ValidationData::new(instance))?;
        Ok(ValidationOutput::from(report))
    }

    pub fn is_valid(&self, instance: &Value) -> Result<bool, ProcessingError> {
        Ok(self.validate(instance)?.is_valid)
    }

    /// Evaluate the `oneOf` of the schema node at `schema_pointer` directly,
    /// exposing the per-candidate reports and the attributed definition even
    /// when the union passes.
    pub fn evaluate_one_of(
        &self,
        schema_pointer: &JsonPointer,
        instance: &Value,
    ) -> Result<UnionOutcome, ProcessingError> {
        let Some(Value::Array(schemas)) = self
            .schema
            .resolve(schema_pointer)
            .and_then(|schema| schema.get("oneOf"))
        else {
            return Err(ProcessingError::MissingKeyword {
                keyword: "oneOf",
                pointer: schema_pointer.clone(),
            });
        };
        let candidates: Vec<JsonPointer> = (0..schemas.len())
            .map(|i| schema_pointer.keyword_index("oneOf", i))
            .collect();
        union::evaluate_one_of(
            &self.processor(),
            &mut ListReport::new(),
            &ValidationData::at(instance, schema_pointer.clone()),
            &candidates,
        )
    }
}

// =============================================================================
// KeywordValidator
// =============================================================================

/// Validation logic for one keyword (or one family of related keywords) of a
/// compiled schema node.
pub trait KeywordValidator: core::fmt::Debug + Send + Sync {
    /// The keyword this validator was compiled from.
    fn keyword(&self) -> &'static str;

    /// Check `data.instance`, logging any failure into `report`.
    ///
    /// Returns `Err` only for problems that must abort the whole validation.
    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError>;
}

// =============================================================================
// Processor
// =============================================================================

/// Applies compiled schema nodes to instances.
#[derive(Debug, Clone, Copy)]
pub struct Processor<'s> {
    schema: &'s SchemaDocument,
}

impl<'s> Processor<'s> {
    pub fn new(schema: &'s SchemaDocument) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s SchemaDocument {
        self.schema
    }

    pub fn options(&self) -> &'s ValidatorOptions {
        self.schema.options()
    }

    /// Run every keyword of the node at `data.schema_pointer`, in order.
    pub fn process(
        &self,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let node = self.schema.node(&data.schema_pointer).ok_or_else(|| {
            ProcessingError::UnknownSchemaNode {
                pointer: data.schema_pointer.clone(),
            }
        })?;
        trace!(
            schema = %data.schema_pointer,
            instance = %data.instance_pointer,
            "processing node"
        );
        for validator in &node.validators {
            validator.validate(self, report, data)?;
        }
        Ok(())
    }

    /// Process into a fresh report, leaving the caller's report untouched.
    pub fn trial(&self, data: &ValidationData<'_>) -> Result<ListReport, ProcessingError> {
        let mut report = ListReport::new();
        self.process(&mut report, data)?;
        Ok(report)
    }
}
