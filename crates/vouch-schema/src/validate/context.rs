//! Validation data, report sinks and output types
//!
//! `ValidationData` is the immutable position of one validation step:
//! - The instance value and its pointer
//! - The schema node being applied
//! - The reference targets followed to get there
//!
//! `ProcessingReport` is the sink keyword validators log failures into.
//! Besides failures it can take failure identities: locations that failed
//! inside a private trial whose keyword as a whole still passed.

use serde_json::{Value, json};
use vouch_value::JsonPointer;

use super::error::{ValidationError, ValidationErrorKind};

// =============================================================================
// ValidationOutput (final result for public API)
// =============================================================================

/// Final validation output returned to callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutput {
    pub is_valid: bool,
    /// Failures logged against the root schema, in evaluation order
    pub errors: Vec<ValidationError>,
}

impl ValidationOutput {
    pub fn to_json(&self) -> Value {
        json!({
            "valid": self.is_valid,
            "errors": self.errors.iter().map(ValidationError::to_json).collect::<Vec<_>>(),
        })
    }
}

impl From<ListReport> for ValidationOutput {
    fn from(report: ListReport) -> Self {
        Self {
            is_valid: report.errors.is_empty(),
            errors: report.errors,
        }
    }
}

// =============================================================================
// ProcessingReport (failure sink)
// =============================================================================

/// Destination for failures logged while processing an instance.
pub trait ProcessingReport {
    /// Record a failure (validation continues).
    fn log(&mut self, error: ValidationError);

    /// Whether nothing has been logged into the current scope of this report.
    fn is_success(&self) -> bool;

    /// Note a schema location that failed inside a nested trial.
    ///
    /// This is not a failure of the report and never affects `is_success`.
    /// Only reports that attribute `oneOf` candidates care about it.
    fn record_identity(&mut self, _identity: &JsonPointer) {}
}

/// Hand every failure identity of a finished trial to `report`: those of
/// the logged errors (nested reports included) and those the trial was
/// handed itself.
pub(crate) fn forward_identities(report: &mut dyn ProcessingReport, trial: &ListReport) {
    for error in &trial.errors {
        for identity in error.source_identities() {
            report.record_identity(identity);
        }
    }
    for identity in &trial.identities {
        report.record_identity(identity);
    }
}

/// Plain list of failures, used for the top-level run and for the private
/// trial runs of `allOf`, `anyOf` and `not`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListReport {
    errors: Vec<ValidationError>,
    identities: Vec<JsonPointer>,
}

impl ListReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Identities recorded from nested trials that passed.
    pub fn identities(&self) -> &[JsonPointer] {
        &self.identities
    }
}

impl ProcessingReport for ListReport {
    fn log(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn record_identity(&mut self, identity: &JsonPointer) {
        if !self.identities.contains(identity) {
            self.identities.push(identity.clone());
        }
    }
}

// =============================================================================
// ValidationData (position of one step)
// =============================================================================

/// What is being validated against which schema node.
///
/// Cheap to derive a new position from; the instance is borrowed.
#[derive(Debug, Clone)]
pub struct ValidationData<'i> {
    pub instance: &'i Value,
    pub instance_pointer: JsonPointer,
    pub schema_pointer: JsonPointer,
    /// Reference targets followed to reach `schema_pointer` since the
    /// innermost enclosing composition branch, outermost first
    pub via: Vec<JsonPointer>,
    /// `$ref` hops taken since the last descent into the instance
    pub ref_hops: usize,
}

impl<'i> ValidationData<'i> {
    /// Start at the root of both the instance and the schema.
    pub fn new(instance: &'i Value) -> Self {
        Self::at(instance, JsonPointer::root())
    }

    /// Start at the root of the instance and at `schema_pointer` in the schema.
    pub fn at(instance: &'i Value, schema_pointer: JsonPointer) -> Self {
        Self {
            instance,
            instance_pointer: JsonPointer::root(),
            schema_pointer,
            via: Vec::new(),
            ref_hops: 0,
        }
    }

    /// Same instance, another schema node.
    pub fn with_schema(&self, schema_pointer: JsonPointer) -> Self {
        Self {
            instance: self.instance,
            instance_pointer: self.instance_pointer.clone(),
            schema_pointer,
            via: self.via.clone(),
            ref_hops: self.ref_hops,
        }
    }

    /// Same instance, one branch of `oneOf`, `anyOf`, `allOf` or `not`.
    ///
    /// The reference chain restarts so that failures inside the branch
    /// only name targets followed from the branch itself.
    pub fn for_branch(&self, schema_pointer: JsonPointer) -> Self {
        Self {
            via: Vec::new(),
            ..self.with_schema(schema_pointer)
        }
    }

    /// A member or element of the instance, under the schema node that applies to it.
    pub fn with_instance_child(
        &self,
        token: impl Into<String>,
        child: &'i Value,
        schema_pointer: JsonPointer,
    ) -> Self {
        Self {
            instance: child,
            instance_pointer: self.instance_pointer.child(token),
            schema_pointer,
            via: self.via.clone(),
            ref_hops: 0,
        }
    }

    /// Follow a `$ref` to `target`.
    pub fn through_reference(&self, target: &JsonPointer) -> Self {
        let mut via = self.via.clone();
        via.push(target.clone());
        Self {
            instance: self.instance,
            instance_pointer: self.instance_pointer.clone(),
            schema_pointer: target.clone(),
            via,
            ref_hops: self.ref_hops + 1,
        }
    }

    /// A failure of this instance against this schema node.
    pub fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError {
            kind,
            instance: self.instance_pointer.clone(),
            schema: self.schema_pointer.clone(),
            via: self.via.clone(),
        }
    }
}
