//! `oneOf` validator
//!
//! Every candidate is evaluated, in array order, into one shared
//! [`OutcomeTracker`]. The instance passes when exactly one candidate
//! produced no failure. Independently of pass/fail, the tracker names the
//! referenced definition that never failed, which is reported as `matching`
//! so diagnostics can say which named alternative the instance resembled.
//!
//! Every candidate failure is also handed to the enclosing report as a
//! failure identity, so a `oneOf` nested in another `oneOf` candidate still
//! falsifies the definitions it tried, even when it passes.

use tracing::{debug, trace};
use vouch_value::JsonPointer;

use crate::refs::extract_schema_array_references;

use super::context::{ProcessingReport, ValidationData};
use super::error::{ProcessingError, SubReports, ValidationErrorKind};
use super::tracker::OutcomeTracker;
use super::{KeywordValidator, Processor};

// =============================================================================
// UnionOutcome
// =============================================================================

/// Result of evaluating every candidate of a `oneOf`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionOutcome {
    /// Candidates the instance satisfied.
    pub matched: usize,
    pub total: usize,
    /// Failures of each candidate keyed by `<schema>/oneOf/<index>`; empty for successes.
    pub reports: SubReports,
    /// The referenced definition that never failed, if exactly one did.
    pub matching: Option<JsonPointer>,
}

impl UnionOutcome {
    pub fn is_success(&self) -> bool {
        self.matched == 1
    }

    fn into_error_kind(self) -> ValidationErrorKind {
        ValidationErrorKind::OneOfFailed {
            matched: self.matched,
            total: self.total,
            reports: self.reports,
            matching: self.matching,
        }
    }
}

// =============================================================================
// OneOfValidator
// =============================================================================

#[derive(Debug)]
pub struct OneOfValidator {
    pub candidates: Vec<JsonPointer>,
}

impl KeywordValidator for OneOfValidator {
    fn keyword(&self) -> &'static str {
        "oneOf"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let outcome = evaluate_one_of(processor, report, data, &self.candidates)?;
        if !outcome.is_success() {
            report.log(data.error(outcome.into_error_kind()));
        }
        Ok(())
    }
}

/// Evaluate the `oneOf` candidates of the node at `data.schema_pointer`.
///
/// Failure identities seen by the candidates are recorded into `report`;
/// nothing is logged there.
pub(crate) fn evaluate_one_of(
    processor: &Processor<'_>,
    report: &mut dyn ProcessingReport,
    data: &ValidationData<'_>,
    candidates: &[JsonPointer],
) -> Result<UnionOutcome, ProcessingError> {
    let keyword_pointer = data.schema_pointer.child("oneOf");
    let references = match processor.schema().resolve(&keyword_pointer) {
        Some(serde_json::Value::Array(schemas)) => extract_schema_array_references(schemas),
        _ => {
            return Err(ProcessingError::UnknownSchemaNode {
                pointer: keyword_pointer,
            });
        }
    };

    let mut tracker = OutcomeTracker::new(references);
    let mut reports = SubReports::with_capacity(candidates.len());
    let mut matched = 0;

    for candidate in candidates {
        tracker.begin_candidate();
        processor.process(&mut tracker, &data.for_branch(candidate.clone()))?;
        let success = tracker.success_flag();
        trace!(candidate = %candidate, success, "oneOf candidate evaluated");
        if success {
            matched += 1;
        }
        reports.insert(candidate.clone(), tracker.take_candidate_report());
    }

    for error in reports.values().flatten() {
        for identity in error.source_identities() {
            report.record_identity(identity);
        }
    }
    for identity in tracker.nested_identities() {
        report.record_identity(identity);
    }

    let matching = tracker.derive_matching().map_err(|source| {
        ProcessingError::AttributionAmbiguity {
            schema: data.schema_pointer.clone(),
            source,
        }
    })?;

    debug!(
        schema = %data.schema_pointer,
        instance = %data.instance_pointer,
        matched,
        total = candidates.len(),
        matching = ?matching.as_ref().map(ToString::to_string),
        "oneOf evaluated"
    );

    Ok(UnionOutcome {
        matched,
        total: candidates.len(),
        reports,
        matching,
    })
}
