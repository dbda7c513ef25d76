//! `allOf`, `anyOf` and `not` validators
//!
//! Sub-schemas run against private reports; only one aggregate failure per
//! keyword reaches the caller's report. Whatever failed inside a trial is
//! still handed to the caller as failure identities, pass or fail, so `oneOf`
//! attribution sees every definition a nested branch tried.
//!
//! `anyOf` evaluates every branch for the same reason.

use super::context::{ProcessingReport, ValidationData, forward_identities};
use super::error::{ProcessingError, SubReports, ValidationErrorKind};
use super::{KeywordValidator, Processor};
use vouch_value::JsonPointer;

// =============================================================================
// AllOfValidator
// =============================================================================

#[derive(Debug)]
pub struct AllOfValidator {
    pub schemas: Vec<JsonPointer>,
}

impl KeywordValidator for AllOfValidator {
    fn keyword(&self) -> &'static str {
        "allOf"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let mut reports = SubReports::with_capacity(self.schemas.len());
        let mut matched = 0;
        for schema in &self.schemas {
            let trial = processor.trial(&data.for_branch(schema.clone()))?;
            forward_identities(report, &trial);
            if trial.is_success() {
                matched += 1;
            }
            reports.insert(schema.clone(), trial.into_errors());
        }
        if matched != self.schemas.len() {
            report.log(data.error(ValidationErrorKind::AllOfFailed {
                matched,
                total: self.schemas.len(),
                reports,
            }));
        }
        Ok(())
    }
}

// =============================================================================
// AnyOfValidator
// =============================================================================

#[derive(Debug)]
pub struct AnyOfValidator {
    pub schemas: Vec<JsonPointer>,
}

impl KeywordValidator for AnyOfValidator {
    fn keyword(&self) -> &'static str {
        "anyOf"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let mut reports = SubReports::with_capacity(self.schemas.len());
        let mut matched = false;
        for schema in &self.schemas {
            let trial = processor.trial(&data.for_branch(schema.clone()))?;
            forward_identities(report, &trial);
            matched |= trial.is_success();
            reports.insert(schema.clone(), trial.into_errors());
        }
        if !matched {
            report.log(data.error(ValidationErrorKind::AnyOfFailed {
                total: self.schemas.len(),
                reports,
            }));
        }
        Ok(())
    }
}

// =============================================================================
// NotValidator
// =============================================================================

#[derive(Debug)]
pub struct NotValidator {
    pub schema: JsonPointer,
}

impl KeywordValidator for NotValidator {
    fn keyword(&self) -> &'static str {
        "not"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let trial = processor.trial(&data.for_branch(self.schema.clone()))?;
        forward_identities(report, &trial);
        if trial.is_success() {
            report.log(data.error(ValidationErrorKind::NotFailed));
        }
        Ok(())
    }
}
