//! `enum` validator

use vouch_value::ValueSet;

use super::context::{ProcessingReport, ValidationData};
use super::error::{ProcessingError, ValidationErrorKind};
use super::{KeywordValidator, Processor};

/// Membership of the instance in a fixed set of permitted values.
///
/// The set is canonicalized when the schema is compiled, so each check is a
/// single hash lookup of the instance's canonical form.
#[derive(Debug)]
pub struct EnumValidator {
    pub values: ValueSet,
}

impl KeywordValidator for EnumValidator {
    fn keyword(&self) -> &'static str {
        "enum"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        if !self.values.contains(data.instance) {
            report.log(data.error(ValidationErrorKind::EnumMismatch {
                allowed: self.values.to_json(),
            }));
        }
        Ok(())
    }
}
