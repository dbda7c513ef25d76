//! Primitive keyword validators
//!
//! Contains validators for:
//! - `type`
//! - Numbers: `minimum`, `maximum`, `multipleOf`
//! - Strings: `minLength`, `maxLength`, `pattern`
//!
//! Number and string keywords ignore instances of other kinds.

use num_bigint::BigInt;
use num_traits::Zero;
use regex::Regex;
use serde_json::{Number, Value};
use vouch_value::{CanonicalNumber, NumericEquality, ValueKind};

use super::context::{ProcessingReport, ValidationData};
use super::error::{ProcessingError, ValidationErrorKind};
use super::{KeywordValidator, Processor};

// =============================================================================
// TypeValidator
// =============================================================================

#[derive(Debug)]
pub struct TypeValidator {
    pub expected: Vec<ValueKind>,
}

impl KeywordValidator for TypeValidator {
    fn keyword(&self) -> &'static str {
        "type"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let actual = ValueKind::of(data.instance, processor.options().numeric_equality);
        if !self.expected.iter().any(|expected| actual.satisfies(*expected)) {
            report.log(data.error(ValidationErrorKind::TypeMismatch {
                expected: self.expected.clone(),
                actual,
            }));
        }
        Ok(())
    }
}

// =============================================================================
// Number validators
// =============================================================================

#[derive(Debug)]
pub struct MinimumValidator {
    pub minimum: f64,
    pub exclusive: bool,
}

impl KeywordValidator for MinimumValidator {
    fn keyword(&self) -> &'static str {
        "minimum"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Some(found) = data.instance.as_f64() else {
            return Ok(());
        };
        let fails = if self.exclusive {
            found <= self.minimum
        } else {
            found < self.minimum
        };
        if fails {
            report.log(data.error(ValidationErrorKind::Minimum {
                minimum: self.minimum,
                exclusive: self.exclusive,
                found,
            }));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MaximumValidator {
    pub maximum: f64,
    pub exclusive: bool,
}

impl KeywordValidator for MaximumValidator {
    fn keyword(&self) -> &'static str {
        "maximum"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Some(found) = data.instance.as_f64() else {
            return Ok(());
        };
        let fails = if self.exclusive {
            found >= self.maximum
        } else {
            found > self.maximum
        };
        if fails {
            report.log(data.error(ValidationErrorKind::Maximum {
                maximum: self.maximum,
                exclusive: self.exclusive,
                found,
            }));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MultipleOfValidator {
    pub divisor: Number,
}

impl MultipleOfValidator {
    fn is_multiple(&self, found: &Number) -> bool {
        let exact = |number: &Number| {
            match CanonicalNumber::from_number(number, NumericEquality::Mathematical) {
                CanonicalNumber::Integer(integer) => Some(integer),
                CanonicalNumber::Float(_) => None,
            }
        };
        if let (Some(found), Some(divisor)) = (exact(found), exact(&self.divisor))
            && divisor != BigInt::zero()
        {
            return (found % divisor).is_zero();
        }

        let (Some(found), Some(divisor)) = (found.as_f64(), self.divisor.as_f64()) else {
            return false;
        };
        let quotient = found / divisor;
        if !quotient.is_finite() {
            return false;
        }
        // Binary fractions make 0.3 / 0.1 land just off an integer.
        (quotient - quotient.round()).abs() <= f64::EPSILON * quotient.abs().max(1.0)
    }
}

impl KeywordValidator for MultipleOfValidator {
    fn keyword(&self) -> &'static str {
        "multipleOf"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::Number(found) = data.instance else {
            return Ok(());
        };
        if !self.is_multiple(found) {
            report.log(data.error(ValidationErrorKind::MultipleOf {
                divisor: self.divisor.as_f64().unwrap_or(f64::NAN),
                found: found.as_f64().unwrap_or(f64::NAN),
            }));
        }
        Ok(())
    }
}

// =============================================================================
// String validators
// =============================================================================

/// Lengths count Unicode scalar values, not bytes.
fn char_length(s: &str) -> usize {
    s.chars().count()
}

#[derive(Debug)]
pub struct MinLengthValidator {
    pub min: u64,
}

impl KeywordValidator for MinLengthValidator {
    fn keyword(&self) -> &'static str {
        "minLength"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::String(s) = data.instance else {
            return Ok(());
        };
        let found = char_length(s);
        if (found as u64) < self.min {
            report.log(data.error(ValidationErrorKind::MinLength {
                min: self.min,
                found,
            }));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MaxLengthValidator {
    pub max: u64,
}

impl KeywordValidator for MaxLengthValidator {
    fn keyword(&self) -> &'static str {
        "maxLength"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::String(s) = data.instance else {
            return Ok(());
        };
        let found = char_length(s);
        if (found as u64) > self.max {
            report.log(data.error(ValidationErrorKind::MaxLength {
                max: self.max,
                found,
            }));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PatternValidator {
    pub pattern: Regex,
}

impl KeywordValidator for PatternValidator {
    fn keyword(&self) -> &'static str {
        "pattern"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::String(s) = data.instance else {
            return Ok(());
        };
        // Unanchored: the pattern may match anywhere in the string.
        if !self.pattern.is_match(s) {
            report.log(data.error(ValidationErrorKind::Pattern {
                pattern: self.pattern.as_str().to_string(),
                found: s.clone(),
            }));
        }
        Ok(())
    }
}
