//! Object and array keyword validators
//!
//! Contains validators for:
//! - Objects: `properties` with `additionalProperties`, `required`
//! - Arrays: `items` with `additionalItems`, `minItems`, `maxItems`, `uniqueItems`

use ahash::{HashSet, HashSetExt};
use indexmap::IndexMap;
use serde_json::Value;
use vouch_value::{CanonicalValue, JsonPointer};

use super::context::{ProcessingReport, ValidationData};
use super::error::{ProcessingError, ValidationErrorKind};
use super::{KeywordValidator, Processor};

/// What `additionalProperties` or `additionalItems` says about members
/// not covered by the main keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    Allowed,
    Forbidden,
    Schema(JsonPointer),
}

// =============================================================================
// PropertiesValidator
// =============================================================================

#[derive(Debug)]
pub struct PropertiesValidator {
    /// `properties` or `additionalProperties`, whichever the node declares first.
    pub keyword: &'static str,
    pub properties: IndexMap<String, JsonPointer>,
    pub additional: Additional,
}

impl KeywordValidator for PropertiesValidator {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::Object(members) = data.instance else {
            return Ok(());
        };

        let mut unwanted = Vec::new();
        for (name, member) in members {
            let schema = match (self.properties.get(name), &self.additional) {
                (Some(schema), _) | (None, Additional::Schema(schema)) => schema,
                (None, Additional::Allowed) => continue,
                (None, Additional::Forbidden) => {
                    unwanted.push(name.clone());
                    continue;
                }
            };
            processor.process(
                report,
                &data.with_instance_child(name.as_str(), member, schema.clone()),
            )?;
        }

        if !unwanted.is_empty() {
            report.log(data.error(ValidationErrorKind::AdditionalProperties { unwanted }));
        }
        Ok(())
    }
}

// =============================================================================
// RequiredValidator
// =============================================================================

#[derive(Debug)]
pub struct RequiredValidator {
    pub required: Vec<String>,
}

impl KeywordValidator for RequiredValidator {
    fn keyword(&self) -> &'static str {
        "required"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::Object(members) = data.instance else {
            return Ok(());
        };
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !members.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            report.log(data.error(ValidationErrorKind::MissingRequired {
                required: self.required.clone(),
                missing,
            }));
        }
        Ok(())
    }
}

// =============================================================================
// ItemsValidator
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema for every element.
    Single(JsonPointer),
    /// Positional schemas; elements past the end fall to `additionalItems`.
    Tuple(Vec<JsonPointer>),
}

#[derive(Debug)]
pub struct ItemsValidator {
    pub items: Items,
    pub additional: Additional,
}

impl KeywordValidator for ItemsValidator {
    fn keyword(&self) -> &'static str {
        "items"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::Array(elements) = data.instance else {
            return Ok(());
        };

        match &self.items {
            Items::Single(schema) => {
                for (index, element) in elements.iter().enumerate() {
                    processor.process(
                        report,
                        &data.with_instance_child(index.to_string(), element, schema.clone()),
                    )?;
                }
            }
            Items::Tuple(schemas) => {
                for (index, element) in elements.iter().enumerate() {
                    let schema = match (schemas.get(index), &self.additional) {
                        (Some(schema), _) | (None, Additional::Schema(schema)) => schema,
                        (None, Additional::Allowed | Additional::Forbidden) => break,
                    };
                    processor.process(
                        report,
                        &data.with_instance_child(index.to_string(), element, schema.clone()),
                    )?;
                }
                if self.additional == Additional::Forbidden && elements.len() > schemas.len() {
                    report.log(data.error(ValidationErrorKind::AdditionalItems {
                        allowed: schemas.len(),
                        found: elements.len(),
                    }));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Array size and uniqueness
// =============================================================================

#[derive(Debug)]
pub struct MinItemsValidator {
    pub min: u64,
}

impl KeywordValidator for MinItemsValidator {
    fn keyword(&self) -> &'static str {
        "minItems"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        if let Value::Array(elements) = data.instance
            && (elements.len() as u64) < self.min
        {
            report.log(data.error(ValidationErrorKind::MinItems {
                min: self.min,
                found: elements.len(),
            }));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MaxItemsValidator {
    pub max: u64,
}

impl KeywordValidator for MaxItemsValidator {
    fn keyword(&self) -> &'static str {
        "maxItems"
    }

    fn validate(
        &self,
        _processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        if let Value::Array(elements) = data.instance
            && (elements.len() as u64) > self.max
        {
            report.log(data.error(ValidationErrorKind::MaxItems {
                max: self.max,
                found: elements.len(),
            }));
        }
        Ok(())
    }
}

/// Only compiled for `uniqueItems: true`.
#[derive(Debug)]
pub struct UniqueItemsValidator;

impl KeywordValidator for UniqueItemsValidator {
    fn keyword(&self) -> &'static str {
        "uniqueItems"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let Value::Array(elements) = data.instance else {
            return Ok(());
        };
        let equality = processor.options().numeric_equality;
        let mut seen = HashSet::with_capacity(elements.len());
        let unique = elements
            .iter()
            .all(|element| seen.insert(CanonicalValue::from_json(element, equality)));
        if !unique {
            report.log(data.error(ValidationErrorKind::UniqueItems));
        }
        Ok(())
    }
}
