//! `$ref` validator

use vouch_value::JsonPointer;

use super::context::{ProcessingReport, ValidationData};
use super::error::ProcessingError;
use super::{KeywordValidator, Processor};

/// Applies the schema a local reference points to.
///
/// The target was resolved when the schema was compiled. Following it pushes
/// the target onto `via`, which is what lets failures deep inside a
/// definition be traced back to that definition.
#[derive(Debug)]
pub struct ReferenceValidator {
    pub target: JsonPointer,
}

impl KeywordValidator for ReferenceValidator {
    fn keyword(&self) -> &'static str {
        "$ref"
    }

    fn validate(
        &self,
        processor: &Processor<'_>,
        report: &mut dyn ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingError> {
        let max_depth = processor.options().max_ref_depth;
        if data.ref_hops >= max_depth {
            return Err(ProcessingError::ReferenceDepthExceeded {
                schema: data.schema_pointer.clone(),
                depth: max_depth,
            });
        }
        processor.process(report, &data.through_reference(&self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorOptions;
    use crate::schema::SchemaDocument;
    use crate::validate::context::ListReport;
    use serde_json::{Value, json};

    fn process(schema: Value, instance: Value) -> Result<ListReport, ProcessingError> {
        let document = SchemaDocument::compile(schema, ValidatorOptions::default()).unwrap();
        let mut report = ListReport::new();
        Processor::new(&document).process(&mut report, &ValidationData::new(&instance))?;
        Ok(report)
    }

    #[test]
    fn test_failure_carries_via() {
        let schema = json!({
            "definitions": {"Name": {"type": "string"}},
            "$ref": "#/definitions/Name"
        });
        let report = process(schema, json!(5)).unwrap();
        let error = &report.errors()[0];
        assert_eq!(error.schema.to_string(), "/definitions/Name");
        assert_eq!(
            error.via,
            vec![JsonPointer::parse("/definitions/Name").unwrap()]
        );
    }

    #[test]
    fn test_siblings_are_ignored() {
        let schema = json!({
            "definitions": {"Any": {}},
            "$ref": "#/definitions/Any",
            "type": "string"
        });
        assert!(process(schema, json!(5)).unwrap().is_success());
    }

    #[test]
    fn test_cycle_without_descent_is_fatal() {
        let schema = json!({
            "definitions": {
                "A": {"$ref": "#/definitions/B"},
                "B": {"$ref": "#/definitions/A"}
            },
            "$ref": "#/definitions/A"
        });
        let error = process(schema, json!(1)).unwrap_err();
        assert!(matches!(
            error,
            ProcessingError::ReferenceDepthExceeded { depth: 64, .. }
        ));
    }

    #[test]
    fn test_recursion_through_instance_terminates() {
        let schema = json!({
            "definitions": {
                "Node": {
                    "properties": {"next": {"$ref": "#/definitions/Node"}},
                    "required": ["value"]
                }
            },
            "$ref": "#/definitions/Node"
        });
        let instance = json!({"value": 1, "next": {"value": 2, "next": {"next": {}}}});
        let report = process(schema, instance).unwrap();
        let pointers: Vec<String> = report
            .errors()
            .iter()
            .map(|error| error.instance.to_string())
            .collect();
        assert_eq!(pointers, vec!["/next/next/next", "/next/next"]);
    }
}
