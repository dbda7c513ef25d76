use serde::{Deserialize, Serialize};
use vouch_value::NumericEquality;

/// Options applied when compiling and running a schema.
///
/// Deserializes from camelCase JSON; missing fields take their defaults:
///
/// ```json
/// { "numericEquality": "strict", "maxRefDepth": 32 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Number comparison used by `enum`, `uniqueItems` and integer detection.
    pub numeric_equality: NumericEquality,
    /// Consecutive `$ref` hops allowed without moving into the instance.
    pub max_ref_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            numeric_equality: NumericEquality::Mathematical,
            max_ref_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let options: ValidatorOptions =
            serde_json::from_str(r#"{"numericEquality": "strict"}"#).unwrap();
        assert_eq!(options.numeric_equality, NumericEquality::Strict);
        assert_eq!(options.max_ref_depth, 64);
    }

    #[test]
    fn test_deserialize_empty_is_default() {
        let options: ValidatorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ValidatorOptions::default());
    }

    #[test]
    fn test_reject_unknown_field() {
        let result = serde_json::from_str::<ValidatorOptions>(r#"{"draft": 4}"#);
        assert!(result.is_err());
    }
}
