use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// How numbers of different representations compare.
///
/// JSON does not distinguish `1` from `1.0`, but parsers do: `serde_json`
/// reads the former as an integer and the latter as a float.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericEquality {
    /// Numbers are equal when they denote the same mathematical value.
    ///
    /// `1`, `1.0` and `1e0` are all the same number.
    #[default]
    Mathematical,

    /// Integers and floats never compare equal, even when `1 == 1.0`.
    Strict,
}

/// Canonical number representation.
///
/// Floats are stored by their bit pattern so the type can be `Eq + Hash`.
/// JSON numbers are always finite, and `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalNumber {
    Integer(BigInt),
    Float(u64),
}

impl CanonicalNumber {
    pub fn from_number(number: &Number, equality: NumericEquality) -> Self {
        if let Some(i) = number.as_i64() {
            return CanonicalNumber::Integer(BigInt::from(i));
        }
        if let Some(u) = number.as_u64() {
            return CanonicalNumber::Integer(BigInt::from(u));
        }
        // Only the float representation is left.
        let float = number.as_f64().unwrap_or(f64::NAN);
        Self::from_f64(float, equality)
    }

    pub fn from_f64(float: f64, equality: NumericEquality) -> Self {
        if equality == NumericEquality::Mathematical
            && float.is_finite()
            && float.fract() == 0.0
            && let Some(int) = BigInt::from_f64(float)
        {
            return CanonicalNumber::Integer(int);
        }
        let float = if float == 0.0 { 0.0 } else { float };
        CanonicalNumber::Float(float.to_bits())
    }

    /// Whether this number is an integer under the chosen equality.
    pub fn is_integer(&self) -> bool {
        matches!(self, CanonicalNumber::Integer(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            CanonicalNumber::Integer(int) => int.to_f64().unwrap_or(f64::NAN),
            CanonicalNumber::Float(bits) => f64::from_bits(*bits),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            CanonicalNumber::Integer(int) => {
                if let Some(i) = int.to_i64() {
                    Value::from(i)
                } else if let Some(u) = int.to_u64() {
                    Value::from(u)
                } else {
                    Number::from_f64(self.to_f64())
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            CanonicalNumber::Float(bits) => Number::from_f64(f64::from_bits(*bits))
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

/// Structural, hashable view of a JSON value.
///
/// Two values are deep-equal exactly when their canonical forms are equal:
/// array element order matters, object member order does not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Number(CanonicalNumber),
    String(String),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    pub fn from_json(value: &Value, equality: NumericEquality) -> Self {
        match value {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(*b),
            Value::Number(n) => CanonicalValue::Number(CanonicalNumber::from_number(n, equality)),
            Value::String(s) => CanonicalValue::String(s.clone()),
            Value::Array(items) => CanonicalValue::Array(
                items
                    .iter()
                    .map(|item| Self::from_json(item, equality))
                    .collect(),
            ),
            Value::Object(members) => CanonicalValue::Object(
                members
                    .iter()
                    .map(|(key, member)| (key.clone(), Self::from_json(member, equality)))
                    .collect(),
            ),
        }
    }

    /// Convert back to a JSON value (object members come out sorted by key).
    pub fn to_json(&self) -> Value {
        match self {
            CanonicalValue::Null => Value::Null,
            CanonicalValue::Bool(b) => Value::Bool(*b),
            CanonicalValue::Number(n) => n.to_json(),
            CanonicalValue::String(s) => Value::String(s.clone()),
            CanonicalValue::Array(items) => {
                Value::Array(items.iter().map(CanonicalValue::to_json).collect())
            }
            CanonicalValue::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, member)| (key.clone(), member.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Deep equality of two JSON values under the given numeric equality.
pub fn deep_equal(a: &Value, b: &Value, equality: NumericEquality) -> bool {
    CanonicalValue::from_json(a, equality) == CanonicalValue::from_json(b, equality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_and_float_equal_mathematically() {
        assert!(deep_equal(&json!(1), &json!(1.0), NumericEquality::Mathematical));
        assert!(!deep_equal(&json!(1), &json!(1.5), NumericEquality::Mathematical));
    }

    #[test]
    fn test_integer_and_float_differ_strictly() {
        assert!(!deep_equal(&json!(1), &json!(1.0), NumericEquality::Strict));
        assert!(deep_equal(&json!(1.0), &json!(1.0), NumericEquality::Strict));
    }

    #[test]
    fn test_negative_zero_folds() {
        assert!(deep_equal(&json!(-0.0), &json!(0.0), NumericEquality::Strict));
        assert!(deep_equal(&json!(-0.0), &json!(0), NumericEquality::Mathematical));
    }

    #[test]
    fn test_large_unsigned_integer() {
        let max = json!(u64::MAX);
        assert!(deep_equal(&max, &max, NumericEquality::Mathematical));
        assert!(!deep_equal(&max, &json!(i64::MAX), NumericEquality::Mathematical));
    }

    #[test]
    fn test_array_order_matters() {
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1]), NumericEquality::Mathematical));
    }

    #[test]
    fn test_object_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": [true, null], "a": 1.0}"#).unwrap();
        assert!(deep_equal(&a, &b, NumericEquality::Mathematical));
        assert!(!deep_equal(&a, &b, NumericEquality::Strict));
    }

    #[test]
    fn test_to_json_restores_integers() {
        let canonical = CanonicalValue::from_json(&json!([2.0, "x"]), NumericEquality::Mathematical);
        assert_eq!(canonical.to_json(), json!([2, "x"]));
    }

    #[test]
    fn test_float_is_not_integer() {
        let n = CanonicalNumber::from_f64(2.5, NumericEquality::Mathematical);
        assert!(!n.is_integer());
        let n = CanonicalNumber::from_f64(2.0, NumericEquality::Strict);
        assert!(!n.is_integer());
        assert_eq!(n.to_f64(), 2.0);
    }
}
