use ahash::RandomState;
use indexmap::IndexSet;
use serde_json::Value;

use crate::canonical::{CanonicalValue, NumericEquality};

/// A set of JSON values deduplicated by deep structural equality.
///
/// Insertion order is kept so reports list values the way the schema does.
#[derive(Debug, Clone)]
pub struct ValueSet {
    values: IndexSet<CanonicalValue, RandomState>,
    equality: NumericEquality,
}

impl ValueSet {
    pub fn from_values<'a>(
        values: impl IntoIterator<Item = &'a Value>,
        equality: NumericEquality,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|value| CanonicalValue::from_json(value, equality))
            .collect();
        Self { values, equality }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values
            .contains(&CanonicalValue::from_json(value, self.equality))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn equality(&self) -> NumericEquality {
        self.equality
    }

    /// The distinct values, in first-seen order, as JSON.
    pub fn to_json(&self) -> Value {
        Value::Array(self.values.iter().map(CanonicalValue::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicates_collapse() {
        let values = [json!(1), json!(1.0), json!("a"), json!({"x": [1]}), json!({"x": [1]})];
        let set = ValueSet::from_values(&values, NumericEquality::Mathematical);
        assert_eq!(set.len(), 3);
        let set = ValueSet::from_values(&values, NumericEquality::Strict);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_to_json_keeps_first_seen_order() {
        let values = [json!("b"), json!("a"), json!("b")];
        let set = ValueSet::from_values(&values, NumericEquality::Mathematical);
        assert_eq!(set.to_json(), json!(["b", "a"]));
    }

    #[test]
    fn test_empty_set_contains_nothing() {
        let set = ValueSet::from_values(&[], NumericEquality::Mathematical);
        assert!(set.is_empty());
        assert!(!set.contains(&Value::Null));
    }
}
