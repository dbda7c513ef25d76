//! Value model shared by the vouch validators.
//!
//! Instances and schemas are plain [`serde_json::Value`]s. This crate adds the
//! pieces a validator needs on top of them:
//!
//! - [`CanonicalValue`]: a hashable, totally ordered form used for deep equality
//! - [`ValueSet`]: a deduplicated set of permitted values (the `enum` keyword)
//! - [`JsonPointer`]: RFC 6901 pointers for locating nodes in schemas and instances
//! - [`ValueKind`]: the draft-v4 primitive type names

/// Canonical form of JSON values for structural equality and hashing.
pub mod canonical;

/// Primitive type names of the JSON data model.
pub mod kind;

/// RFC 6901 JSON pointers.
pub mod pointer;

/// Deduplicated sets of JSON values.
pub mod set;

pub use canonical::{CanonicalNumber, CanonicalValue, NumericEquality, deep_equal};
pub use kind::ValueKind;
pub use pointer::{JsonPointer, PointerError};
pub use set::ValueSet;
