//! Error types for schema compilation

use thiserror::Error;
use vouch_value::{JsonPointer, PointerError, ValueKind};

/// Errors found while compiling a schema document.
///
/// A malformed schema is rejected before any instance is looked at, so none of
/// these ever comes with a partial validation report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema at {} must be an object, got {found}", location(pointer))]
    NotASchema {
        pointer: JsonPointer,
        found: ValueKind,
    },

    #[error("keyword \"{keyword}\" at {} must be {expected}", location(pointer))]
    InvalidKeyword {
        keyword: String,
        expected: &'static str,
        pointer: JsonPointer,
    },

    #[error("unsupported non-local reference \"{reference}\" at {}", location(pointer))]
    UnsupportedReference {
        reference: String,
        pointer: JsonPointer,
    },

    #[error("invalid reference \"{reference}\" at {}: {source}", location(pointer))]
    InvalidReference {
        reference: String,
        pointer: JsonPointer,
        source: PointerError,
    },

    #[error("reference \"{reference}\" at {} does not resolve", location(pointer))]
    UnresolvedReference {
        reference: String,
        pointer: JsonPointer,
    },

    #[error("invalid regex in \"pattern\" at {}: {source}", location(pointer))]
    InvalidPattern {
        pointer: JsonPointer,
        source: regex::Error,
    },
}

/// Render a pointer for messages; the empty pointer reads as `(root)`.
pub(crate) fn location(pointer: &JsonPointer) -> String {
    if pointer.is_root() {
        "(root)".to_string()
    } else {
        pointer.to_string()
    }
}
