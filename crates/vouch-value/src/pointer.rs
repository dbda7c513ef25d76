use core::fmt::Display;
use core::str::FromStr;

use percent_encoding::percent_decode_str;
use serde_json::Value;
use thiserror::Error;
use thisisplural::Plural;

/// An RFC 6901 JSON pointer, stored as unescaped reference tokens.
///
/// The empty pointer addresses the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Plural)]
pub struct JsonPointer(pub Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("JSON pointer must be empty or start with '/': {0:?}")]
    MissingLeadingSlash(String),

    #[error("invalid escape sequence in JSON pointer: {0:?}")]
    InvalidEscape(String),

    #[error("not a local fragment reference: {0:?}")]
    NotAFragment(String),

    #[error("fragment does not percent-decode to UTF-8: {0:?}")]
    InvalidPercentEncoding(String),
}

impl JsonPointer {
    /// The pointer to the document root.
    pub fn root() -> Self {
        JsonPointer(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Parse the string form, e.g. `/definitions/a~1b`.
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash(s.to_string()));
        };
        rest.split('/')
            .map(|token| unescape(token).ok_or_else(|| PointerError::InvalidEscape(s.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(JsonPointer)
    }

    /// Parse a local `$ref` target of the form `#/path/to/node`.
    ///
    /// The `#` marker is stripped, so `#/definitions/A` and the schema pointer
    /// `/definitions/A` compare equal. `%XX` escapes are decoded before the
    /// pointer is parsed (RFC 6901, section 6).
    pub fn from_fragment(reference: &str) -> Result<Self, PointerError> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(PointerError::NotAFragment(reference.to_string()));
        };
        let decoded = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|_| PointerError::InvalidPercentEncoding(reference.to_string()))?;
        Self::parse(&decoded)
    }

    /// Pointer to a named child (object member or keyword).
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(token.into());
        JsonPointer(segments)
    }

    /// Pointer to an array element.
    pub fn element(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// Pointer to `keyword/index`, the address of one schema in a schema array.
    pub fn keyword_index(&self, keyword: &str, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(keyword.to_string());
        segments.push(index.to_string());
        JsonPointer(segments)
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn encloses(&self, other: &JsonPointer) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Find the node this pointer addresses inside `value`.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0.iter().try_fold(value, |current, token| match current {
            Value::Object(members) => members.get(token),
            Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for JsonPointer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for token in &self.0 {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

fn unescape(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

// Array indices have no leading zeros, except for "0" itself.
fn parse_index(token: &str) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_root() {
        assert_eq!(JsonPointer::root().to_string(), "");
    }

    #[test]
    fn test_display_escapes() {
        let pointer = JsonPointer::root().child("a/b").child("m~n");
        assert_eq!(pointer.to_string(), "/a~1b/m~0n");
    }

    #[test]
    fn test_parse_roundtrip_with_escapes() {
        let pointer = JsonPointer::parse("/a~1b/m~0n/0").unwrap();
        assert_eq!(pointer.segments(), ["a/b", "m~n", "0"]);
        assert_eq!(pointer.to_string(), "/a~1b/m~0n/0");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            JsonPointer::parse("a/b"),
            Err(PointerError::MissingLeadingSlash("a/b".to_string()))
        );
        assert!(matches!(
            JsonPointer::parse("/a~2"),
            Err(PointerError::InvalidEscape(_))
        ));
    }

    #[test]
    fn test_from_fragment_strips_marker() {
        let pointer = JsonPointer::from_fragment("#/definitions/A").unwrap();
        assert_eq!(pointer.to_string(), "/definitions/A");
        assert_eq!(JsonPointer::from_fragment("#").unwrap(), JsonPointer::root());
        assert!(matches!(
            JsonPointer::from_fragment("other.json#/x"),
            Err(PointerError::NotAFragment(_))
        ));
    }

    #[test]
    fn test_from_fragment_percent_decodes() {
        let pointer = JsonPointer::from_fragment("#/definitions/a%20b").unwrap();
        assert_eq!(pointer.segments(), ["definitions", "a b"]);
        // Decoding happens before `~` unescaping.
        let pointer = JsonPointer::from_fragment("#/a%7E1b").unwrap();
        assert_eq!(pointer.segments(), ["a/b"]);
        assert!(matches!(
            JsonPointer::from_fragment("#/%FF"),
            Err(PointerError::InvalidPercentEncoding(_))
        ));
    }

    #[test]
    fn test_keyword_index() {
        let pointer = JsonPointer::parse("/properties/x").unwrap();
        assert_eq!(pointer.keyword_index("oneOf", 2).to_string(), "/properties/x/oneOf/2");
    }

    #[test]
    fn test_encloses() {
        let a = JsonPointer::parse("/definitions/A").unwrap();
        let nested = JsonPointer::parse("/definitions/A/properties/x").unwrap();
        let sibling = JsonPointer::parse("/definitions/AB").unwrap();
        assert!(a.encloses(&a));
        assert!(a.encloses(&nested));
        assert!(!nested.encloses(&a));
        assert!(!a.encloses(&sibling));
        assert!(JsonPointer::root().encloses(&sibling));
    }

    #[test]
    fn test_resolve() {
        let doc = json!({"definitions": {"A": {"items": [{"type": "string"}]}}});
        let pointer = JsonPointer::parse("/definitions/A/items/0/type").unwrap();
        assert_eq!(pointer.resolve(&doc), Some(&json!("string")));
        assert_eq!(JsonPointer::parse("/definitions/B").unwrap().resolve(&doc), None);
        assert_eq!(
            JsonPointer::parse("/definitions/A/items/00").unwrap().resolve(&doc),
            None
        );
        assert_eq!(JsonPointer::root().resolve(&doc), Some(&doc));
    }
}
