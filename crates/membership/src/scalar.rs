//! Permissive decoding of wire strings into typed scalars.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

/// A loosely typed value published by a remote unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Unset, empty, or an explicit YAML null.
    #[default]
    Null,

    /// `true` / `false`.
    Bool(bool),

    /// Any integer that fits in an `i64`.
    Int(i64),

    /// Floating point, including `.inf` and `.nan`.
    Float(f64),

    /// Everything else.
    String(String),
}

impl ScalarValue {
    /// Decode a wire value.
    ///
    /// `None` and the empty string decode to [`ScalarValue::Null`]. Values that YAML does
    /// not read as a scalar (parse errors, sequences, mappings, tagged values) are kept
    /// verbatim as [`ScalarValue::String`].
    pub fn decode(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::Null,
        };

        match serde_yaml::from_str::<Value>(raw) {
            Ok(Value::Null) => Self::Null,
            Ok(Value::Bool(b)) => Self::Bool(b),
            Ok(Value::Number(n)) => n.as_i64().map_or_else(
                || n.as_f64().map_or_else(|| Self::String(raw.to_string()), Self::Float),
                Self::Int,
            ),
            Ok(Value::String(s)) => yaml11_bool(raw).map_or(Self::String(s), Self::Bool),
            Ok(other) => {
                debug!("value {raw:?} is not a scalar ({other:?}), keeping raw string");
                Self::String(raw.to_string())
            }
            Err(e) => {
                debug!("value {raw:?} failed to decode ({e}), keeping raw string");
                Self::String(raw.to_string())
            }
        }
    }

    /// Whether this is the null marker.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness: null, `false`, zero and the empty string are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
        }
    }

    /// Textual form; null becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Boolean spellings peers may still emit from YAML 1.1 emitters, which YAML 1.2 reads
/// as plain strings. Only bare (unquoted) scalars qualify.
fn yaml11_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_are_null() {
        assert_eq!(ScalarValue::decode(None), ScalarValue::Null);
        assert_eq!(ScalarValue::decode(Some("")), ScalarValue::Null);
        assert_eq!(ScalarValue::decode(Some("~")), ScalarValue::Null);
        assert_eq!(ScalarValue::decode(Some("null")), ScalarValue::Null);
    }

    #[test]
    fn test_typed_scalars() {
        assert_eq!(ScalarValue::decode(Some("true")), ScalarValue::Bool(true));
        assert_eq!(ScalarValue::decode(Some("False")), ScalarValue::Bool(false));
        assert_eq!(ScalarValue::decode(Some("42")), ScalarValue::Int(42));
        assert_eq!(ScalarValue::decode(Some("-7")), ScalarValue::Int(-7));
        assert_eq!(ScalarValue::decode(Some("1.5")), ScalarValue::Float(1.5));
    }

    #[test]
    fn test_yaml11_booleans() {
        for raw in ["yes", "Yes", "YES", "on", "On", "ON"] {
            assert_eq!(ScalarValue::decode(Some(raw)), ScalarValue::Bool(true), "{raw}");
        }
        for raw in ["no", "No", "NO", "off", "Off", "OFF"] {
            assert_eq!(ScalarValue::decode(Some(raw)), ScalarValue::Bool(false), "{raw}");
        }

        // Quoting keeps the string
        assert_eq!(
            ScalarValue::decode(Some("'no'")),
            ScalarValue::String("no".to_string())
        );
        assert_eq!(
            ScalarValue::decode(Some("nope")),
            ScalarValue::String("nope".to_string())
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            ScalarValue::decode(Some("node1")),
            ScalarValue::String("node1".to_string())
        );
        assert_eq!(
            ScalarValue::decode(Some("10.0.0.1")),
            ScalarValue::String("10.0.0.1".to_string())
        );
        assert_eq!(
            ScalarValue::decode(Some("'123'")),
            ScalarValue::String("123".to_string())
        );
    }

    #[test]
    fn test_non_scalars_keep_raw_string() {
        assert_eq!(
            ScalarValue::decode(Some("[a, b]")),
            ScalarValue::String("[a, b]".to_string())
        );
        assert_eq!(
            ScalarValue::decode(Some("key: value")),
            ScalarValue::String("key: value".to_string())
        );
        assert_eq!(
            ScalarValue::decode(Some("{unclosed")),
            ScalarValue::String("{unclosed".to_string())
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!ScalarValue::Null.is_truthy());
        assert!(!ScalarValue::Bool(false).is_truthy());
        assert!(!ScalarValue::Int(0).is_truthy());
        assert!(!ScalarValue::Float(0.0).is_truthy());
        assert!(!ScalarValue::String(String::new()).is_truthy());
        assert!(ScalarValue::Bool(true).is_truthy());
        assert!(ScalarValue::Int(1).is_truthy());
        assert!(ScalarValue::String("yes".to_string()).is_truthy());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(ScalarValue::Null.to_text(), "");
        assert_eq!(ScalarValue::Int(1234).to_text(), "1234");
        assert_eq!(ScalarValue::Bool(true).to_text(), "true");
        assert_eq!(ScalarValue::String("node1".to_string()).to_text(), "node1");
    }
}
