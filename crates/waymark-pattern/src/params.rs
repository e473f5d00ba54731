//! Parameter values extracted by a match or supplied to a stringifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A parameter value: one string, or a list for repeated parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single segment.
    Single(String),
    /// Segments of a `+` or `*` parameter.
    Multiple(Vec<String>),
}

/// Parameters keyed by name.
pub type Params = HashMap<String, ParamValue>;

impl ParamValue {
    /// Returns the value if this is a single segment.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::Multiple(_) => None,
        }
    }

    /// Returns the segments if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Single(_) => None,
            Self::Multiple(values) => Some(values.as_slice()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(ToString::to_string).collect())
    }
}

impl PartialEq<str> for ParamValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for ParamValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Builds a [`Params`] map from `(name, value)` pairs.
///
/// ```
/// use waymark_pattern::{params, ParamValue};
///
/// let p = params([("id", ParamValue::from("7"))]);
/// assert_eq!(p["id"], "7");
/// ```
pub fn params<K, I>(pairs: I) -> Params
where
    K: Into<String>,
    I: IntoIterator<Item = (K, ParamValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let single = ParamValue::from("a");
        assert_eq!(single.as_str(), Some("a"));
        assert!(single.as_list().is_none());

        let multiple = ParamValue::from(vec!["a", "b"]);
        assert_eq!(multiple.as_list().unwrap(), ["a", "b"]);
        assert!(multiple.as_str().is_none());
        assert_ne!(multiple, "a");
    }

    #[test]
    fn test_serde_untagged() {
        let p = params([
            ("id", ParamValue::from("7")),
            ("path", ParamValue::from(vec!["x", "y"])),
        ]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["path"], serde_json::json!(["x", "y"]));

        let back: Params = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
