//! Matching a pathname against a compiled pattern.

use std::fmt;

use waymark_core::RouterError;

use crate::options::{PatternOptions, Transform};
use crate::params::{ParamValue, Params};
use crate::regexp::{path_to_regexp, PathInput, PathRegex};

/// The result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// The matched portion of the input.
    pub path: String,
    /// Byte offset where the match starts.
    pub index: usize,
    /// Decoded parameter values.
    pub params: Params,
}

/// A compiled pattern that extracts parameters from pathnames.
///
/// # Examples
///
/// ```
/// use waymark_pattern::{match_path, PatternOptions};
///
/// let matcher = match_path("/user/:id", &PatternOptions::default()).unwrap();
/// let m = matcher.matches("/user/123").unwrap().unwrap();
/// assert_eq!(m.path, "/user/123");
/// assert_eq!(m.params["id"], "123");
/// assert!(matcher.matches("/invalid").unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct MatchFunction {
    regex: PathRegex,
    decode: Option<Transform>,
}

impl fmt::Debug for MatchFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchFunction")
            .field("regex", &self.regex.as_str())
            .field("keys", &self.regex.keys())
            .finish_non_exhaustive()
    }
}

impl MatchFunction {
    /// Compiles `input` and wraps it in a matcher.
    ///
    /// # Errors
    ///
    /// Returns any error from [`path_to_regexp`].
    pub fn new(input: PathInput<'_>, options: &PatternOptions) -> Result<Self, RouterError> {
        Ok(Self::from_regex(path_to_regexp(input, options)?, options))
    }

    /// Wraps an already compiled regex.
    pub fn from_regex(regex: PathRegex, options: &PatternOptions) -> Self {
        Self {
            regex,
            decode: options.decode.clone(),
        }
    }

    /// Returns the compiled regex.
    pub const fn regex(&self) -> &PathRegex {
        &self.regex
    }

    /// Matches `pathname`, returning `None` if it does not match.
    ///
    /// Absent optional groups are omitted from the params. Repeated
    /// parameters are split on their `prefix + suffix` and each segment is
    /// decoded separately.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRegex`] if the regex engine fails at
    /// match time (for example, when its backtrack limit is exceeded).
    pub fn matches(&self, pathname: &str) -> Result<Option<PathMatch>, RouterError> {
        let captures = self
            .regex
            .regex()
            .captures(pathname)
            .map_err(|e| RouterError::InvalidRegex(e.to_string()))?;
        let Some(captures) = captures else {
            return Ok(None);
        };
        let Some(whole) = captures.get(0) else {
            return Ok(None);
        };

        let mut params = Params::new();
        for (i, key) in self.regex.keys().iter().enumerate() {
            let Some(group) = captures.get(i + 1) else {
                continue;
            };
            let raw = group.as_str();
            let separator = format!("{}{}", key.prefix, key.suffix);
            let value = if key.modifier.is_repeat() && !separator.is_empty() {
                ParamValue::Multiple(
                    raw.split(separator.as_str())
                        .map(|s| self.decode(s))
                        .collect(),
                )
            } else {
                ParamValue::Single(self.decode(raw))
            };
            params.insert(key.name.clone(), value);
        }

        Ok(Some(PathMatch {
            path: whole.as_str().to_string(),
            index: whole.start(),
            params,
        }))
    }

    fn decode(&self, value: &str) -> String {
        self.decode
            .as_ref()
            .map_or_else(|| value.to_string(), |decode| decode(value))
    }
}

/// Compiles a pattern string into a [`MatchFunction`].
///
/// # Errors
///
/// Returns any parse or compile error.
pub fn match_path(pattern: &str, options: &PatternOptions) -> Result<MatchFunction, RouterError> {
    MatchFunction::new(PathInput::Pattern(pattern), options)
}

#[cfg(test)]
mod tests {
    use fancy_regex::Regex;

    use super::*;
    use crate::encoding::decode_component;

    fn decoding() -> PatternOptions {
        PatternOptions::default().decode(decode_component)
    }

    #[test]
    fn test_match_simple() {
        let m = match_path("/:a/:b", &PatternOptions::default())
            .unwrap()
            .matches("/x/y")
            .unwrap()
            .unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.params["a"], "x");
        assert_eq!(m.params["b"], "y");
    }

    #[test]
    fn test_match_repeat_splits_and_decodes() {
        let matcher = match_path("/:a+", &decoding()).unwrap();
        let m = matcher.matches("/x%2Fy/z/%20/%AF").unwrap().unwrap();
        assert_eq!(
            m.params["a"],
            ParamValue::from(vec!["x/y", "z", " ", "%AF"])
        );
    }

    #[test]
    fn test_match_omits_absent_optional() {
        let matcher = match_path("/post/:id?", &PatternOptions::default()).unwrap();
        let m = matcher.matches("/post").unwrap().unwrap();
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_match_group_with_suffix() {
        let matcher = match_path("/files{/:name.json}?", &PatternOptions::default()).unwrap();
        let m = matcher.matches("/files/report.json").unwrap().unwrap();
        assert_eq!(m.params["name"], "report");
        assert!(matcher.matches("/files/report.txt").unwrap().is_none());
    }

    #[test]
    fn test_match_partial_prefix() {
        let options = PatternOptions::default().end(false);
        let m = match_path("/admin", &options)
            .unwrap()
            .matches("/admin/users")
            .unwrap()
            .unwrap();
        assert_eq!(m.path, "/admin");
    }

    #[test]
    fn test_match_without_start_anchor() {
        let options = PatternOptions::default().start(false);
        let m = match_path("/b", &options).unwrap().matches("/a/b").unwrap().unwrap();
        assert_eq!(m.index, 2);
    }

    #[test]
    fn test_match_prebuilt_regex() {
        let regex = Regex::new(r"^/(?P<year>\d{4})/(\d{2})").unwrap();
        let matcher =
            MatchFunction::new(PathInput::Regex(&regex), &PatternOptions::default()).unwrap();
        let m = matcher.matches("/2024/05/01").unwrap().unwrap();
        assert_eq!(m.path, "/2024/05");
        assert_eq!(m.params["year"], "2024");
        assert_eq!(m.params["0"], "05");
    }
}
