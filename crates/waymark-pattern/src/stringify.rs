//! Filling a pattern with parameter values to produce a path.

use std::fmt;

use fancy_regex::Regex;
use waymark_core::RouterError;

use crate::options::PatternOptions;
use crate::params::{ParamValue, Params};
use crate::parser::{parse, Key, Token};
use crate::regexp::build_regex;

/// A compiled path template.
///
/// # Examples
///
/// ```
/// use waymark_pattern::{compile, params, ParamValue, PatternOptions};
///
/// let to_path = compile("/user/:id", &PatternOptions::default()).unwrap();
/// let path = to_path.to_path(&params([("id", ParamValue::from("42"))])).unwrap();
/// assert_eq!(path, "/user/42");
/// ```
#[derive(Clone)]
pub struct PathFunction {
    tokens: Vec<Token>,
    validators: Vec<Option<Regex>>,
    options: PatternOptions,
}

impl fmt::Debug for PathFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFunction")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl PathFunction {
    /// Builds a template from parsed tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRegex`] if a token pattern does not compile.
    pub fn new(tokens: Vec<Token>, options: &PatternOptions) -> Result<Self, RouterError> {
        let validators = tokens
            .iter()
            .map(|token| match token {
                Token::Parameter(key) if key.captures() => {
                    build_regex(&format!("^(?:{})$", key.pattern), options).map(Some)
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tokens,
            validators,
            options: options.clone(),
        })
    }

    /// Returns the template tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Produces a path from `params`.
    ///
    /// Each value is encoded with the configured encoder and, when validation
    /// is on, checked against its token pattern. A group with no parameter
    /// emits its text unless it is optional.
    ///
    /// # Errors
    ///
    /// - [`RouterError::MissingParameter`] for an absent required value.
    /// - [`RouterError::InvalidParameterValue`] for a list given to a
    ///   non-repeating token, or an empty list for a required one.
    /// - [`RouterError::ParameterPatternMismatch`] when validation fails.
    pub fn to_path(&self, params: &Params) -> Result<String, RouterError> {
        let mut path = String::new();

        for (token, validator) in self.tokens.iter().zip(&self.validators) {
            let key = match token {
                Token::Literal(text) => {
                    path.push_str(text);
                    continue;
                }
                Token::Parameter(key) => key,
            };

            if !key.captures() {
                if !key.modifier.is_optional() {
                    path.push_str(&key.prefix);
                    path.push_str(&key.suffix);
                }
                continue;
            }

            match params.get(&key.name) {
                Some(ParamValue::Multiple(values)) => {
                    if !key.modifier.is_repeat() {
                        return Err(RouterError::InvalidParameterValue(format!(
                            "Expected \"{}\" to not repeat, but got a list",
                            key.name
                        )));
                    }
                    if values.is_empty() {
                        if key.modifier.is_optional() {
                            continue;
                        }
                        return Err(RouterError::InvalidParameterValue(format!(
                            "Expected \"{}\" to not be empty",
                            key.name
                        )));
                    }
                    for value in values {
                        self.push_segment(&mut path, key, validator.as_ref(), value)?;
                    }
                }
                Some(ParamValue::Single(value)) => {
                    self.push_segment(&mut path, key, validator.as_ref(), value)?;
                }
                None if key.modifier.is_optional() => {}
                None => return Err(RouterError::MissingParameter(key.name.clone())),
            }
        }

        Ok(path)
    }

    fn push_segment(
        &self,
        path: &mut String,
        key: &Key,
        validator: Option<&Regex>,
        value: &str,
    ) -> Result<(), RouterError> {
        let segment = self.options.apply_encode(value);
        if self.options.validate {
            if let Some(validator) = validator {
                let ok = validator
                    .is_match(&segment)
                    .map_err(|e| RouterError::InvalidRegex(e.to_string()))?;
                if !ok {
                    return Err(RouterError::ParameterPatternMismatch {
                        name: key.name.clone(),
                        pattern: key.pattern.clone(),
                        value: segment,
                    });
                }
            }
        }
        path.push_str(&key.prefix);
        path.push_str(&segment);
        path.push_str(&key.suffix);
        Ok(())
    }
}

/// Parses `pattern` and compiles it into a [`PathFunction`].
///
/// # Errors
///
/// Returns any parse error, or [`RouterError::InvalidRegex`].
pub fn compile(pattern: &str, options: &PatternOptions) -> Result<PathFunction, RouterError> {
    PathFunction::new(parse(pattern, options)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_component;
    use crate::params::params;

    fn opts() -> PatternOptions {
        PatternOptions::default()
    }

    #[test]
    fn test_literal_only() {
        let f = compile("/about", &opts()).unwrap();
        assert_eq!(f.to_path(&Params::new()).unwrap(), "/about");
    }

    #[test]
    fn test_missing_required() {
        let f = compile("/user/:id", &opts()).unwrap();
        assert_eq!(
            f.to_path(&Params::new()).unwrap_err(),
            RouterError::MissingParameter("id".into())
        );
    }

    #[test]
    fn test_optional_omitted() {
        let f = compile("/post/:id?", &opts()).unwrap();
        assert_eq!(f.to_path(&Params::new()).unwrap(), "/post");
    }

    #[test]
    fn test_repeat_values() {
        let f = compile("/:path+", &opts()).unwrap();
        let path = f
            .to_path(&params([("path", ParamValue::from(vec!["a", "b"]))]))
            .unwrap();
        assert_eq!(path, "/a/b");
    }

    #[test]
    fn test_empty_list() {
        let star = compile("/files/:path*", &opts()).unwrap();
        let empty = params([("path", ParamValue::Multiple(Vec::new()))]);
        assert_eq!(star.to_path(&empty).unwrap(), "/files");

        let plus = compile("/files/:path+", &opts()).unwrap();
        assert!(matches!(
            plus.to_path(&empty),
            Err(RouterError::InvalidParameterValue(_))
        ));
    }

    #[test]
    fn test_list_for_single_rejected() {
        let f = compile("/:id", &opts()).unwrap();
        let err = f
            .to_path(&params([("id", ParamValue::from(vec!["1"]))]))
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidParameterValue(_)));
    }

    #[test]
    fn test_validation() {
        let f = compile("/user/:id(\\d+)", &opts()).unwrap();
        let err = f
            .to_path(&params([("id", ParamValue::from("abc"))]))
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::ParameterPatternMismatch {
                name: "id".into(),
                pattern: "\\d+".into(),
                value: "abc".into(),
            }
        );

        let lenient = compile("/user/:id(\\d+)", &opts().validate(false)).unwrap();
        assert_eq!(
            lenient
                .to_path(&params([("id", ParamValue::from("abc"))]))
                .unwrap(),
            "/user/abc"
        );
    }

    #[test]
    fn test_encoder_applied_before_validation() {
        let f = compile("/:name", &opts().encode(encode_component)).unwrap();
        let path = f
            .to_path(&params([("name", ParamValue::from("a b"))]))
            .unwrap();
        assert_eq!(path, "/a%20b");

        let word = compile("/:name(\\w+)", &opts().encode(encode_component)).unwrap();
        let err = word
            .to_path(&params([("name", ParamValue::from("a b"))]))
            .unwrap_err();
        assert!(err.to_string().contains("a%20b"));
    }

    #[test]
    fn test_group_with_suffix() {
        let f = compile("/files{/:name.json}?", &opts()).unwrap();
        assert_eq!(f.to_path(&Params::new()).unwrap(), "/files");
        assert_eq!(
            f.to_path(&params([("name", ParamValue::from("r"))])).unwrap(),
            "/files/r.json"
        );
    }

    #[test]
    fn test_text_only_group() {
        let optional = compile("/book{s}?", &opts()).unwrap();
        assert_eq!(optional.to_path(&Params::new()).unwrap(), "/book");
        let required = compile("/book{s}", &opts()).unwrap();
        assert_eq!(required.to_path(&Params::new()).unwrap(), "/books");
    }
}
