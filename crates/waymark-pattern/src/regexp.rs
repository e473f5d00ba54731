//! Regex compilation.
//!
//! Turns parsed [`Token`]s into a [`fancy_regex::Regex`] plus the ordered list
//! of [`Key`]s describing its capture groups. Capture group `i` always belongs
//! to `keys[i - 1]`. The default parameter patterns use lookahead, which is
//! why the engine is `fancy-regex` rather than `regex`.

use std::fmt::Write as _;

use fancy_regex::Regex;
use tracing::trace;
use waymark_core::RouterError;

use crate::escape::{escape_class, escape_string};
use crate::options::PatternOptions;
use crate::parser::{parse, Key, Modifier, Token};

/// The input forms a path may take.
#[derive(Debug, Clone, Copy)]
pub enum PathInput<'a> {
    /// A pattern string such as `/users/:id`.
    Pattern(&'a str),
    /// Alternative pattern strings; any of them may match.
    Alternatives(&'a [String]),
    /// A pre-built regex, used as-is.
    Regex(&'a Regex),
}

/// A compiled path regex and the keys for its capture groups.
#[derive(Debug, Clone)]
pub struct PathRegex {
    regex: Regex,
    keys: Vec<Key>,
}

impl PathRegex {
    /// Returns the compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the keys in capture-group order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Returns the regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compiles any [`PathInput`] into a [`PathRegex`].
///
/// Alternatives are compiled independently and joined as `(?:a|b)`, with
/// their keys concatenated in order. A pre-built regex gets one key per
/// capture group: named groups keep their name, unnamed groups are numbered.
///
/// # Examples
///
/// ```
/// use waymark_pattern::{path_to_regexp, PathInput, PatternOptions};
///
/// let re = path_to_regexp(PathInput::Pattern("/user/:id"), &PatternOptions::default()).unwrap();
/// assert_eq!(re.keys()[0].name, "id");
/// assert!(re.regex().is_match("/user/123").unwrap());
/// assert!(!re.regex().is_match("/user/123/posts").unwrap());
/// ```
///
/// # Errors
///
/// Returns any parse error, [`RouterError::UnrepeatableParameter`], or
/// [`RouterError::InvalidRegex`] if the generated expression is rejected.
pub fn path_to_regexp(
    input: PathInput<'_>,
    options: &PatternOptions,
) -> Result<PathRegex, RouterError> {
    match input {
        PathInput::Pattern(pattern) => {
            let tokens = parse(pattern, options)?;
            tokens_to_regexp(&tokens, options)
        }
        PathInput::Alternatives(patterns) => {
            let mut keys = Vec::new();
            let mut parts = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let tokens = parse(pattern, options)?;
                parts.push(tokens_to_source(&tokens, &mut keys, options)?);
            }
            let source = format!("(?:{})", parts.join("|"));
            Ok(PathRegex {
                regex: build_regex(&source, options)?,
                keys,
            })
        }
        PathInput::Regex(regex) => Ok(PathRegex {
            regex: regex.clone(),
            keys: regex_keys(regex),
        }),
    }
}

/// Compiles parsed tokens into a [`PathRegex`].
///
/// # Errors
///
/// Returns [`RouterError::UnrepeatableParameter`] or [`RouterError::InvalidRegex`].
pub fn tokens_to_regexp(
    tokens: &[Token],
    options: &PatternOptions,
) -> Result<PathRegex, RouterError> {
    let mut keys = Vec::new();
    let source = tokens_to_source(tokens, &mut keys, options)?;
    Ok(PathRegex {
        regex: build_regex(&source, options)?,
        keys,
    })
}

/// Builds the anchored regex source for `tokens`, pushing capture keys onto `keys`.
fn tokens_to_source(
    tokens: &[Token],
    keys: &mut Vec<Key>,
    options: &PatternOptions,
) -> Result<String, RouterError> {
    let delimiter_re = format!("[{}]", escape_class(&options.delimiter));
    let ends_with_re = if options.ends_with.is_empty() {
        "$".to_string()
    } else {
        format!("[{}]|$", escape_class(&options.ends_with))
    };

    let mut route = String::new();
    if options.start {
        route.push('^');
    }

    for token in tokens {
        match token {
            Token::Literal(text) => route.push_str(&escape_string(&options.apply_encode(text))),
            Token::Parameter(key) => {
                let prefix = escape_string(&options.apply_encode(&key.prefix));
                let suffix = escape_string(&options.apply_encode(&key.suffix));

                if !key.captures() {
                    write!(route, "(?:{prefix}{suffix}){}", key.modifier).ok();
                    continue;
                }

                keys.push(key.clone());
                let pattern = &key.pattern;

                if prefix.is_empty() && suffix.is_empty() {
                    if key.modifier.is_repeat() {
                        return Err(RouterError::UnrepeatableParameter(key.name.clone()));
                    }
                    write!(route, "({pattern}){}", key.modifier).ok();
                } else if key.modifier.is_repeat() {
                    let optional = if key.modifier == Modifier::ZeroOrMore { "?" } else { "" };
                    let repeat = format!("(?:{suffix}{prefix}(?:{pattern}))*");
                    write!(route, "(?:{prefix}((?:{pattern}){repeat}){suffix}){optional}").ok();
                } else {
                    write!(route, "(?:{prefix}({pattern}){suffix}){}", key.modifier).ok();
                }
            }
        }
    }

    if options.end {
        if !options.strict {
            write!(route, "{delimiter_re}?").ok();
        }
        if options.ends_with.is_empty() {
            route.push('$');
        } else {
            write!(route, "(?={ends_with_re})").ok();
        }
    } else {
        let is_end_delimited = match tokens.last() {
            None => true,
            Some(Token::Literal(text)) => text
                .chars()
                .last()
                .is_some_and(|c| options.delimiter.contains(c)),
            Some(Token::Parameter(_)) => false,
        };
        if !options.strict {
            write!(route, "(?:{delimiter_re}(?={ends_with_re}))?").ok();
        }
        if !is_end_delimited {
            write!(route, "(?={delimiter_re}|{ends_with_re})").ok();
        }
    }

    Ok(route)
}

/// Compiles a regex source, applying the case-sensitivity flag.
pub(crate) fn build_regex(source: &str, options: &PatternOptions) -> Result<Regex, RouterError> {
    let source = if options.sensitive {
        source.to_string()
    } else {
        format!("(?i){source}")
    };
    trace!(source = %source, "compiling path regex");
    Regex::new(&source).map_err(|e| RouterError::InvalidRegex(format!("{source}: {e}")))
}

/// Synthesizes keys for the capture groups of a pre-built regex.
fn regex_keys(regex: &Regex) -> Vec<Key> {
    let mut index = 0usize;
    regex
        .capture_names()
        .skip(1)
        .map(|name| {
            let name = name.map_or_else(
                || {
                    let positional = index.to_string();
                    index += 1;
                    positional
                },
                ToString::to_string,
            );
            Key {
                name,
                prefix: String::new(),
                suffix: String::new(),
                pattern: String::new(),
                modifier: Modifier::None,
            }
        })
        .collect()
}
