//! Path pattern lexer (tokenizer).
//!
//! Converts a path pattern such as `/users/:id(\\d+)?` into a flat stream of
//! [`LexToken`]s: modifiers, escaped characters, group braces, parameter
//! names, inline regex patterns, and plain characters. The stream always ends
//! with a [`LexKind::End`] token.

use std::fmt;

use waymark_core::RouterError;

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    /// One of `*`, `+`, `?`.
    Modifier,
    /// A character preceded by `\`.
    EscapedChar,
    /// `{`
    Open,
    /// `}`
    Close,
    /// A parameter name following `:`.
    Name,
    /// The body of an inline `(...)` pattern.
    Pattern,
    /// Any other single character.
    Char,
    /// End of input.
    End,
}

impl fmt::Display for LexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Modifier => "MODIFIER",
            Self::EscapedChar => "ESCAPED_CHAR",
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Name => "NAME",
            Self::Pattern => "PATTERN",
            Self::Char => "CHAR",
            Self::End => "END",
        };
        f.write_str(name)
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    /// The token category.
    pub kind: LexKind,
    /// Byte offset of the token in the source pattern.
    pub index: usize,
    /// The token text (without the `:`, `\`, or parentheses).
    pub value: String,
}

impl LexToken {
    fn new(kind: LexKind, index: usize, value: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            value: value.into(),
        }
    }
}

/// Returns `true` for characters allowed in a parameter name.
pub(crate) const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenizes a path pattern.
///
/// # Errors
///
/// Returns [`RouterError::MalformedPattern`] when `:` is not followed by a
/// name, when an inline pattern starts with `?`, is empty, or contains a
/// capturing group, and [`RouterError::UnbalancedPattern`] when an inline
/// pattern is never closed.
pub fn lex(source: &str) -> Result<Vec<LexToken>, RouterError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let offset = |pos: usize| chars.get(pos).map_or(source.len(), |&(i, _)| i);
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (index, c) = chars[i];

        match c {
            '*' | '+' | '?' => {
                tokens.push(LexToken::new(LexKind::Modifier, index, c));
                i += 1;
            }
            '\\' => {
                // A trailing backslash escapes nothing.
                let value = chars.get(i + 1).map(|&(_, e)| e.to_string()).unwrap_or_default();
                tokens.push(LexToken::new(LexKind::EscapedChar, index, value));
                i += 2;
            }
            '{' => {
                tokens.push(LexToken::new(LexKind::Open, index, c));
                i += 1;
            }
            '}' => {
                tokens.push(LexToken::new(LexKind::Close, index, c));
                i += 1;
            }
            ':' => {
                let mut j = i + 1;
                let mut name = String::new();
                while let Some(&(_, n)) = chars.get(j) {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    j += 1;
                }
                if name.is_empty() {
                    return Err(RouterError::MalformedPattern(format!(
                        "Missing parameter name at {index}"
                    )));
                }
                tokens.push(LexToken::new(LexKind::Name, index, name));
                i = j;
            }
            '(' => {
                let (pattern, next) = lex_pattern(&chars, i, &offset)?;
                tokens.push(LexToken::new(LexKind::Pattern, index, pattern));
                i = next;
            }
            _ => {
                tokens.push(LexToken::new(LexKind::Char, index, c));
                i += 1;
            }
        }
    }

    tokens.push(LexToken::new(LexKind::End, source.len(), ""));
    Ok(tokens)
}

/// Reads an inline `(...)` pattern starting at `start` (the opening paren).
///
/// Returns the pattern body and the position just past the closing paren.
fn lex_pattern(
    chars: &[(usize, char)],
    start: usize,
    offset: &dyn Fn(usize) -> usize,
) -> Result<(String, usize), RouterError> {
    let index = offset(start);
    let mut depth = 1usize;
    let mut pattern = String::new();
    let mut j = start + 1;

    if chars.get(j).map(|&(_, c)| c) == Some('?') {
        return Err(RouterError::MalformedPattern(format!(
            "Pattern cannot start with \"?\" at {}",
            offset(j)
        )));
    }

    while let Some(&(_, c)) = chars.get(j) {
        match c {
            '\\' => {
                pattern.push(c);
                if let Some(&(_, e)) = chars.get(j + 1) {
                    pattern.push(e);
                }
                j += 2;
                continue;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    j += 1;
                    break;
                }
            }
            '(' => {
                depth += 1;
                if chars.get(j + 1).map(|&(_, n)| n) != Some('?') {
                    return Err(RouterError::MalformedPattern(format!(
                        "Capturing groups are not allowed at {}",
                        offset(j)
                    )));
                }
            }
            _ => {}
        }
        pattern.push(c);
        j += 1;
    }

    if depth > 0 {
        return Err(RouterError::UnbalancedPattern(format!(
            "Unbalanced pattern at {index}"
        )));
    }
    if pattern.is_empty() {
        return Err(RouterError::MalformedPattern(format!(
            "Missing pattern at {index}"
        )));
    }

    Ok((pattern, j))
}
