//! Path pattern parser.
//!
//! Folds the lexer output into a sequence of [`Token`]s: literal text runs and
//! parameter descriptors ([`Key`]). The parser decides which character a
//! parameter absorbs as its prefix, assigns positional names to unnamed
//! parameters, and gives every parameter without an inline pattern a default
//! pattern that cannot run past the next delimiter.

use std::fmt;

use waymark_core::RouterError;

use crate::escape::{escape_class, escape_string};
use crate::lexer::{lex, LexKind, LexToken};
use crate::options::PatternOptions;

/// How often a parameter may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    /// Exactly once.
    #[default]
    None,
    /// Zero or one time (`?`).
    Optional,
    /// One or more times (`+`).
    OneOrMore,
    /// Zero or more times (`*`).
    ZeroOrMore,
}

impl Modifier {
    fn from_token(value: &str) -> Self {
        match value {
            "?" => Self::Optional,
            "+" => Self::OneOrMore,
            "*" => Self::ZeroOrMore,
            _ => Self::None,
        }
    }

    /// Returns the modifier as it appears in a pattern.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Optional => "?",
            Self::OneOrMore => "+",
            Self::ZeroOrMore => "*",
        }
    }

    /// Returns `true` for `?` and `*`.
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    /// Returns `true` for `+` and `*`.
    pub const fn is_repeat(self) -> bool {
        matches!(self, Self::OneOrMore | Self::ZeroOrMore)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing one parameter.
///
/// Unnamed parameters carry their positional index as the name (`"0"`,
/// `"1"`, ...). A group without a name or pattern (`{abc}?`) is represented
/// by a key with an empty name and an empty pattern; it captures nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// The parameter name.
    pub name: String,
    /// Literal text emitted before the value.
    pub prefix: String,
    /// Literal text emitted after the value.
    pub suffix: String,
    /// The regex fragment a value must match.
    pub pattern: String,
    /// The occurrence modifier.
    pub modifier: Modifier,
}

impl Key {
    /// Returns `true` if this key produces a capture group.
    pub fn captures(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// One parsed unit of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, matched and emitted verbatim.
    Literal(String),
    /// A parameter or group.
    Parameter(Key),
}

impl Token {
    /// Returns the key if this token is a parameter.
    pub const fn as_key(&self) -> Option<&Key> {
        match self {
            Self::Literal(_) => None,
            Self::Parameter(key) => Some(key),
        }
    }
}

/// Parses a path pattern into tokens.
///
/// # Examples
///
/// ```
/// use waymark_pattern::{parse, PatternOptions, Token};
///
/// let tokens = parse("/users/:id", &PatternOptions::default()).unwrap();
/// assert_eq!(tokens[0], Token::Literal("/users".into()));
/// assert_eq!(tokens[1].as_key().unwrap().name, "id");
/// assert_eq!(tokens[1].as_key().unwrap().prefix, "/");
/// ```
///
/// # Errors
///
/// Returns [`RouterError::MalformedPattern`] for syntax errors, including a
/// group without its closing `}` and two parameters with no text between them.
pub fn parse(source: &str, options: &PatternOptions) -> Result<Vec<Token>, RouterError> {
    Parser {
        tokens: lex(source)?,
        pos: 0,
        next_index: 0,
        options,
        result: Vec::new(),
    }
    .run()
}

struct Parser<'a> {
    tokens: Vec<LexToken>,
    pos: usize,
    next_index: usize,
    options: &'a PatternOptions,
    result: Vec<Token>,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Vec<Token>, RouterError> {
        let mut path = String::new();

        while self.pos < self.tokens.len() {
            let ch = self.try_consume(LexKind::Char);
            let name = self.try_consume(LexKind::Name);
            let pattern = self.try_consume(LexKind::Pattern);

            if name.is_some() || pattern.is_some() {
                let mut prefix = ch.unwrap_or_default();
                if !self.options.prefixes.contains(prefix.as_str()) {
                    path.push_str(&prefix);
                    prefix.clear();
                }
                if !path.is_empty() {
                    self.result.push(Token::Literal(std::mem::take(&mut path)));
                }

                let name = name.unwrap_or_else(|| self.positional_name());
                let pattern = match pattern {
                    Some(pattern) => pattern,
                    None => self.safe_pattern(&prefix)?,
                };
                let modifier = self.consume_modifier();

                self.result.push(Token::Parameter(Key {
                    name,
                    prefix,
                    suffix: String::new(),
                    pattern,
                    modifier,
                }));
                continue;
            }

            if let Some(value) = ch.or_else(|| self.try_consume(LexKind::EscapedChar)) {
                path.push_str(&value);
                continue;
            }

            if !path.is_empty() {
                self.result.push(Token::Literal(std::mem::take(&mut path)));
            }

            if self.try_consume(LexKind::Open).is_some() {
                self.parse_group()?;
                continue;
            }

            self.must_consume(LexKind::End)?;
        }

        Ok(self.result)
    }

    /// Parses `{prefix:name(pattern)suffix}` after the opening brace.
    fn parse_group(&mut self) -> Result<(), RouterError> {
        let prefix = self.consume_text();
        let name = self.try_consume(LexKind::Name).unwrap_or_default();
        let pattern = self.try_consume(LexKind::Pattern).unwrap_or_default();
        let suffix = self.consume_text();
        self.must_consume(LexKind::Close)?;

        let (name, pattern) = if !name.is_empty() && pattern.is_empty() {
            let safe = self.safe_pattern(&prefix)?;
            (name, safe)
        } else if name.is_empty() && !pattern.is_empty() {
            (self.positional_name(), pattern)
        } else {
            (name, pattern)
        };
        let modifier = self.consume_modifier();

        self.result.push(Token::Parameter(Key {
            name,
            prefix,
            suffix,
            pattern,
            modifier,
        }));
        Ok(())
    }

    fn try_consume(&mut self, kind: LexKind) -> Option<String> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Some(token.value.clone())
            }
            _ => None,
        }
    }

    fn must_consume(&mut self, kind: LexKind) -> Result<String, RouterError> {
        if let Some(value) = self.try_consume(kind) {
            return Ok(value);
        }
        let (next, index) = self
            .tokens
            .get(self.pos)
            .map_or((LexKind::End, 0), |t| (t.kind, t.index));
        Err(RouterError::MalformedPattern(format!(
            "Unexpected {next} at {index}, expected {kind}"
        )))
    }

    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(value) = self
            .try_consume(LexKind::Char)
            .or_else(|| self.try_consume(LexKind::EscapedChar))
        {
            text.push_str(&value);
        }
        text
    }

    fn consume_modifier(&mut self) -> Modifier {
        self.try_consume(LexKind::Modifier)
            .map_or(Modifier::None, |m| Modifier::from_token(&m))
    }

    fn positional_name(&mut self) -> String {
        let name = self.next_index.to_string();
        self.next_index += 1;
        name
    }

    /// Builds the default pattern for a parameter without an inline one.
    ///
    /// The parameter may not contain the text that precedes it unless that
    /// text already contains a delimiter.
    fn safe_pattern(&self, prefix: &str) -> Result<String, RouterError> {
        let prev = self.result.last();
        let prev_text = if prefix.is_empty() {
            match prev {
                Some(Token::Literal(text)) => text.as_str(),
                _ => "",
            }
        } else {
            prefix
        };

        if let (Some(Token::Parameter(key)), true) = (prev, prev_text.is_empty()) {
            return Err(RouterError::MalformedPattern(format!(
                "Must have text between two parameters, missing text after \"{}\"",
                key.name
            )));
        }

        let delimiter = &self.options.delimiter;
        let class = escape_class(delimiter);
        if prev_text.is_empty() || prev_text.chars().any(|c| delimiter.contains(c)) {
            return Ok(format!("[^{class}]+?"));
        }
        Ok(format!("(?:(?!{})[^{class}])+?", escape_string(prev_text)))
    }
}
