//! Options shared by the parser, the regex compiler, and the stringifier.

use std::fmt;
use std::sync::Arc;

use waymark_core::settings::{Settings, DEFAULT_DELIMITER, DEFAULT_PREFIXES};

/// A function that transforms a string, used for encoding and decoding.
pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options controlling how a pattern is parsed, compiled, matched, and filled.
///
/// # Examples
///
/// ```
/// use waymark_pattern::PatternOptions;
///
/// let options = PatternOptions::default().end(false).sensitive(true);
/// assert!(!options.end);
/// assert_eq!(options.delimiter, "/#?");
/// ```
#[derive(Clone)]
pub struct PatternOptions {
    /// Characters a parameter absorbs as its prefix.
    pub prefixes: String,
    /// Characters that separate segments.
    pub delimiter: String,
    /// Disallow an optional trailing delimiter.
    pub strict: bool,
    /// Anchor the match at the start of the input.
    pub start: bool,
    /// Anchor the match at the end of the input.
    pub end: bool,
    /// Characters that may stand in for end-of-input when `end` is set.
    pub ends_with: String,
    /// Match case-sensitively.
    pub sensitive: bool,
    /// Validate filled-in values against their token pattern.
    pub validate: bool,
    /// Applied to literal text when compiling, and to values when stringifying.
    pub encode: Option<Transform>,
    /// Applied to every captured value when matching.
    pub decode: Option<Transform>,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            strict: false,
            start: true,
            end: true,
            ends_with: String::new(),
            sensitive: false,
            validate: true,
            encode: None,
            decode: None,
        }
    }
}

impl fmt::Debug for PatternOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternOptions")
            .field("prefixes", &self.prefixes)
            .field("delimiter", &self.delimiter)
            .field("strict", &self.strict)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("ends_with", &self.ends_with)
            .field("sensitive", &self.sensitive)
            .field("validate", &self.validate)
            .field("encode", &self.encode.is_some())
            .field("decode", &self.decode.is_some())
            .finish()
    }
}

impl PatternOptions {
    /// Builds options from router settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            prefixes: settings.prefixes.clone(),
            delimiter: settings.delimiter.clone(),
            strict: settings.strict,
            ends_with: settings.ends_with.clone(),
            sensitive: settings.sensitive,
            ..Self::default()
        }
    }

    /// Sets `end`.
    #[must_use]
    pub const fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    /// Sets `start`.
    #[must_use]
    pub const fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    /// Sets `strict`.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets `sensitive`.
    #[must_use]
    pub const fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Sets `validate`.
    #[must_use]
    pub const fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Sets the delimiter characters.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the prefix characters.
    #[must_use]
    pub fn prefixes(mut self, prefixes: impl Into<String>) -> Self {
        self.prefixes = prefixes.into();
        self
    }

    /// Sets the characters accepted in place of end-of-input.
    #[must_use]
    pub fn ends_with(mut self, ends_with: impl Into<String>) -> Self {
        self.ends_with = ends_with.into();
        self
    }

    /// Sets the encoder.
    #[must_use]
    pub fn encode(mut self, encode: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.encode = Some(Arc::new(encode));
        self
    }

    /// Sets the decoder.
    #[must_use]
    pub fn decode(mut self, decode: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.decode = Some(Arc::new(decode));
        self
    }

    pub(crate) fn apply_encode(&self, value: &str) -> String {
        self.encode
            .as_ref()
            .map_or_else(|| value.to_string(), |encode| encode(value))
    }
}
