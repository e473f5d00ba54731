//! # waymark-pattern
//!
//! Express-style path patterns for waymark. A pattern such as
//! `/users/:id(\\d+)?` is lexed, parsed into [`Token`]s, and compiled either
//! into an anchored regex for matching or into a template for building paths.
//!
//! ## Modules
//!
//! - [`lexer`] - Tokenizes pattern strings
//! - [`parser`] - Builds [`Token`]s and parameter [`Key`]s
//! - [`regexp`] - Compiles tokens, alternatives, or a pre-built regex
//! - [`matching`] - Extracts decoded [`Params`] from a pathname
//! - [`stringify`] - Fills a pattern with values
//! - [`encoding`] - Percent-encoding helpers
//!
//! ## Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `:name` | Named parameter, matches up to the next delimiter |
//! | `:name(\\d+)` | Named parameter with a custom pattern |
//! | `(\\d+)` | Unnamed parameter, named by position |
//! | `{prefix:name suffix}` | Group with explicit prefix and suffix |
//! | `?` `+` `*` | Optional, one or more, zero or more |
//! | `\\:` | Escaped literal character |

pub mod encoding;
mod escape;
pub mod lexer;
pub mod matching;
pub mod options;
pub mod params;
pub mod parser;
pub mod regexp;
pub mod stringify;

pub use encoding::{decode_component, encode_component};
pub use lexer::{lex, LexKind, LexToken};
pub use matching::{match_path, MatchFunction, PathMatch};
pub use options::{PatternOptions, Transform};
pub use params::{params, ParamValue, Params};
pub use parser::{parse, Key, Modifier, Token};
pub use regexp::{path_to_regexp, tokens_to_regexp, PathInput, PathRegex};
pub use stringify::{compile, PathFunction};
