//! Percent-encoding for path segments.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by URI component encoding.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a value for use as a single URI component.
///
/// ```
/// use waymark_pattern::encode_component;
///
/// assert_eq!(encode_component("a b/c"), "a%20b%2Fc");
/// assert_eq!(encode_component("it's-ok"), "it's-ok");
/// ```
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-decodes a value, returning it unchanged if it is malformed.
///
/// A value is malformed when a `%` is not followed by two hex digits or the
/// decoded bytes are not UTF-8.
///
/// ```
/// use waymark_pattern::decode_component;
///
/// assert_eq!(decode_component("x%2Fy"), "x/y");
/// assert_eq!(decode_component("%AF"), "%AF");
/// ```
pub fn decode_component(value: &str) -> String {
    if !is_well_formed(value) {
        return value.to_string();
    }
    percent_decode_str(value)
        .decode_utf8()
        .map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned)
}

fn is_well_formed(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
