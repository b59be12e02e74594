//! # Path Normalizer
//!
//! String transforms applied to an incoming path before it reaches the match
//! gate. None of them allocate when there is nothing to change.

use crate::error::RouteError;
use std::borrow::Cow;

/// Hash marker stripped by [`strip_hash`].
pub const HASH: char = '#';

/// Characters `decodeURI` leaves percent-encoded.
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Remove the first literal occurrence of `base` from `path`.
///
/// An empty base returns the path untouched, and so does a path that does not
/// contain the base.
#[must_use]
pub fn strip_base<'a>(path: &'a str, base: &str) -> Cow<'a, str> {
    if base.is_empty() {
        return Cow::Borrowed(path);
    }
    match path.find(base) {
        Some(0) => Cow::Borrowed(&path[base.len()..]),
        Some(_) => Cow::Owned(path.replacen(base, "", 1)),
        None => Cow::Borrowed(path),
    }
}

/// Remove exactly one leading `#`.
#[must_use]
pub fn strip_hash(path: &str) -> &str {
    path.strip_prefix(HASH).unwrap_or(path)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Byte encoded by the `%XX` escape starting at `at`.
fn escaped_byte(input: &str, at: usize) -> Result<u8, RouteError> {
    let bytes = input.as_bytes();
    let decoded = match (bytes.get(at + 1), bytes.get(at + 2)) {
        (Some(&hi), Some(&lo)) => hex_value(hi).zip(hex_value(lo)).map(|(h, l)| h << 4 | l),
        _ => None,
    };
    decoded.ok_or_else(|| RouteError::Decode {
        input: input.to_string(),
        message: format!("malformed escape at byte {at}"),
    })
}

/// Whole-path decoding with `decodeURI` semantics.
///
/// Escapes of reserved characters (`;/?:@&=+$,#`) are kept so the structure of
/// the path and query survives; everything else is decoded. A `%` that is not
/// followed by two hex digits, or bytes that do not form UTF-8, are an error.
pub fn decode_uri(input: &str) -> Result<Cow<'_, str>, RouteError> {
    if !input.contains('%') {
        return Ok(Cow::Borrowed(input));
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let byte = escaped_byte(input, i)?;
        if RESERVED.contains(&byte) {
            out.extend_from_slice(&bytes[i..i + 3]);
        } else {
            out.push(byte);
        }
        i += 3;
    }

    String::from_utf8(out)
        .map(Cow::Owned)
        .map_err(|err| RouteError::Decode {
            input: input.to_string(),
            message: err.to_string(),
        })
}

/// Per-segment decoding with `decodeURIComponent` semantics.
///
/// Every escape is decoded; malformed escapes are rejected the same way as in
/// [`decode_uri`].
pub fn decode_component(input: &str) -> Result<Cow<'_, str>, RouteError> {
    let mut at = 0;
    while let Some(offset) = input[at..].find('%') {
        escaped_byte(input, at + offset)?;
        at += offset + 3;
    }
    urlencoding::decode(input).map_err(|err| RouteError::Decode {
        input: input.to_string(),
        message: err.to_string(),
    })
}
