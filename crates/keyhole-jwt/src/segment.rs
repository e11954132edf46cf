//! Token splitting and base64url normalization.

use crate::{DecodeError, Result};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const INVALID_SHAPE: &str = "Token has invalid shape";
const WRONG_LENGTH: &str = "Wrong length";

/// The three raw segments of a compact token.
///
/// Nothing here is decoded or verified; `header` and `signature` are carried
/// for callers that want to inspect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments<'a> {
    /// Base64url-encoded header.
    pub header: &'a str,
    /// Base64url-encoded claims body.
    pub body: &'a str,
    /// Base64url-encoded signature.
    pub signature: &'a str,
}

/// Split a token on `.` into exactly three segments.
///
/// # Errors
///
/// Returns [`DecodeError::TokenProcessing`] with `"Token has invalid shape"`
/// for any other segment count.
pub fn split_token(token: &str) -> Result<Segments<'_>> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(body), Some(signature), None) => Ok(Segments {
            header,
            body,
            signature,
        }),
        _ => Err(DecodeError::TokenProcessing(INVALID_SHAPE.to_string())),
    }
}

/// Rewrite a base64url segment to the standard alphabet and restore padding.
///
/// Runs on every body, padded or not: a segment whose length is already a
/// multiple of four is returned with only the alphabet rewritten.
///
/// # Errors
///
/// Returns [`DecodeError::TokenProcessing`] with `"Wrong length"` when the
/// length leaves a remainder of one modulo four, which no base64 encoder
/// produces.
pub fn normalize_body(body: &str) -> Result<String> {
    let mut normalized: String = body
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match normalized.chars().count() % 4 {
        0 => {}
        2 => normalized.push_str("=="),
        3 => normalized.push('='),
        _ => return Err(DecodeError::TokenProcessing(WRONG_LENGTH.to_string())),
    }

    Ok(normalized)
}

/// Decode a normalized, padded segment as standard base64 text.
pub(crate) fn decode_base64_text(normalized: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(normalized)
        .map_err(|e| DecodeError::TokenProcessing(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DecodeError::TokenProcessing(e.to_string()))
}
