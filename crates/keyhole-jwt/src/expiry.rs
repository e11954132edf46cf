//! Expiry evaluation.

use crate::decoder::{decode, json};
use crate::{DecodeError, Result, Timestamp};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim of `token` in milliseconds since the Unix epoch.
///
/// # Errors
///
/// Propagates every decode failure. A missing or non-integer `exp` is a
/// [`DecodeError::TokenDecode`], as is an `exp` too large to express in
/// milliseconds.
pub fn expiration_millis(token: &str) -> Result<i64> {
    let claim = decode(&json::<ExpiryClaim>(), token)?;
    claim
        .exp
        .checked_mul(1000)
        .ok_or_else(|| DecodeError::TokenDecode("exp is out of range".to_string()))
}

/// Whether `token` should be treated as expired at `now`.
///
/// Expired means `now` is strictly after `exp`; at equality the token is
/// still valid. This check fails closed: any token whose `exp` cannot be read
/// (malformed token, missing claim, wrong type) counts as expired, so "no
/// expiry" and "garbage" are indistinguishable here. Use
/// [`expiration_millis`] when the difference matters.
pub fn is_expired(now: Timestamp, token: &str) -> bool {
    match expiration_millis(token) {
        Ok(exp_ms) => now.timestamp_millis() > exp_ms,
        Err(err) => {
            tracing::debug!(error = %err, "expiry undeterminable, treating token as expired");
            true
        }
    }
}
