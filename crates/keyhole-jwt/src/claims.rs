//! The registered claim set most tokens carry.

use crate::decoder::{ClaimDecoder, Json};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point in time used for claim timestamps and expiry checks.
pub type Timestamp = DateTime<Utc>;

/// Registered JWT claims.
///
/// Every field is optional: a missing key decodes to `None`, while a key with
/// the wrong JSON type fails the whole decode. `exp`, `nbf` and `iat` are
/// integer seconds since the Unix epoch on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
    /// `sub`
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// `iss`
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// `aud`
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// `exp`
    #[serde(
        rename = "exp",
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Timestamp>,

    /// `nbf`
    #[serde(
        rename = "nbf",
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<Timestamp>,

    /// `iat`
    #[serde(
        rename = "iat",
        default,
        with = "epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at: Option<Timestamp>,

    /// `jti`
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl StandardClaims {
    /// True if `exp` is present and `now` is strictly past it.
    ///
    /// Unlike [`crate::is_expired`], a claim set without `exp` never expires
    /// here.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    /// True if `now` is inside the `nbf`..=`exp` window (open ends when absent).
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.not_before.is_none_or(|nbf| nbf <= now) && !self.is_expired_at(now)
    }
}

/// Decoder for [`StandardClaims`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClaimsDecoder;

impl ClaimDecoder for StandardClaimsDecoder {
    type Claims = StandardClaims;
    type Error = serde_json::Error;

    fn decode_claims(&self, body: &str) -> Result<StandardClaims, serde_json::Error> {
        Json::<StandardClaims>::new().decode_claims(body)
    }
}

/// Shorthand for [`StandardClaimsDecoder`].
pub fn standard_claims() -> StandardClaimsDecoder {
    StandardClaimsDecoder
}

/// Convert epoch seconds to a timestamp, going through milliseconds.
pub(crate) fn timestamp_from_seconds(seconds: i64) -> Option<Timestamp> {
    seconds
        .checked_mul(1000)
        .and_then(DateTime::from_timestamp_millis)
}

mod epoch_seconds {
    use super::{Timestamp, timestamp_from_seconds};

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        Option::<i64>::deserialize(deserializer)?
            .map(|seconds| {
                timestamp_from_seconds(seconds).ok_or_else(|| {
                    de::Error::custom(format!("timestamp {seconds} is out of range"))
                })
            })
            .transpose()
    }
}
