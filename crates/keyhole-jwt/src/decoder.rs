//! Claim decoders and the decode pipeline.

use crate::segment::{decode_base64_text, normalize_body, split_token};
use crate::{DecodeError, Result};

use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Turns a decoded token body into an application-chosen claim shape.
///
/// The error only needs to be displayable: the pipeline keeps its message as
/// the detail of [`DecodeError::TokenDecode`].
pub trait ClaimDecoder {
    /// The decoded claim shape.
    type Claims;
    /// Error raised when the body does not fit the shape.
    type Error: fmt::Display;

    /// Decode the raw JSON body text.
    fn decode_claims(&self, body: &str) -> std::result::Result<Self::Claims, Self::Error>;
}

/// Decodes the body into any serde type.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Create a decoder for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ClaimDecoder for Json<T> {
    type Claims = T;
    type Error = serde_json::Error;

    fn decode_claims(&self, body: &str) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// Shorthand for [`Json::new`].
pub fn json<T: DeserializeOwned>() -> Json<T> {
    Json::new()
}

/// Adapts a plain function into a [`ClaimDecoder`].
#[derive(Clone, Copy)]
pub struct FnDecoder<F, T, E> {
    f: F,
    _out: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> fmt::Debug for FnDecoder<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDecoder")
    }
}

impl<F, T, E> ClaimDecoder for FnDecoder<F, T, E>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: fmt::Display,
{
    type Claims = T;
    type Error = E;

    fn decode_claims(&self, body: &str) -> std::result::Result<T, E> {
        (self.f)(body)
    }
}

/// Build a decoder from a function over the raw body text.
///
/// ```
/// use keyhole_jwt::{decode, from_fn};
///
/// let len_of_body = from_fn(|body: &str| Ok::<_, String>(body.len()));
/// // {"a":1}
/// assert_eq!(decode(&len_of_body, "e30.eyJhIjoxfQ.c2ln").unwrap(), 7);
/// ```
pub fn from_fn<F, T, E>(f: F) -> FnDecoder<F, T, E>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: fmt::Display,
{
    FnDecoder {
        f,
        _out: PhantomData,
    }
}

/// Split, normalize, and base64-decode the body segment of `token`.
///
/// # Errors
///
/// Returns [`DecodeError::TokenProcessing`] when the token does not have three
/// segments, the body length is impossible for base64, or the body is not
/// valid base64 text.
pub fn extract_token_body(token: &str) -> Result<String> {
    let segments = split_token(token)?;
    let normalized = normalize_body(segments.body)?;
    decode_base64_text(&normalized)
}

/// Decode the claims of `token` with `decoder`.
///
/// Short-circuits on the first failure. No signature is checked.
///
/// # Errors
///
/// Structural failures are reported as from [`extract_token_body`]; a body
/// rejected by `decoder` becomes [`DecodeError::TokenDecode`] carrying the
/// decoder's message.
pub fn decode<D: ClaimDecoder>(decoder: &D, token: &str) -> Result<D::Claims> {
    let body = extract_token_body(token).inspect_err(|err| {
        tracing::trace!(error = %err, "token body could not be extracted");
    })?;

    decoder.decode_claims(&body).map_err(|e| {
        let detail = e.to_string();
        tracing::trace!(error = %detail, "token body rejected by claim decoder");
        DecodeError::TokenDecode(detail)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde::Deserialize;
    use serde_json::Value;

    fn token_with_body(body: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode(body),
            URL_SAFE_NO_PAD.encode("sig")
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Session {
        sid: String,
        admin: bool,
    }

    #[test]
    fn extracts_raw_body() {
        let token = token_with_body(r#"{"sub":"u1"}"#);
        assert_eq!(extract_token_body(&token).unwrap(), r#"{"sub":"u1"}"#);
    }

    #[test]
    fn accepts_padded_body_segment() {
        // {"a":1}
        let token = "e30.eyJhIjoxfQ.c2ln";
        let padded = "e30.eyJhIjoxfQ==.c2ln";
        assert_eq!(
            extract_token_body(token).unwrap(),
            extract_token_body(padded).unwrap()
        );
    }

    #[test]
    fn decodes_url_safe_characters() {
        // Encodes to a body containing both '-' and '_'.
        let body = r#"{"k":"~~~???>>>"}"#;
        let token = token_with_body(body);
        let segment = token.split('.').nth(1).unwrap();
        assert!(segment.contains('-') || segment.contains('_'));
        assert_eq!(extract_token_body(&token).unwrap(), body);
    }

    #[test]
    fn decodes_into_serde_type() {
        let token = token_with_body(r#"{"sid":"abc","admin":true,"extra":1}"#);
        let session = decode(&json::<Session>(), &token).unwrap();
        assert_eq!(
            session,
            Session {
                sid: "abc".to_string(),
                admin: true
            }
        );
    }

    #[test]
    fn shape_mismatch_is_decode_error() {
        let token = token_with_body(r#"{"sid":"abc"}"#);
        let err = decode(&json::<Session>(), &token).unwrap_err();
        match err {
            DecodeError::TokenDecode(detail) => assert!(detail.contains("admin"), "{detail}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let token = token_with_body("not json");
        assert!(decode(&json::<Value>(), &token).unwrap_err().is_decode());
    }

    #[test]
    fn invalid_base64_is_processing_error() {
        let err = decode(&json::<Value>(), "e30.ab!d.c2ln").unwrap_err();
        assert!(err.is_processing(), "{err:?}");
    }

    #[test]
    fn shape_errors_win_over_decoding() {
        let err = decode(&json::<Value>(), "e30.e30").unwrap_err();
        assert_eq!(
            err,
            DecodeError::TokenProcessing("Token has invalid shape".to_string())
        );
        let err = extract_token_body("a.b.c.d").unwrap_err();
        assert_eq!(
            err,
            DecodeError::TokenProcessing("Token has invalid shape".to_string())
        );
    }

    #[test]
    fn wrong_length_body() {
        assert_eq!(
            extract_token_body("e30.abcde.c2ln").unwrap_err(),
            DecodeError::TokenProcessing("Wrong length".to_string())
        );
    }

    #[test]
    fn fn_decoder_error_message_is_kept() {
        let reject = from_fn(|_: &str| Err::<(), _>("no thanks"));
        let token = token_with_body("{}");
        assert_eq!(
            decode(&reject, &token).unwrap_err(),
            DecodeError::TokenDecode("no thanks".to_string())
        );
    }

    #[test]
    fn decoding_is_repeatable() {
        let token = token_with_body(r#"{"sid":"abc","admin":false}"#);
        let first = decode(&json::<Value>(), &token);
        let second = decode(&json::<Value>(), &token);
        assert_eq!(first.unwrap(), second.unwrap());

        let bad = "e30.!!!!.c2ln";
        assert_eq!(
            decode(&json::<Value>(), bad).unwrap_err(),
            decode(&json::<Value>(), bad).unwrap_err()
        );
    }
}
