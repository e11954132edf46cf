//! keyhole-jwt
//!
//! Decoding and expiry checks for compact, dot-separated JWTs, independent of
//! any signing scheme. This crate never verifies a signature: it splits a
//! token, decodes the body segment, and hands the JSON to a claim decoder you
//! choose.
//!
//! - **Splitting and normalization**: three segments, URL-safe alphabet
//!   rewritten to standard base64, padding restored
//! - **Claim decoding**: any [`ClaimDecoder`], including serde types via
//!   [`json`] and the built-in [`StandardClaims`]
//! - **Expiry**: [`is_expired`] reads only `exp` and fails closed
//!
//! Failures are classified into the three [`DecodeError`] variants so callers
//! can tell a malformed token from a body that does not fit the requested
//! claim shape.
//!
//! ## Quick start
//! ```
//! use keyhole_jwt::{decode, is_expired, standard_claims};
//!
//! // {"alg":"none"} . {"sub":"u1","exp":1000000000} . sig
//! let token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1MSIsImV4cCI6MTAwMDAwMDAwMH0.c2ln";
//!
//! let claims = decode(&standard_claims(), token).unwrap();
//! assert_eq!(claims.subject.as_deref(), Some("u1"));
//!
//! let now = chrono::Utc::now();
//! assert!(is_expired(now, token));
//! ```

#![forbid(unsafe_code)]

mod claims;
mod decoder;
mod error;
mod expiry;
mod segment;

pub use claims::{StandardClaims, StandardClaimsDecoder, Timestamp, standard_claims};
pub use decoder::{ClaimDecoder, FnDecoder, Json, decode, extract_token_body, from_fn, json};
pub use error::{DecodeError, Result};
pub use expiry::{expiration_millis, is_expired};
pub use segment::{Segments, normalize_body, split_token};
