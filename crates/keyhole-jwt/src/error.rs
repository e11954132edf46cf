//! Error types.

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Why a token could not be decoded.
///
/// Callers are expected to match on the variant: a processing or decode
/// failure usually means "log in again", while [`DecodeError::Expired`] is a
/// candidate for a silent refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token is past its expiry.
    ///
    /// Reserved: the decode path never produces it directly.
    #[error("token expired")]
    Expired,

    /// The token is structurally malformed (segment count, padding, base64).
    #[error("token processing error: {0}")]
    TokenProcessing(String),

    /// The body decoded fine but does not match the requested claim shape.
    #[error("token decode error: {0}")]
    TokenDecode(String),
}

impl DecodeError {
    /// True for failures caused by the token's structure or encoding.
    pub fn is_processing(&self) -> bool {
        matches!(self, DecodeError::TokenProcessing(_))
    }

    /// True for failures raised by the claim decoder.
    pub fn is_decode(&self) -> bool {
        matches!(self, DecodeError::TokenDecode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_detail() {
        let err = DecodeError::TokenProcessing("Wrong length".to_string());
        assert_eq!(err.to_string(), "token processing error: Wrong length");

        let err = DecodeError::TokenDecode("expected value at line 1 column 1".to_string());
        assert!(err.to_string().contains("line 1 column 1"));
        assert_eq!(DecodeError::Expired.to_string(), "token expired");
    }

    #[test]
    fn kind_predicates() {
        assert!(DecodeError::TokenProcessing(String::new()).is_processing());
        assert!(!DecodeError::TokenProcessing(String::new()).is_decode());
        assert!(DecodeError::TokenDecode(String::new()).is_decode());
        assert!(!DecodeError::Expired.is_processing());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DecodeError>();
    }
}
