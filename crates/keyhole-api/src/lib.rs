use keyhole_jwt::{DecodeError, Timestamp, is_expired, standard_claims};
use serde::{Deserialize, Serialize};

pub type Subject = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthStatus {
    Anonymous,
    Authenticated {
        subject: Option<Subject>,
        expires_at: Option<Timestamp>,
    },
    Expired,
    Rejected {
        reason: String,
    },
}

impl AuthStatus {
    /// Classify a bearer token at `now`.
    ///
    /// Malformed tokens are `Rejected`; a token without a readable `exp` is
    /// `Expired`, matching the fail-closed [`is_expired`] check.
    pub fn from_token(now: Timestamp, token: &str) -> Self {
        let claims = match keyhole_jwt::decode(&standard_claims(), token) {
            Ok(claims) => claims,
            Err(err @ (DecodeError::TokenProcessing(_) | DecodeError::TokenDecode(_))) => {
                return AuthStatus::Rejected {
                    reason: err.to_string(),
                };
            }
            Err(DecodeError::Expired) => return AuthStatus::Expired,
        };

        if is_expired(now, token) {
            return AuthStatus::Expired;
        }

        AuthStatus::Authenticated {
            subject: claims.subject,
            expires_at: claims.expires_at,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Password { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Token(#[from] DecodeError),
}

/// Lifecycle contract implemented by each authentication backend.
///
/// Operations mutate the backend's `Model` in place; `status` is a pure read
/// of that model at a given time.
pub trait Authenticator: Send + Sync {
    type Config;
    type Model;
    type Message;
    type Challenge;
    type Status;

    fn init(&self, config: Self::Config) -> Result<Self::Model, AuthError>;
    fn login(&self, model: &mut Self::Model, credentials: Credentials) -> Result<(), AuthError>;
    fn logout(&self, model: &mut Self::Model) -> Result<(), AuthError>;
    fn refresh(&self, model: &mut Self::Model) -> Result<(), AuthError>;
    fn update(&self, model: &mut Self::Model, message: Self::Message) -> Result<(), AuthError>;
    fn on_challenge(
        &self,
        model: &mut Self::Model,
        challenge: Self::Challenge,
    ) -> Result<(), AuthError>;
    fn status(&self, model: &Self::Model, now: Timestamp) -> Self::Status;
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::DateTime;

    fn token_with_body(body: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode(body),
            URL_SAFE_NO_PAD.encode("sig")
        )
    }

    fn millis(ms: i64) -> Timestamp {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn authenticated_before_exp() {
        let token = token_with_body(r#"{"sub":"u1","exp":1000000000}"#);
        let status = AuthStatus::from_token(millis(999_999_999_000), &token);
        assert_eq!(
            status,
            AuthStatus::Authenticated {
                subject: Some("u1".to_string()),
                expires_at: Some(millis(1_000_000_000_000)),
            }
        );
        assert!(status.is_authenticated());
    }

    #[test]
    fn expired_after_exp() {
        let token = token_with_body(r#"{"sub":"u1","exp":1000000000}"#);
        assert_eq!(
            AuthStatus::from_token(millis(1_000_000_001_000), &token),
            AuthStatus::Expired
        );
    }

    #[test]
    fn no_exp_is_expired() {
        let token = token_with_body(r#"{"sub":"u1"}"#);
        assert_eq!(AuthStatus::from_token(millis(0), &token), AuthStatus::Expired);
    }

    #[test]
    fn malformed_is_rejected() {
        match AuthStatus::from_token(millis(0), "not-a-token") {
            AuthStatus::Rejected { reason } => assert!(reason.contains("invalid shape")),
            other => panic!("unexpected {other:?}"),
        }
        let token = token_with_body(r#"{"sub":7,"exp":1}"#);
        assert!(matches!(
            AuthStatus::from_token(millis(0), &token),
            AuthStatus::Rejected { .. }
        ));
    }

    #[test]
    fn status_serializes_with_tag() {
        let value = serde_json::to_value(AuthStatus::Rejected {
            reason: "bad".to_string(),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"status":"rejected","reason":"bad"}));
        assert_eq!(
            serde_json::to_value(AuthStatus::Anonymous).unwrap(),
            serde_json::json!({"status":"anonymous"})
        );
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = Credentials::Password {
            username: "ana".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("ana"));
        assert!(!debug.contains("hunter2"));
        assert!(!format!("{:?}", Credentials::Bearer("tok".to_string())).contains("tok"));
    }

    #[test]
    fn decode_errors_convert() {
        let err: AuthError = DecodeError::TokenProcessing("Wrong length".to_string()).into();
        assert_eq!(err.to_string(), "token processing error: Wrong length");
    }
}
