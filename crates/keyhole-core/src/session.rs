//! A network-free backend that holds a caller-supplied bearer token.

use keyhole_api::{AuthError, AuthStatus, Authenticator, Credentials};
use keyhole_jwt::{Timestamp, extract_token_body};

use crate::{ClientConfig, authorization_header};

/// Messages accepted by [`TokenAuthenticator::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenMessage {
    /// A new token arrived (e.g. from a login redirect).
    Received(String),
    /// Forget the held token.
    Cleared,
}

/// Server-side refusals reported back to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    /// The server rejected the token (HTTP 401).
    Unauthorized,
    /// The token is valid but lacks permission (HTTP 403).
    Forbidden,
}

/// State kept by [`TokenAuthenticator`].
#[derive(Debug, Clone, Default)]
pub struct TokenSession {
    config: ClientConfig,
    token: Option<String>,
}

impl TokenSession {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuthenticator;

impl TokenAuthenticator {
    /// The header to attach to outgoing requests, if a token is held.
    pub fn header(&self, model: &TokenSession) -> Option<(String, String)> {
        model
            .token
            .as_deref()
            .map(|token| authorization_header(&model.config, token))
    }

    fn store(model: &mut TokenSession, token: String) -> Result<(), AuthError> {
        extract_token_body(&token)?;
        model.token = Some(token);
        Ok(())
    }
}

impl Authenticator for TokenAuthenticator {
    type Config = ClientConfig;
    type Model = TokenSession;
    type Message = TokenMessage;
    type Challenge = Challenge;
    type Status = AuthStatus;

    fn init(&self, config: ClientConfig) -> Result<TokenSession, AuthError> {
        crate::validate_config(&config)?;
        Ok(TokenSession {
            config,
            token: None,
        })
    }

    fn login(&self, model: &mut TokenSession, credentials: Credentials) -> Result<(), AuthError> {
        match credentials {
            Credentials::Bearer(token) => Self::store(model, token),
            Credentials::Password { .. } => Err(AuthError::Unsupported(
                "password login needs a network backend".to_string(),
            )),
        }
    }

    fn logout(&self, model: &mut TokenSession) -> Result<(), AuthError> {
        model.token = None;
        Ok(())
    }

    fn refresh(&self, _model: &mut TokenSession) -> Result<(), AuthError> {
        Err(AuthError::Unsupported(
            "refresh needs a network backend".to_string(),
        ))
    }

    fn update(&self, model: &mut TokenSession, message: TokenMessage) -> Result<(), AuthError> {
        match message {
            TokenMessage::Received(token) => Self::store(model, token),
            TokenMessage::Cleared => self.logout(model),
        }
    }

    fn on_challenge(&self, model: &mut TokenSession, challenge: Challenge) -> Result<(), AuthError> {
        match challenge {
            Challenge::Unauthorized => {
                tracing::debug!("server rejected held token, dropping it");
                self.logout(model)
            }
            Challenge::Forbidden => Ok(()),
        }
    }

    fn status(&self, model: &TokenSession, now: Timestamp) -> AuthStatus {
        match model.token.as_deref() {
            None => AuthStatus::Anonymous,
            Some(token) => AuthStatus::from_token(now, token),
        }
    }
}
