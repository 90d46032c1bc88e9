use crate::core::domain::value_object::{OmvEndpoint, SessionToken};

/// The authenticated state of one client: where it talks to and with which
/// token.
///
/// A token is only ever stored together with the endpoint it was issued
/// for, so holding a token implies a successful login against `endpoint`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    endpoint: Option<OmvEndpoint>,
    token: Option<SessionToken>,
}

impl Session {
    /// Creates an authenticated session.
    pub fn new(endpoint: OmvEndpoint, token: SessionToken) -> Self {
        Self {
            endpoint: Some(endpoint),
            token: Some(token),
        }
    }

    pub fn endpoint(&self) -> Option<&OmvEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Returns true if the session holds a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns endpoint and token when authenticated.
    pub(crate) fn credentials_for_call(&self) -> Option<(OmvEndpoint, SessionToken)> {
        match (&self.endpoint, &self.token) {
            (Some(endpoint), Some(token)) => Some((endpoint.clone(), token.clone())),
            _ => None,
        }
    }

    /// Replaces endpoint and token after a login.
    pub(crate) fn replace(&mut self, endpoint: OmvEndpoint, token: SessionToken) {
        self.endpoint = Some(endpoint);
        self.token = Some(token);
    }

    /// Drops the token; the endpoint is kept for display.
    pub(crate) fn clear(&mut self) {
        self.token = None;
    }
}
