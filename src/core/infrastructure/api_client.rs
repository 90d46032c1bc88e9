//! Internal RPC client that handles authentication and automatic session renewal.

use crate::{
    auth::application::service::login_service::LoginService,
    config::ClientConfig,
    core::{
        domain::{
            error::{AuthError, ClientError, OmvResult, TransportError, ValidationError},
            model::{credentials::Credentials, rpc_envelope::RpcEnvelope, session::Session},
            value_object::{OmvEndpoint, SessionToken},
        },
        infrastructure::transport::RpcTransport,
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Internal RPC client that manages the session and executes authenticated calls.
///
/// Every call carries the current session id. If a call is rejected with
/// `401 Unauthorized`, the client logs in once more with the credentials of
/// the last successful login and retries the call exactly once. A second
/// rejection ends the session with `ClientError::AuthenticationLost`.
///
/// Re-authentication is serialized: concurrent calls that are rejected for
/// the same token wait for a single login and reuse its token.
#[derive(Debug)]
pub struct ApiClient {
    transport: Arc<dyn RpcTransport>,
    session: RwLock<Session>,
    credentials: RwLock<Option<Credentials>>,
    reauth_lock: Mutex<()>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `OmvError::Validation` if the configuration is invalid.
    pub fn new(transport: Arc<dyn RpcTransport>, config: ClientConfig) -> OmvResult<Self> {
        config.validate()?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::ConstraintViolation(
                        "requests_per_second must be at least 1".to_string(),
                    )
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    ValidationError::ConstraintViolation("burst_size must be at least 1".to_string())
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            transport,
            session: RwLock::new(Session::default()),
            credentials: RwLock::new(None),
            reauth_lock: Mutex::new(()),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns the transport the client talks through.
    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    /// Returns a snapshot of the session state.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Returns `true` if a session token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    #[cfg(test)]
    pub(crate) async fn set_session(&self, endpoint: OmvEndpoint, token: SessionToken) {
        self.session.write().await.replace(endpoint, token);
    }

    /// Logs in and stores endpoint and token. The credentials are kept for
    /// silent re-authentication.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let _guard = self.reauth_lock.lock().await;
        let token = LoginService::new(self.transport.as_ref(), self.config.request_timeout)
            .execute(credentials)
            .await?;

        self.session
            .write()
            .await
            .replace(credentials.endpoint().clone(), token.clone());
        *self.credentials.write().await = Some(credentials.clone());
        Ok(token)
    }

    /// Forgets token and credentials. Does not contact the server.
    pub async fn disconnect(&self) {
        let _guard = self.reauth_lock.lock().await;
        self.session.write().await.clear();
        *self.credentials.write().await = None;
        debug!("session closed");
    }

    /// Executes an authenticated call, renewing the session once on 401.
    pub async fn call(&self, envelope: &RpcEnvelope) -> Result<Value, ClientError> {
        let (endpoint, token) = self
            .session
            .read()
            .await
            .credentials_for_call()
            .ok_or(ClientError::NotAuthenticated)?;

        match self.send(&endpoint, envelope, &token).await {
            Err(TransportError::Unauthorized) => {}
            other => return other.map_err(ClientError::from),
        }

        warn!(rpc = %envelope, "session rejected, re-authenticating");
        let (endpoint, token) = self.reauthenticate(&token).await?;

        // Retry exactly once (no further recursion)
        match self.send(&endpoint, envelope, &token).await {
            Err(TransportError::Unauthorized) => {
                warn!(rpc = %envelope, "session rejected again after re-authentication");
                self.end_session(&token).await;
                Err(ClientError::AuthenticationLost)
            }
            other => other.map_err(ClientError::from),
        }
    }

    async fn send(
        &self,
        endpoint: &OmvEndpoint,
        envelope: &RpcEnvelope,
        token: &SessionToken,
    ) -> Result<Value, TransportError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        self.transport
            .execute(endpoint, envelope, Some(token), self.config.request_timeout)
            .await
    }

    /// Obtains a usable token after `rejected` was refused by the server.
    ///
    /// If another call already replaced `rejected` while this one waited for
    /// the lock, the replacement is returned without logging in again.
    async fn reauthenticate(
        &self,
        rejected: &SessionToken,
    ) -> Result<(OmvEndpoint, SessionToken), ClientError> {
        let _guard = self.reauth_lock.lock().await;

        match self.session.read().await.credentials_for_call() {
            Some((endpoint, current)) if current != *rejected => {
                debug!("session already renewed by a concurrent call");
                return Ok((endpoint, current));
            }
            Some(_) => {}
            // A concurrent re-authentication failed or the client was disconnected.
            None => return Err(ClientError::AuthenticationLost),
        }

        let Some(credentials) = self.credentials.read().await.clone() else {
            self.session.write().await.clear();
            return Err(ClientError::AuthenticationLost);
        };

        match LoginService::new(self.transport.as_ref(), self.config.request_timeout)
            .execute(&credentials)
            .await
        {
            Ok(token) => {
                let endpoint = credentials.endpoint().clone();
                self.session
                    .write()
                    .await
                    .replace(endpoint.clone(), token.clone());
                Ok((endpoint, token))
            }
            Err(error) => {
                warn!(error = %error, "re-authentication failed");
                self.session.write().await.clear();
                Err(ClientError::AuthenticationLost)
            }
        }
    }

    /// Clears the session unless another call has already replaced `token`.
    async fn end_session(&self, token: &SessionToken) {
        let mut session = self.session.write().await;
        if session.token() == Some(token) {
            session.clear();
        }
    }
}
