use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::{
        domain::{
            error::{AuthError, TransportError},
            model::credentials::Credentials,
            value_object::SessionToken,
        },
        infrastructure::transport::RpcTransport,
    },
};
use std::time::Duration;
use tracing::{debug, info};

/// Runs `Session.login` and extracts the session token.
pub struct LoginService<'a> {
    transport: &'a dyn RpcTransport,
    timeout: Duration,
}

impl<'a> LoginService<'a> {
    pub fn new(transport: &'a dyn RpcTransport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Logs in unauthenticated and returns the issued token.
    ///
    /// # Errors
    /// * `AuthError::NoToken` if the reply is well formed but has no usable token
    /// * `AuthError::Transport` for any transport failure, including a reply
    ///   that is not a JSON object
    pub async fn execute(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let envelope = LoginRequest::from_credentials(credentials).into_envelope();
        let endpoint = credentials.endpoint();

        let reply = self
            .transport
            .execute(endpoint, &envelope, None, self.timeout)
            .await?;

        if !reply.is_object() {
            return Err(TransportError::Malformed("login reply is not an object".to_string()).into());
        }

        let login_response: LoginResponse = serde_json::from_value(reply).map_err(|e| {
            TransportError::Malformed(format!("Failed to parse login response: {}", e))
        })?;

        let token = login_response
            .token()
            .and_then(|token| SessionToken::new(token).ok())
            .ok_or_else(|| {
                debug!(endpoint = %endpoint, "login reply carried no session id");
                AuthError::NoToken
            })?;

        info!(
            endpoint = %endpoint,
            username = credentials.username().as_str(),
            "logged in"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::infrastructure::transport::HttpTransport;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn credentials(server: &MockServer) -> Credentials {
        let address = server.address();
        Credentials::new(
            address.ip().to_string(),
            &address.port().to_string(),
            "admin",
            "openmediavault",
        )
        .unwrap()
    }

    async fn login_with_reply(reply: ResponseTemplate) -> Result<SessionToken, AuthError> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc.php"))
            .and(body_json(json!({
                "service": "Session",
                "method": "login",
                "params": {"username": "admin", "password": "openmediavault"}
            })))
            .respond_with(reply)
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        LoginService::new(&transport, TIMEOUT)
            .execute(&credentials(&mock_server))
            .await
    }

    #[tokio::test]
    async fn test_login_token_from_sessionid() {
        let token = login_with_reply(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": true, "username": "admin", "sessionid": "f00dcafe"},
            "error": null
        })))
        .await
        .unwrap();
        assert_eq!(token.as_str(), "f00dcafe");
    }

    #[tokio::test]
    async fn test_login_token_from_authenticated() {
        let token = login_with_reply(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": "legacy-token"},
            "error": null
        })))
        .await
        .unwrap();
        assert_eq!(token.as_str(), "legacy-token");
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let result = login_with_reply(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": false},
            "error": null
        })))
        .await;
        assert_eq!(result, Err(AuthError::NoToken));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let result = login_with_reply(ResponseTemplate::new(200).set_body_json(json!({
            "response": null,
            "error": {"code": 5001, "message": "Incorrect username or password."}
        })))
        .await;
        assert_eq!(
            result,
            Err(AuthError::Transport(TransportError::Remote(
                "Incorrect username or password.".to_string()
            )))
        );

        let result = login_with_reply(ResponseTemplate::new(401)).await;
        assert_eq!(result, Err(AuthError::Transport(TransportError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_reply_not_an_object() {
        let result = login_with_reply(
            ResponseTemplate::new(200).set_body_json(json!({"response": ["unexpected"]})),
        )
        .await;
        assert!(matches!(
            result,
            Err(AuthError::Transport(TransportError::Malformed(_)))
        ));
    }
}
