use crate::core::domain::model::{credentials::Credentials, rpc_envelope::RpcEnvelope};

/// Parameters of `Session.login`.
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn from_credentials(credentials: &'a Credentials) -> Self {
        Self {
            username: credentials.username().as_str(),
            password: credentials.password().as_str(),
        }
    }

    pub fn into_envelope(self) -> RpcEnvelope {
        RpcEnvelope::new("Session", "login")
            .param("username", self.username)
            .param("password", self.password)
    }
}
