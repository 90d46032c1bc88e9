use serde::Deserialize;
use serde_json::Value;

/// The `Session.login` result.
///
/// Depending on the server version the session id arrives either in
/// `authenticated` (as a string) or in `sessionid`; newer servers send
/// `authenticated: true` next to `sessionid`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub authenticated: Option<Value>,
    #[serde(default)]
    pub sessionid: Option<Value>,
}

impl LoginResponse {
    /// The session id, if the server issued one.
    pub fn token(&self) -> Option<&str> {
        [&self.authenticated, &self.sessionid]
            .into_iter()
            .filter_map(|field| field.as_ref().and_then(Value::as_str))
            .find(|token| !token.trim().is_empty())
    }
}
