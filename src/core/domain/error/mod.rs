use thiserror::Error;

/// The main error type for openmediavault operations.
///
/// This enum wraps every failure the crate can surface to an interactive
/// caller: transport and authentication failures, validation of user input,
/// and failures of the persistence collaborators.
#[derive(Error, Debug)]
pub enum OmvError {
    /// A raw RPC exchange failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Logging in failed
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// An authenticated call failed
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Represents validation failures of user supplied values
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A credential, secret or settings store could not be read or written
    ///
    /// # Fields
    /// * `0` - A description of the storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The application configuration is unusable
    ///
    /// # Fields
    /// * `0` - A description of the configuration problem
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outcome classification of a single JSON-RPC exchange.
///
/// The transport never retries and never re-authenticates; `Unauthorized`
/// is reported separately so the client can decide what to do with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or no response arrived in time
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-200 status other than 401
    #[error("HTTP error: status {0}")]
    Http(u16),

    /// The server answered 200 with a body that is not a JSON document
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The server rejected the session (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// The server answered 200 with a JSON `error` object
    #[error("Server error: {0}")]
    Remote(String),
}

/// Failures of `Session.login`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login response was well formed but carried no session token
    #[error("Login response did not contain a session token")]
    NoToken,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures of authenticated calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No session exists; the caller has to log in first
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server rejected the session and silent re-authentication did not
    /// recover it; the caller has to ask for credentials again
    #[error("Authentication lost, please log in again")]
    AuthenticationLost,

    #[error(transparent)]
    Transport(TransportError),

    /// The server reported an RPC level error
    #[error("Server error: {0}")]
    Remote(String),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Remote(message) => ClientError::Remote(message),
            other => ClientError::Transport(other),
        }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with an OmvError
pub type OmvResult<T> = Result<T, OmvError>;
