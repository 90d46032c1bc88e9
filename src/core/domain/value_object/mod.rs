mod omv_endpoint;
mod omv_host;
mod omv_password;
mod omv_port;
mod omv_username;
pub(crate) mod serde_helpers;
mod session_token;

pub use omv_endpoint::OmvEndpoint;
pub use omv_host::OmvHost;
pub use omv_password::OmvPassword;
pub use omv_port::OmvPort;
pub use omv_username::OmvUsername;
pub use session_token::SessionToken;
