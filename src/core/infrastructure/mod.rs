pub(crate) mod api_client;
pub mod transport;
