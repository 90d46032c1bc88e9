pub mod credential_store;
pub mod network;
pub mod notification;
pub mod trigger;
