mod app;
mod client;

pub use app::{AppConfig, ConfigError, NetworkConfig};
pub use client::{ClientConfig, RateLimitConfig};
