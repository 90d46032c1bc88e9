//! Basic authentication flow against an openmediavault server.
//!
//! This program builds an `OmvClient`, checks its initial authentication
//! state, logs in and prints the issued session id.

use omv_monitor::{Credentials, OmvClient, OmvResult};
use std::time::Duration;

#[tokio::main]
async fn main() -> OmvResult<()> {
    let client = OmvClient::builder()
        .request_timeout(Duration::from_secs(5))
        // Optional: .rate_limit(5, 10)
        .build()?;

    println!("\nAuthentication Status");
    println!("------------------------");
    println!(
        "Initial state: {}",
        if client.is_authenticated().await {
            "Authenticated"
        } else {
            "Not authenticated"
        }
    );

    let credentials = Credentials::new("192.168.1.10", "80", "admin", "openmediavault")?;
    println!("\nConnecting to {}...", credentials.endpoint());
    let token = client.login(&credentials).await?;

    println!(
        "Connection state: {}",
        if client.is_authenticated().await {
            "Authenticated"
        } else {
            "Failed"
        }
    );
    println!("\nSession id: {}", token.as_str());

    client.disconnect().await;
    println!("Disconnected.\n");
    Ok(())
}
