//! Reads CPU, memory, filesystem and update information.
//!
//! The session is renewed transparently if the server drops it between
//! calls.

use omv_monitor::{Credentials, OmvClient, OmvResult};

#[tokio::main]
async fn main() -> OmvResult<()> {
    let client = OmvClient::builder().build()?;
    client
        .login(&Credentials::new("192.168.1.10", "80", "admin", "openmediavault")?)
        .await?;
    println!("Authenticated successfully");

    let info = client.system_information().await?;
    println!("\nCPU:    {:.1}%", info.cpu.current_usage);
    println!(
        "Memory: {:.1}% ({:.2} of {:.2} GiB)",
        info.memory.used_percentage(),
        info.memory.used_gb(),
        info.memory.total_gb()
    );

    println!("\nMounted filesystems:");
    for fs in client.list_mounted_filesystems().await? {
        println!(
            "  • {}: {}% used ({} used, {} free)",
            fs.name, fs.percentage, fs.used_capacity, fs.available_capacity
        );
    }

    let updates = client.update_info().await?;
    println!("\nPending updates: {}", updates.count);
    for package in &updates.package_names {
        println!("  • {}", package);
    }

    client.disconnect().await;
    Ok(())
}
