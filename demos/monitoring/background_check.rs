//! Runs one gated background check with in-memory settings and credentials.
//!
//! Alerts are emitted as `warn!` events, so run with `RUST_LOG=info`.

use omv_monitor::monitoring::application::{
    scheduler::MonitoringScheduler, settings::MonitoringSettings,
};
use omv_monitor::monitoring::domain::monitoring_config::MonitoringConfig;
use omv_monitor::monitoring::infrastructure::{
    credential_store::MemoryCredentialStore, network::StaticNetworkIdentity,
    notification::TracingNotificationSink, trigger::TokioTrigger,
};
use omv_monitor::{Credentials, OmvResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::main]
async fn main() -> OmvResult<()> {
    tracing_subscriber::fmt().init();

    let config = MonitoringConfig {
        health_alerts_enabled: true,
        storage_alerts_enabled: true,
        storage_threshold_percent: 85,
        ..Default::default()
    };
    let credentials = Credentials::new("192.168.1.10", "80", "admin", "openmediavault")?;
    let trigger = Arc::new(TokioTrigger::new());

    let scheduler = MonitoringScheduler::new(
        Arc::new(MonitoringSettings::in_memory(config)),
        Arc::new(MemoryCredentialStore::new(Some(credentials))),
        Arc::new(TracingNotificationSink),
        Arc::new(StaticNetworkIdentity(true)),
        trigger.clone(),
    )?;

    let report = scheduler
        .handle_trigger(Some(Instant::now() + Duration::from_secs(30)))
        .await;
    println!("Outcome:    {:?}", report.outcome);
    println!("Completion: {:?}", report.completion);
    if let Some(next) = trigger.next_run() {
        println!("Next check in {:?}", next.saturating_duration_since(Instant::now()));
    }
    Ok(())
}
