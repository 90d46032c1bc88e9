use crate::monitoring::application::{
    scheduler::{CheckOutcome, MonitoringScheduler},
    settings::MonitoringSettings,
};
use crate::monitoring::domain::{
    alert::{Notification, NotificationCategory},
    monitoring_config::MonitoringConfig,
    ports::{MockPeriodicTrigger, NotificationSink, TaskCompletion},
};
use crate::monitoring::infrastructure::{
    credential_store::MemoryCredentialStore, network::StaticNetworkIdentity,
};
use crate::{Credentials, HttpTransport};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        self.sent.lock().unwrap().push(notification.clone());
    }
}

fn credentials(server: &MockServer) -> Credentials {
    let address = server.address();
    Credentials::new(
        address.ip().to_string(),
        &address.port().to_string(),
        "admin",
        "openmediavault",
    )
    .unwrap()
}

fn rearming_trigger() -> MockPeriodicTrigger {
    let mut trigger = MockPeriodicTrigger::new();
    trigger
        .expect_schedule_next()
        .with(mockall::predicate::eq(Duration::from_secs(900)))
        .times(1)
        .return_const(());
    trigger
}

fn create_scheduler(
    server: &MockServer,
    config: MonitoringConfig,
    sink: Arc<RecordingSink>,
) -> MonitoringScheduler {
    MonitoringScheduler::new(
        Arc::new(MonitoringSettings::in_memory(config)),
        Arc::new(MemoryCredentialStore::new(Some(credentials(server)))),
        sink,
        Arc::new(StaticNetworkIdentity(true)),
        Arc::new(rearming_trigger()),
    )
    .unwrap()
    .with_transport(Arc::new(HttpTransport::new().unwrap()))
}

fn all_alerts(threshold: u8) -> MonitoringConfig {
    MonitoringConfig {
        health_alerts_enabled: true,
        storage_alerts_enabled: true,
        storage_threshold_percent: threshold,
        ..Default::default()
    }
}

async fn mount_liveness(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/rpc.php"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_storage(server: &MockServer, filesystems: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(body_partial_json(json!({"service": "Session", "method": "login"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": true, "sessionid": "monitor-session"},
            "error": null
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(body_partial_json(
            json!({"service": "FileSystemMgmt", "method": "enumerateMountedFilesystems"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": filesystems, "error": null})),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unavailable_server_alerts_without_logging_in() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 503).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = create_scheduler(&mock_server, all_alerts(90), sink.clone());

    let report = scheduler.handle_trigger(None).await;
    assert_eq!(report.outcome, CheckOutcome::ServerUnavailable);
    assert_eq!(report.completion, TaskCompletion::Success);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Server Unavailable");
    assert_eq!(sent[0].category, Some(NotificationCategory::ServerAlert));
}

#[tokio::test]
async fn test_client_errors_count_as_alive() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 404).await;

    let sink = Arc::new(RecordingSink::default());
    let config = MonitoringConfig {
        health_alerts_enabled: true,
        ..Default::default()
    };
    let scheduler = create_scheduler(&mock_server, config, sink.clone());

    assert_eq!(scheduler.handle_trigger(None).await.outcome, CheckOutcome::Healthy);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_one_storage_alert_names_only_offenders() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 200).await;
    mount_storage(
        &mock_server,
        json!([
            {"devicefile": "/dev/sda1", "available": "25 GiB", "used": "475 GiB", "percentage": 95},
            {"devicefile": "/dev/sdb1", "available": "600 GiB", "used": "400 GiB", "percentage": 40}
        ]),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = create_scheduler(&mock_server, all_alerts(90), sink.clone());

    let report = scheduler
        .handle_trigger(Some(Instant::now() + Duration::from_secs(30)))
        .await;
    assert_eq!(report.outcome, CheckOutcome::StorageAlert { count: 1 });
    assert_eq!(report.completion, TaskCompletion::Success);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].category, Some(NotificationCategory::StorageAlert));
    assert!(sent[0].body.contains("/dev/sda1"));
    assert!(!sent[0].body.contains("/dev/sdb1"));
}

#[tokio::test]
async fn test_several_offenders_share_one_alert() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 200).await;
    mount_storage(
        &mock_server,
        json!([
            {"devicefile": "/dev/sda1", "available": "5 GiB", "used": "95 GiB", "percentage": 95},
            {"devicefile": "/dev/sdb1", "available": "1 GiB", "used": "99 GiB", "percentage": 99},
            {"devicefile": "/dev/sdc1", "available": "20 GiB", "used": "80 GiB", "percentage": 80}
        ]),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = create_scheduler(&mock_server, all_alerts(90), sink.clone());

    assert_eq!(
        scheduler.handle_trigger(None).await.outcome,
        CheckOutcome::StorageAlert { count: 2 }
    );
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test]
async fn test_storage_disabled_skips_login() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 200).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let config = MonitoringConfig {
        health_alerts_enabled: true,
        storage_alerts_enabled: false,
        ..Default::default()
    };
    let scheduler = create_scheduler(&mock_server, config, sink.clone());

    assert_eq!(scheduler.handle_trigger(None).await.outcome, CheckOutcome::Healthy);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_failed_storage_check_is_swallowed() {
    let mock_server = MockServer::start().await;
    mount_liveness(&mock_server, 200).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"service": "Session", "method": "login"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": null,
            "error": {"message": "Incorrect username or password."}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = create_scheduler(&mock_server, all_alerts(90), sink.clone());

    let report = scheduler.handle_trigger(None).await;
    assert_eq!(report.outcome, CheckOutcome::StorageCheckFailed);
    assert_eq!(report.completion, TaskCompletion::Success);
    assert!(sink.sent().is_empty());
}
