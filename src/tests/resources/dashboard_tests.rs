use crate::monitoring::application::dashboard::{Dashboard, ServerAction};
use crate::{Credentials, OmvClient};
use serde_json::json;
use wiremock::{
    Mock, MockBuilder, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

async fn create_dashboard(mock_server: &MockServer) -> Dashboard {
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(body_partial_json(json!({"service": "Session", "method": "login"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": true, "sessionid": "dash-session"},
            "error": null
        })))
        .mount(mock_server)
        .await;

    let address = mock_server.address();
    let credentials = Credentials::new(
        address.ip().to_string(),
        &address.port().to_string(),
        "admin",
        "openmediavault",
    )
    .unwrap();
    let client = OmvClient::builder().build().unwrap();
    client.login(&credentials).await.unwrap();
    Dashboard::new(client)
}

fn on(service: &str, rpc_method: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(body_partial_json(json!({"service": service, "method": rpc_method})))
}

fn reply(response: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"response": response, "error": null}))
}

#[tokio::test]
async fn test_refresh_collects_everything() {
    let mock_server = MockServer::start().await;
    let dashboard = create_dashboard(&mock_server).await;

    on("System", "getInformation")
        .respond_with(reply(json!({"cpuUtilization": 17.0, "memTotal": "4096", "memUsed": "1024"})))
        .mount(&mock_server)
        .await;
    on("FileSystemMgmt", "enumerateMountedFilesystems")
        .respond_with(reply(json!([
            {"devicefile": "/dev/sda1", "available": "1 GiB", "used": "9 GiB", "percentage": 90}
        ])))
        .mount(&mock_server)
        .await;
    on("Apt", "getUpgraded")
        .respond_with(reply(json!({"data": [{"package": "openmediavault"}]})))
        .mount(&mock_server)
        .await;

    let first = dashboard.refresh().await;
    assert_eq!(first.cpu.unwrap().current_usage, 17.0);
    assert_eq!(first.memory.unwrap().used_percentage(), 25.0);
    assert_eq!(first.filesystems.len(), 1);
    assert_eq!(first.updates.unwrap().count, 1);
    assert_eq!(first.cpu_history.len(), 1);

    let second = dashboard.refresh().await;
    assert_eq!(second.cpu_history.len(), 2);
}

#[tokio::test]
async fn test_failed_query_keeps_previous_value() {
    let mock_server = MockServer::start().await;
    let dashboard = create_dashboard(&mock_server).await;

    on("System", "getInformation")
        .respond_with(reply(json!({"cpuUtilization": 5})))
        .mount(&mock_server)
        .await;
    on("FileSystemMgmt", "enumerateMountedFilesystems")
        .respond_with(reply(json!([
            {"devicefile": "/dev/sda1", "available": "1 GiB", "used": "1 GiB", "percentage": 50}
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    on("FileSystemMgmt", "enumerateMountedFilesystems")
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    on("Apt", "getUpgraded")
        .respond_with(reply(json!([])))
        .mount(&mock_server)
        .await;

    let first = dashboard.refresh().await;
    assert_eq!(first.filesystems.len(), 1);

    let second = dashboard.refresh().await;
    assert_eq!(second.filesystems, first.filesystems);
}

#[tokio::test]
async fn test_successful_update_requeries_pending_updates() {
    let mock_server = MockServer::start().await;
    let dashboard = create_dashboard(&mock_server).await;

    on("Apt", "upgrade")
        .respond_with(reply(json!(null)))
        .expect(1)
        .mount(&mock_server)
        .await;
    on("Apt", "getUpgraded")
        .respond_with(reply(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = dashboard.apply_updates().await;
    assert!(!status.is_error);
    assert_eq!(status.action, ServerAction::ApplyUpdates);

    let snapshot = dashboard.snapshot().await;
    assert!(!snapshot.updates.unwrap().available);
    assert_eq!(snapshot.action_status, Some(status));
}

#[tokio::test]
async fn test_failed_reboot_is_reported() {
    let mock_server = MockServer::start().await;
    let dashboard = create_dashboard(&mock_server).await;

    on("System", "reboot")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": null,
            "error": {"message": "Permission denied"}
        })))
        .mount(&mock_server)
        .await;

    let status = dashboard.reboot().await;
    assert!(status.is_error);
    assert!(status.message.contains("Permission denied"));
}
