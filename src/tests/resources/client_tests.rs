use crate::{ClientError, Credentials, OmvClient, SESSION_HEADER, UpdateInfo};
use serde_json::json;
use wiremock::{
    Mock, MockBuilder, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path},
};

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

async fn create_authenticated_client(mock_server: &MockServer) -> OmvClient {
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(body_partial_json(json!({"service": "Session", "method": "login"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"authenticated": true, "username": "admin", "sessionid": "test-session"},
            "error": null
        })))
        .mount(mock_server)
        .await;

    let client = OmvClient::builder().build().unwrap();
    client.login(&credentials(mock_server)).await.unwrap();
    client
}

fn rpc(body: serde_json::Value) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/rpc.php"))
        .and(header(SESSION_HEADER, "test-session"))
        .and(body_json(body))
}

fn reply(response: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"response": response, "error": null}))
}

#[tokio::test]
async fn test_system_information() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    rpc(json!({"service": "System", "method": "getInformation"}))
        .respond_with(reply(json!({
            "hostname": "nas",
            "cpuUtilization": 12.5,
            "memTotal": "8589934592",
            "memUsed": "2147483648",
            "availablePkgUpdates": 4
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let info = client.system_information().await.unwrap();
    assert_eq!(info.cpu.current_usage, 12.5);
    assert_eq!(info.memory.total_gb(), 8.0);
    assert_eq!(info.memory.used_percentage(), 25.0);
    assert_eq!(info.updates, Some(UpdateInfo::from_count(4)));
}

#[tokio::test]
async fn test_list_mounted_filesystems_requests_everything() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    rpc(json!({
        "service": "FileSystemMgmt",
        "method": "enumerateMountedFilesystems",
        "params": {"start": 0, "limit": -1}
    }))
    .respond_with(reply(json!([
        {"devicefile": "/dev/sda1", "available": "50.2 GiB", "used": "410.1 GiB", "percentage": 89, "type": "ext4"},
        {"devicefile": "/dev/sdb1", "available": "1.7 TiB", "used": "120 GiB"},
        {"devicefile": "/dev/md0", "available": "100 GiB", "used": "3.5 TiB", "percentage": 97}
    ])))
    .expect(1)
    .mount(&mock_server)
    .await;

    let filesystems = client.list_mounted_filesystems().await.unwrap();
    let names: Vec<_> = filesystems.iter().map(|fs| fs.name.as_str()).collect();
    assert_eq!(names, vec!["/dev/sda1", "/dev/md0"]);
    assert_eq!(filesystems[0].used_capacity, "410.1 GiB");
}

#[tokio::test]
async fn test_update_info_from_package_list() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    rpc(json!({"service": "Apt", "method": "getUpgraded"}))
        .respond_with(reply(json!({"total": 2, "data": [
            {"package": "openmediavault", "version": "7.4.2-1"},
            {"package": "docker-ce", "version": "5:27.1.1"}
        ]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updates = client.update_info().await.unwrap();
    assert_eq!(updates.count, 2);
    assert_eq!(updates.package_names, vec!["openmediavault", "docker-ce"]);
}

#[tokio::test]
async fn test_update_info_falls_back_to_count() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    rpc(json!({"service": "Apt", "method": "getUpgraded"}))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": null,
            "error": {"code": 9000, "message": "The method 'getUpgraded' does not exist"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    rpc(json!({"service": "System", "method": "getInformation"}))
        .respond_with(reply(json!({"cpuUtilization": 1, "availablePkgUpdates": 3})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updates = client.update_info().await.unwrap();
    assert_eq!(updates, UpdateInfo::from_count(3));
    assert!(updates.package_names.is_empty());
}

#[tokio::test]
async fn test_update_info_does_not_mask_transport_errors() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    rpc(json!({"service": "Apt", "method": "getUpgraded"}))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    assert!(matches!(
        client.update_info().await,
        Err(ClientError::Transport(_))
    ));
}

#[tokio::test]
async fn test_power_and_update_actions_send_empty_params() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    for (service, method_name) in [("Apt", "upgrade"), ("System", "shutdown"), ("System", "reboot")] {
        rpc(json!({"service": service, "method": method_name, "params": {}}))
            .respond_with(reply(json!(null)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    client.apply_updates().await.unwrap();
    client.shutdown().await.unwrap();
    client.reboot().await.unwrap();
}

#[tokio::test]
async fn test_clones_share_the_session() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;
    let clone = client.clone();

    client.disconnect().await;
    assert!(!clone.is_authenticated().await);
    assert_eq!(
        clone.system_information().await,
        Err(ClientError::NotAuthenticated)
    );
}

#[tokio::test]
async fn test_typed_call_renews_session_transparently() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(header(SESSION_HEADER, "test-session"))
        .and(body_json(json!({"service": "System", "method": "getInformation"})))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"service": "Session", "method": "login"})))
        .respond_with(reply(json!({"authenticated": true, "sessionid": "renewed"})))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(header(SESSION_HEADER, "renewed"))
        .and(body_json(json!({"service": "System", "method": "getInformation"})))
        .respond_with(reply(json!({"cpuUtilization": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let info = client.system_information().await.unwrap();
    assert_eq!(info.cpu.current_usage, 42.0);
    assert_eq!(client.session().await.token().unwrap().as_str(), "renewed");
}
