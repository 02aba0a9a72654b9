//! Integration tests for the Vault KV v1 backend against a mock Vault API

use cerberus_store::config::VaultKvConfig;
use cerberus_store::secrets::{
    DocumentClient, ListEntry, PropertyMap, SecretString, StoreError, VaultKvDocumentClient,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-vault-token";

fn secret_body(data: Value) -> Value {
    json!({
        "data": data,
        "auth": null,
        "lease_duration": 0,
        "lease_id": "",
        "renewable": false,
        "request_id": "req-1"
    })
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"errors": []}))
}

/// Start a mock Vault that answers the health check made on connect.
async fn vault() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_id": "c-1",
            "cluster_name": "vault-test",
            "initialized": true,
            "performance_standby": false,
            "replication_dr_mode": "disabled",
            "replication_perf_mode": "disabled",
            "sealed": false,
            "server_time_utc": 1_700_000_000u64,
            "standby": false,
            "version": "1.15.0"
        })))
        .mount(&server)
        .await;
    server
}

async fn client(server: &MockServer) -> VaultKvDocumentClient {
    let config = VaultKvConfig {
        address: server.uri(),
        token: Some(SecretString::new(TOKEN)),
        mount: "secret".to_string(),
        ..Default::default()
    };
    VaultKvDocumentClient::new(&config).await.unwrap()
}

#[tokio::test]
async fn test_list_decodes_keys_and_prefixes() {
    let server = vault().await;
    Mock::given(method("LIST"))
        .and(path_regex(r"^/v1/secret/app/sdb/?$"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"keys": ["db", "team/"]},
            "auth": null,
            "lease_duration": 0,
            "lease_id": "",
            "renewable": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client(&server).await.list("app/sdb/").await.unwrap();
    assert_eq!(entries, vec![ListEntry::from_key("db"), ListEntry::from_key("team/")]);
    assert!(!entries[0].is_prefix);
    assert!(entries[1].is_prefix);
}

#[tokio::test]
async fn test_list_missing_prefix_is_empty() {
    let server = vault().await;
    Mock::given(method("LIST"))
        .and(path_regex(r"^/v1/secret/app/none/?$"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    assert!(client(&server).await.list("app/none/").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_document() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/app/sdb/db"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(secret_body(json!({"user": "admin", "port": 5432}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let document = client(&server).await.read("app/sdb/db", None).await.unwrap().unwrap();
    assert_eq!(document.len(), 2);
    assert_eq!(document["user"], b"admin");
    assert_eq!(document["port"], b"5432");
}

#[tokio::test]
async fn test_read_missing_document_is_absent() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/app/sdb/missing"))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).await.read("app/sdb/missing", None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_failure_is_backend_error() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/app/sdb/db"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .mount(&server)
        .await;

    let err = client(&server).await.read("app/sdb/db", None).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend { operation: "read", .. }));
}

#[tokio::test]
async fn test_versioned_read_is_rejected_without_a_request() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/app/sdb/db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(secret_body(json!({}))))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).await.read("app/sdb/db", Some("v-3")).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidRequest { .. }));
    assert!(err.to_string().contains("v-3"));
}

#[tokio::test]
async fn test_write_posts_whole_document() {
    let server = vault().await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/app/sdb/db"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(json!({"pass": "x1", "user": "admin"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut document = PropertyMap::new();
    document.insert("user".to_string(), b"admin".to_vec());
    document.insert("pass".to_string(), b"x1".to_vec());
    client(&server).await.write("app/sdb/db", &document).await.unwrap();
}

#[tokio::test]
async fn test_delete_document() {
    let server = vault().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/secret/app/sdb/db"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).await.delete("app/sdb/db").await.unwrap();
}

#[tokio::test]
async fn test_token_lookup_drives_authentication() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "accessor": "acc",
                "creation_time": 1_700_000_000u64,
                "creation_ttl": 0,
                "display_name": "token",
                "entity_id": "",
                "expire_time": null,
                "explicit_max_ttl": 0,
                "id": TOKEN,
                "identity_policies": null,
                "issue_time": "2023-11-14T22:13:20Z",
                "meta": null,
                "num_uses": 0,
                "orphan": true,
                "path": "auth/token/create",
                "policies": ["default"],
                "renewable": false,
                "ttl": 0
            },
            "auth": null,
            "lease_id": "",
            "lease_duration": 0,
            "renewable": false,
            "request_id": "req-1",
            "warnings": null,
            "wrap_info": null
        })))
        .mount(&server)
        .await;

    assert!(client(&server).await.is_authenticated().await);
}

#[tokio::test]
async fn test_rejected_token_is_not_authenticated() {
    let server = vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .mount(&server)
        .await;

    assert!(!client(&server).await.is_authenticated().await);
}

#[tokio::test]
async fn test_failed_health_check_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"errors": ["sealed"]})))
        .mount(&server)
        .await;

    let config = VaultKvConfig { address: server.uri(), ..Default::default() };
    let err = VaultKvDocumentClient::new(&config).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend { operation: "health", .. }));
}
