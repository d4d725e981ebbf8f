//! The access layer against a real HTTP server.

use kitdm::access::{AccessClient, ApiError, DeleteMode, DeleteOutcome, DeleteSupport, Payload, QueryParams, ResourceRef};
use kitdm::credentials::FixedCredentials;
use kitdm::http_utils::{HttpClient, HttpRequestConfig};
use kitdm::keycloak::KeycloakClient;
use kitdm::session::SessionManager;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "/api/v1/dataresources/42";

fn client(server: &MockServer) -> AccessClient {
    client_with_session(server, SessionManager::unauthenticated())
}

fn client_with_session(server: &MockServer, session: SessionManager) -> AccessClient {
    let transport = HttpClient::new(HttpRequestConfig::default()).unwrap();
    AccessClient::new(&server.uri(), Arc::new(transport), session)
}

fn resource() -> ResourceRef {
    ResourceRef::new("api/v1/dataresources/42")
        .with_media_type("application/json")
        .with_delete(DeleteSupport::Lifecycle)
}

async fn mount_tagged_resource(server: &MockServer, etag: &str) {
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", etag)
                .set_body_json(json!({"id": "42", "state": "VOLATILE"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_update_sends_entity_tag_as_if_match() {
    let server = MockServer::start().await;
    mount_tagged_resource(&server, "\"abc\"").await;
    Mock::given(method("PUT"))
        .and(path(RESOURCE))
        .and(header("If-Match", "\"abc\""))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42", "state": "FIXED"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let updated = client
        .update(&resource(), Payload::json(r#"{"id":"42"}"#), false)
        .await
        .unwrap();

    assert_eq!(updated, vec![json!({"id": "42", "state": "FIXED"})]);
}

#[tokio::test]
async fn test_failed_read_prevents_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let result = client.update(&resource(), Payload::json("{}"), false).await;

    assert!(matches!(result, Err(ApiError::UnexpectedStatus { .. })));
}

#[tokio::test]
async fn test_hard_delete_issues_two_deletes() {
    let server = MockServer::start().await;
    mount_tagged_resource(&server, "\"v1\"").await;
    Mock::given(method("DELETE"))
        .and(path(RESOURCE))
        .and(header("If-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let outcome = client.delete(&resource(), DeleteMode::Hard, false).await;

    assert_eq!(outcome, DeleteOutcome::Purged);
}

#[tokio::test]
async fn test_soft_delete_issues_one_delete() {
    let server = MockServer::start().await;
    mount_tagged_resource(&server, "\"v1\"").await;
    Mock::given(method("DELETE"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let outcome = client.delete(&resource(), DeleteMode::Soft, false).await;

    assert_eq!(outcome, DeleteOutcome::Revoked);
}

#[tokio::test]
async fn test_rejected_delete_reports_failure() {
    let server = MockServer::start().await;
    mount_tagged_resource(&server, "\"v1\"").await;
    Mock::given(method("DELETE"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let outcome = client.delete(&resource(), DeleteMode::Hard, false).await;

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_single_and_list_responses_are_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dataresources/"))
        .and(query_param("page", "0"))
        .and(query_param("size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a"}, {"id": "b"}])))
        .mount(&server)
        .await;
    mount_tagged_resource(&server, "\"v1\"").await;

    let mut client = client(&server);
    let listing = ResourceRef::new("api/v1/dataresources/");
    let query = QueryParams::new()
        .with("from", None::<String>)
        .with("page", Some(0))
        .with("size", Some(2));
    let many = client.get(&listing, &query, false).await.unwrap();
    let one = client.get(&resource(), &QueryParams::new(), false).await.unwrap();

    assert_eq!(many.len(), 2);
    assert_eq!(one, vec![json!({"id": "42", "state": "VOLATILE"})]);
}

#[tokio::test]
async fn test_authenticated_request_logs_in_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realms/kit/protocol/openid-connect/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-1",
            "expires_in": 300,
            "refresh_token": "refresh-1",
            "refresh_expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .expect(2)
        .mount(&server)
        .await;

    let identity = KeycloakClient::new(&server.uri(), "kit", "kitdm").unwrap();
    let session = SessionManager::new(
        Arc::new(identity),
        Arc::new(FixedCredentials::new("alice", "secret")),
    );
    let mut client = client_with_session(&server, session);

    client.get(&resource(), &QueryParams::new(), true).await.unwrap();
    client.get(&resource(), &QueryParams::new(), true).await.unwrap();

    assert_eq!(client.session().session().access_token(), Some("token-1"));
}

#[tokio::test]
async fn test_rejected_login_stops_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realms/kit/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let identity = KeycloakClient::new(&server.uri(), "kit", "kitdm").unwrap();
    let session = SessionManager::new(
        Arc::new(identity),
        Arc::new(FixedCredentials::new("alice", "wrong")),
    );
    let mut client = client_with_session(&server, session);

    let result = client.get(&resource(), &QueryParams::new(), true).await;

    assert!(matches!(result, Err(ApiError::Authentication(_))));
    assert!(client.session().session().access_token().is_none());
}
