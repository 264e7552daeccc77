//! Contract tests for the session endpoints client.

use gossip_client::auth::{ClientError, SessionClient};
use gossip_client::config::AppConfig;
use gossip_client::session::Session;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

fn me_authenticated(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({ "authenticated": true, "user": { "id": id, "name": name } })
}

/// Matches requests carrying no `Authorization` header at all.
struct NoAuthorizationHeader;

impl Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn test_fetch_me_attaches_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_authenticated("u1", "bob")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = SessionClient::new(server.uri());
    client.set_credential(Some("abc123".to_string()));

    let session = client.fetch_me().await.unwrap();
    assert!(session.authenticated);
    assert_eq!(session.user().unwrap().id, "u1");
    assert_eq!(session.user().unwrap().name, "bob");
}

#[tokio::test]
async fn test_fetch_me_without_credential_sends_no_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(NoAuthorizationHeader)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "authenticated": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri());

    let session = client.fetch_me().await.unwrap();
    assert_eq!(session, Session::signed_out());
}

#[tokio::test]
async fn test_fetch_me_maps_401_to_credential_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = SessionClient::new(server.uri());
    client.set_credential(Some("expired".to_string()));

    let err = client.fetch_me().await.unwrap_err();
    assert!(matches!(err, ClientError::CredentialRejected));
}

#[tokio::test]
async fn test_fetch_me_maps_other_failures_to_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "error": "store unavailable" })),
        )
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri());

    let err = client.fetch_me().await.unwrap_err();
    let ClientError::Transport(msg) = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(msg.contains("store unavailable"), "{msg}");
}

#[tokio::test]
async fn test_fetch_me_rejects_authenticated_without_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "authenticated": true })),
        )
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri());

    let err = client.fetch_me().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_set_display_name_posts_id_and_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/me/name"))
        .and(header("authorization", "Bearer abc123"))
        .and(body_json(serde_json::json!({ "id": "u1", "name": "bob" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = SessionClient::new(server.uri());
    client.set_credential(Some("abc123".to_string()));

    assert!(client.set_display_name("u1", "bob").await.unwrap());
}

#[tokio::test]
async fn test_set_display_name_reports_server_refusal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/me/name"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri());

    assert!(!client.set_display_name("u1", "taken").await.unwrap());
}

#[tokio::test]
async fn test_fetch_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "title": "gossip", "oauth": ["google", "github"] }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig::fetch(&reqwest::Client::new(), &server.uri())
        .await
        .unwrap();
    assert_eq!(config.title, "gossip");
    assert_eq!(config.oauth, ["google", "github"]);
}

#[tokio::test]
async fn test_fetch_config_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/config.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = AppConfig::fetch(&reqwest::Client::new(), &server.uri()).await;
    assert!(result.is_err());
}
