//! Authentication integration tests.

use std::sync::Arc;

use flashblade_sdk::auth::{JwtClaims, LOGIN_PATH, LOGOUT_PATH, TOKEN_PATH};
use flashblade_sdk::client::RequestBody;
use flashblade_sdk::testkit::MockTransport;
use flashblade_sdk::{Client, Error, ListParams};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::common::*;

fn subject_token(transport: &MockTransport) -> String {
    let request = transport
        .requests()
        .into_iter()
        .find(|r| r.path == TOKEN_PATH)
        .expect("token exchange sent");
    let Some(RequestBody::Form(form)) = request.body else {
        panic!("token exchange must be a form");
    };
    form.into_iter()
        .find_map(|(k, v)| (k == "subject_token").then_some(v))
        .expect("subject_token field")
}

/// Tests that an API token is never combined with identity credentials.
#[test]
fn test_mutually_exclusive_credentials() {
    let transport = Arc::new(MockTransport::new());

    let combos = [
        builder(&transport).api_token("T").id_token("id"),
        builder(&transport).api_token("T").issuer("automation"),
        builder(&transport).api_token("T").key_id("k"),
        builder(&transport).api_token("T").client_id("c"),
        builder(&transport).api_token("T").private_key_file("/tmp/key.pem"),
    ];
    for combo in combos {
        assert!(matches!(combo.build(), Err(Error::Configuration { .. })));
    }
    assert_eq!(transport.request_count(), 0);
}

/// Tests that API-token mode logs in lazily and sends the session header.
#[tokio::test]
async fn test_api_token_session_header() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    assert_eq!(transport.request_count(), 0);

    transport.push_page(file_systems(0, 1), None, None);
    let response = client.file_systems().list(&ListParams::new()).await.unwrap();
    assert!(response.is_valid());

    let call = &transport.api_requests()[0];
    assert_eq!(call.header("x-auth-token"), Some("session-1"));
    assert!(call.header("authorization").is_none());
    assert_eq!(transport.count_path(LOGIN_PATH), 1);
}

/// Tests that identity-token mode sends a bearer access token.
#[tokio::test]
async fn test_id_token_bearer_header() {
    let transport = Arc::new(MockTransport::new());
    let client = id_token_client(&transport, 5);

    transport.push_page(vec![], None, None);
    client.buckets().list(&ListParams::new()).await.unwrap();

    let call = &transport.api_requests()[0];
    assert_eq!(call.header("authorization"), Some("Bearer access-1"));
    assert!(call.header("x-auth-token").is_none());
    assert_eq!(subject_token(&transport), "eyJ.test.token");
}

/// Tests that a private key signs an RS256 identity token with the right claims.
#[tokio::test]
async fn test_private_key_signs_identity_token() {
    let transport = Arc::new(MockTransport::new());
    let client = builder(&transport)
        .private_key_pem(PRIVATE_KEY)
        .key_id("kid-42")
        .issuer("automation")
        .client_id("client-7")
        .username("pureuser")
        .build()
        .unwrap();

    assert_eq!(client.get_access_token(false).await.unwrap(), "access-1");

    let token = subject_token(&transport);
    let header = jsonwebtoken::decode_header(&token).unwrap();
    assert_eq!(header.kid.as_deref(), Some("kid-42"));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["client-7"]);
    validation.set_issuer(&["automation"]);
    let claims = jsonwebtoken::decode::<JwtClaims>(
        &token,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY).unwrap(),
        &validation,
    )
    .unwrap()
    .claims;
    assert_eq!(claims.sub, "pureuser");
}

/// Tests loading the private key from a file.
#[tokio::test]
async fn test_private_key_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), PRIVATE_KEY).unwrap();

    let transport = Arc::new(MockTransport::new());
    let client = builder(&transport)
        .private_key_file(file.path())
        .key_id("kid")
        .issuer("automation")
        .client_id("client")
        .username("pureuser")
        .build()
        .unwrap();

    assert_eq!(client.get_access_token(true).await.unwrap(), "access-1");
}

/// Tests that a rejected login surfaces as an authentication error.
#[tokio::test]
async fn test_rejected_login_is_error() {
    let transport = Arc::new(MockTransport::new().reject_auth());
    let client = api_token_client(&transport, 5);

    let err = client.arrays().list().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(transport.api_requests().is_empty());
}

/// Tests that refresh forces a new exchange while plain reads hit the cache.
#[tokio::test]
async fn test_get_access_token_refresh() {
    let transport = Arc::new(MockTransport::new());
    let client = id_token_client(&transport, 5);

    assert_eq!(client.get_access_token(false).await.unwrap(), "access-1");
    assert_eq!(client.get_access_token(false).await.unwrap(), "access-1");
    assert_eq!(client.get_access_token(true).await.unwrap(), "access-2");
    assert_eq!(transport.count_path(TOKEN_PATH), 2);
}

/// Tests that logout disposes the session and the next call logs in again.
#[tokio::test]
async fn test_logout_then_relogin() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);

    client.get_access_token(false).await.unwrap();
    client.logout().await.unwrap();
    assert_eq!(transport.count_path(LOGOUT_PATH), 1);

    let logout = transport
        .requests()
        .into_iter()
        .find(|r| r.path == LOGOUT_PATH)
        .unwrap();
    assert_eq!(logout.header("x-auth-token"), Some("session-1"));

    assert_eq!(client.get_access_token(false).await.unwrap(), "session-2");
}

/// Tests that logout without a session sends nothing.
#[tokio::test]
async fn test_logout_without_session() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);

    client.logout().await.unwrap();
    assert_eq!(transport.request_count(), 0);
    assert_eq!(client.retries(), 0);
}

/// Tests that an unreachable token endpoint is an authentication error.
#[tokio::test]
async fn test_unreachable_exchange_over_http() {
    let client = Client::builder()
        .target("http://127.0.0.1:1")
        .id_token("eyJ.test.token")
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap();

    let err = client.get_access_token(true).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

/// Tests that an unreachable login fails the call before any API request.
#[tokio::test]
async fn test_unreachable_login_fails_call() {
    let transport = Arc::new(MockTransport::new().unreachable_auth());
    let client = api_token_client(&transport, 5);

    let err = client.arrays().list().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(transport.api_requests().is_empty());
    assert_eq!(transport.count_path(LOGIN_PATH), 1);
}
