//! Dispatcher retry and backoff integration tests.

use std::sync::Arc;
use std::time::Duration;

use flashblade_sdk::auth::{LOGIN_PATH, TOKEN_PATH};
use flashblade_sdk::testkit::MockTransport;
use flashblade_sdk::{Error, ListParams, Response};
use tokio::time::Instant;

use super::common::*;

/// Tests two auth rejections followed by success with a budget of two.
#[tokio::test]
async fn test_reauthenticates_until_success() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 2);

    transport.push_error(401, "session expired");
    transport.push_error(401, "session expired");
    transport.push_page(file_systems(0, 3), None, None);

    let response = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let items = response.into_items().collect_all().await.unwrap();
    assert_eq!(items.len(), 3);

    // one initial login and two forced refreshes
    assert_eq!(transport.count_path(LOGIN_PATH), 3);
    let calls = transport.api_requests();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].header("x-auth-token"), Some("session-3"));
    assert_eq!(transport.pending(), 0);
}

/// Tests that 403 refreshes the bearer token in identity mode.
#[tokio::test]
async fn test_forbidden_refreshes_bearer_token() {
    let transport = Arc::new(MockTransport::new());
    let client = id_token_client(&transport, 5);

    transport.push_error(403, "token expired");
    transport.push_page(vec![], None, None);

    let response = client.arrays().list().await.unwrap();
    assert!(response.is_valid());
    assert_eq!(transport.count_path(TOKEN_PATH), 2);
    assert_eq!(
        transport.api_requests()[1].header("authorization"),
        Some("Bearer access-2")
    );
}

/// Tests that 400, 404 and 500 are returned without a retry.
#[tokio::test]
async fn test_terminal_statuses_not_retried() {
    for status in [400, 404, 500] {
        let transport = Arc::new(MockTransport::new());
        let client = api_token_client(&transport, 5);
        transport.push_error(status, "nope");

        let response = client.buckets().list(&ListParams::new()).await.unwrap();

        let Response::Error(error) = response else {
            panic!("expected an error response for {status}");
        };
        assert_eq!(error.status, status);
        assert_eq!(error.errors[0].message.as_deref(), Some("nope"));
        assert_eq!(transport.api_requests().len(), 1);
    }
}

/// Tests that the budget caps retries of gateway errors.
#[tokio::test]
async fn test_server_errors_exhaust_budget() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 2);
    for _ in 0..4 {
        transport.push_error(503, "unavailable");
    }

    let response = client.arrays().list().await.unwrap();

    assert_eq!(response.status(), 503);
    assert!(!response.is_valid());
    assert_eq!(transport.api_requests().len(), 3);
    assert_eq!(transport.pending(), 1);
}

/// Tests that gateway errors are retried immediately and can recover.
#[tokio::test(start_paused = true)]
async fn test_server_error_retried_without_delay() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_error(502, "bad gateway");
    transport.push_page(vec![], None, None);

    let started = Instant::now();
    let response = client.arrays().list().await.unwrap();

    assert!(response.is_valid());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// Tests the 60 second backoff when the minute window tripped.
#[tokio::test(start_paused = true)]
async fn test_rate_limit_minute_window_backoff() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_rate_limited(100, 100);
    transport.push_page(vec![], None, None);

    let started = Instant::now();
    let response = client.arrays().list().await.unwrap();

    assert!(response.is_valid());
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert!(started.elapsed() < Duration::from_secs(61));
}

/// Tests the 1 second backoff when the second window tripped.
#[tokio::test(start_paused = true)]
async fn test_rate_limit_second_window_backoff() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_rate_limited(57, 100);
    transport.push_page(vec![], None, None);

    let started = Instant::now();
    let response = client.arrays().list().await.unwrap();

    assert!(response.is_valid());
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// Tests that an exhausted budget returns the rate-limit message.
#[tokio::test(start_paused = true)]
async fn test_rate_limit_without_budget() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 0);
    transport.push_rate_limited(57, 100);

    let started = Instant::now();
    let response = client.arrays().list().await.unwrap();

    let error = response.error().expect("error response");
    assert_eq!(error.status, 429);
    assert_eq!(
        error.errors[0].message.as_deref(),
        Some("API rate limit exceeded")
    );
    assert_eq!(error.headers.rate_limit.remaining_minute, Some(57));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// Tests that unclassified statuses fail the call.
#[tokio::test]
async fn test_unexpected_status_is_fatal() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_error(409, "conflict");

    let err = client.arrays().list().await.unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { status: 409, .. }));
    assert_eq!(transport.api_requests().len(), 1);
}

/// Tests that network failures propagate without retries.
#[tokio::test]
async fn test_network_error_propagates() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_network_error("connection refused");

    let err = client.arrays().list().await.unwrap_err();

    // the mock reports refused connections as io errors
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(transport.api_requests().len(), 1);
}

/// Tests that after logout a 401 is returned at once.
#[tokio::test]
async fn test_logout_disables_retries() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    client.logout().await.unwrap();

    transport.push_error(401, "unauthorized");
    let response = client.arrays().list().await.unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(transport.api_requests().len(), 1);
    assert_eq!(transport.count_path(LOGIN_PATH), 1);
}

/// Tests that retries spent by one call are gone for the next, clones included.
#[tokio::test]
async fn test_budget_shared_across_calls() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 1);

    transport.push_error(503, "unavailable");
    transport.push_page(vec![], None, None);
    assert!(client.arrays().list().await.unwrap().is_valid());
    assert_eq!(client.retries(), 0);

    transport.push_error(503, "unavailable");
    let response = client.clone().arrays().list().await.unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(transport.api_requests().len(), 3);
    assert_eq!(transport.pending(), 0);
}

/// Tests that the budget only shrinks on retried failures.
#[tokio::test]
async fn test_budget_untouched_by_terminal_failures() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 3);

    transport.push_error(404, "missing");
    transport.push_error(401, "expired");
    transport.push_page(vec![], None, None);
    assert_eq!(client.arrays().list().await.unwrap().status(), 404);
    assert!(client.arrays().list().await.unwrap().is_valid());

    assert_eq!(client.retries(), 2);
}

/// Tests request id and user agent headers on every attempt.
#[tokio::test]
async fn test_request_headers_on_retries() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_error(503, "unavailable");
    transport.push_page(vec![], None, None);

    let response = client.arrays().list().await.unwrap().into_result().unwrap();

    let calls = transport.api_requests();
    let first_id = calls[0].header("x-request-id").unwrap().to_string();
    assert_eq!(first_id.len(), 36);
    assert_eq!(calls[1].header("x-request-id"), Some(first_id.as_str()));
    assert_eq!(response.headers.x_request_id.as_deref(), Some(first_id.as_str()));
    assert_eq!(calls[1].header("user-agent"), Some(client.user_agent()));
    assert_eq!(calls[1].timeout, Some(Duration::from_secs(15)));
}
