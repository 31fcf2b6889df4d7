//! Lazy pagination integration tests.

use std::sync::Arc;

use flashblade_sdk::pagination::CONTINUATION_TOKEN;
use flashblade_sdk::testkit::MockTransport;
use flashblade_sdk::{Error, FileSystem, ListParams, ParamValue};
use futures::TryStreamExt;

use super::common::*;

fn names(items: &[FileSystem]) -> Vec<&str> {
    items.iter().filter_map(|fs| fs.name.as_deref()).collect()
}

/// Tests that a second page is fetched with the token once the first is drained.
#[tokio::test]
async fn test_fetches_next_page_lazily() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 2), Some("abc"), Some(true));
    transport.push_page(file_systems(2, 3), None, None);

    let response = client
        .file_systems()
        .list(&ListParams::new().limit(2))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(response.continuation_token.as_deref(), Some("abc"));

    let mut items = response.into_items();
    assert!(items.next().await.unwrap().is_some());
    assert!(items.next().await.unwrap().is_some());
    assert_eq!(transport.api_requests().len(), 1);

    let third = items.next().await.unwrap().unwrap();
    assert_eq!(third.name.as_deref(), Some("fs2"));
    assert!(items.next().await.unwrap().is_none());
    assert!(items.next().await.unwrap().is_none());

    let calls = transport.api_requests();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].query.get(CONTINUATION_TOKEN).is_none());
    assert_eq!(
        calls[1].query.to_query_pairs(),
        vec![
            ("continuation_token".to_string(), "abc".to_string()),
            ("limit".to_string(), "2".to_string()),
        ]
    );
    assert_eq!(calls[0].header("x-request-id"), calls[1].header("x-request-id"));
}

/// Tests that pages are drained in order across several fetches.
#[tokio::test]
async fn test_collect_all_preserves_order() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 2), Some("p2"), None);
    transport.push_page(file_systems(2, 4), Some("p3"), Some(true));
    transport.push_page(file_systems(4, 5), None, Some(false));

    let items = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(names(&items), vec!["fs0", "fs1", "fs2", "fs3", "fs4"]);
    assert_eq!(transport.api_requests().len(), 3);
    assert_eq!(transport.pending(), 0);
}

/// Tests that `more_items_remaining: false` stops paging despite a token.
#[tokio::test]
async fn test_more_items_remaining_false_stops() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 2), Some("abc"), Some(false));

    let items = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(transport.api_requests().len(), 1);
}

/// Tests that a failed page fetch ends the sequence with an error.
#[tokio::test]
async fn test_page_fetch_error_terminates() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 1), Some("abc"), Some(true));
    transport.push_error(400, "continuation token expired");

    let mut items = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items();

    assert!(items.next().await.unwrap().is_some());
    let err = items.next().await.unwrap_err();
    match err {
        Error::PageFetch { status, errors } => {
            assert_eq!(status, 400);
            assert_eq!(errors[0].message.as_deref(), Some("continuation token expired"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(items.is_exhausted());
    assert!(items.next().await.unwrap().is_none());
    assert_eq!(transport.api_requests().len(), 2);
}

/// Tests that page fetches go through the retry loop.
#[tokio::test]
async fn test_page_fetch_reauthenticates() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 1), Some("abc"), None);
    transport.push_error(401, "session expired");
    transport.push_page(file_systems(1, 2), None, None);

    let items = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(names(&items), vec!["fs0", "fs1"]);
    let calls = transport.api_requests();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].header("x-auth-token"), Some("session-2"));
    assert_eq!(
        calls[2].query.get(CONTINUATION_TOKEN),
        Some(&ParamValue::Single("abc".into()))
    );
}

/// Tests the stream adapter.
#[tokio::test]
async fn test_into_stream() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 1), Some("abc"), None);
    transport.push_page(file_systems(1, 3), None, None);

    let stream = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .into_stream();

    let items: Vec<FileSystem> = stream.try_collect().await.unwrap();
    assert_eq!(names(&items), vec!["fs0", "fs1", "fs2"]);
}

/// Tests that the reported total item count is carried by the iterator.
#[tokio::test]
async fn test_total_item_count() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_json(
        200,
        serde_json::json!({
            "items": file_systems(0, 2),
            "total_item_count": 2,
            "more_items_remaining": false
        }),
    );

    let response = client
        .file_systems()
        .list(&ListParams::new())
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(response.total_item_count, Some(2));
    let items = response.into_items();
    assert_eq!(items.total_item_count(), Some(2));
    assert_eq!(items.buffered(), 2);
    assert!(!items.request_id().is_empty());
}
