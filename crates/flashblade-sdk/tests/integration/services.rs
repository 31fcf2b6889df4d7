//! Resource service integration tests.

use std::sync::Arc;

use bytes::Bytes;
use flashblade_sdk::client::RequestBody;
use flashblade_sdk::testkit::{MockReply, MockTransport};
use flashblade_sdk::{
    Error, FileSystem, FileSystemPatch, FileSystemPost, ListParams, ParamValue, ResourceRef,
};
use reqwest::Method;
use serde_json::json;

use super::common::*;

fn list(values: &[&str]) -> ParamValue {
    ParamValue::List(values.iter().map(ToString::to_string).collect())
}

/// Tests that create posts the names and a JSON body.
#[tokio::test]
async fn test_create_file_system() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(vec![file_system("fs-new")], None, None);

    let body = FileSystemPost {
        provisioned: Some(1_073_741_824),
        hard_limit_enabled: Some(true),
        ..FileSystemPost::default()
    };
    let created = client
        .file_systems()
        .create(["fs-new"], &body)
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(created[0].id.as_deref(), Some("id-fs-new"));

    let call = &transport.api_requests()[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/api/2.15/file-systems");
    assert_eq!(call.query.get("names"), Some(&list(&["fs-new"])));
    assert_eq!(
        call.body,
        Some(RequestBody::Json(json!({
            "provisioned": 1_073_741_824u64,
            "hard_limit_enabled": true
        })))
    );
}

/// Tests that update by fetched objects sends their ids.
#[tokio::test]
async fn test_update_by_fetched_objects() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(file_systems(0, 2), None, None);
    transport.push_page(vec![], None, None);

    let existing: Vec<FileSystem> = client
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

    let response = client
        .file_systems()
        .update(&existing, &FileSystemPatch::destroy())
        .await
        .unwrap();
    assert!(response.is_valid());

    let call = &transport.api_requests()[1];
    assert_eq!(call.method, Method::PATCH);
    assert_eq!(call.query.get("ids"), Some(&list(&["id-fs0", "id-fs1"])));
    assert!(!call.query.contains("names"));
    assert_eq!(call.body, Some(RequestBody::Json(json!({ "destroyed": true }))));
}

/// Tests that delete by name references sends names.
#[tokio::test]
async fn test_delete_by_name() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push(MockReply::raw(200, ""));

    let refs = [ResourceRef::by_name("fs0"), ResourceRef::by_name("fs1")];
    let response = client.file_systems().delete(&refs).await.unwrap();

    assert!(response.is_valid());
    let call = &transport.api_requests()[0];
    assert_eq!(call.method, Method::DELETE);
    assert_eq!(call.query.get("names"), Some(&list(&["fs0", "fs1"])));
    assert!(call.body.is_none());
}

/// Tests that a batch without a uniform identifier never reaches the wire.
#[tokio::test]
async fn test_mixed_references_rejected() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);

    let refs = [ResourceRef::by_id("a1"), ResourceRef::by_name("fs1")];
    let err = client.file_systems().delete(&refs).await.unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(transport.request_count(), 0);
}

/// Tests that list references replace explicit names.
#[tokio::test]
async fn test_bucket_list_with_references() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(vec![json!({"id": "b1", "name": "logs"})], None, None);

    let refs = [ResourceRef::by_id("b1")];
    let params = ListParams::new()
        .names(["ignored"])
        .references(&refs)
        .sort_by("name", false);
    let buckets = client
        .buckets()
        .list(&params)
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(buckets[0].name.as_deref(), Some("logs"));
    let call = &transport.api_requests()[0];
    assert_eq!(call.path, "/api/2.15/buckets");
    assert_eq!(call.query.get("ids"), Some(&list(&["b1"])));
    assert!(!call.query.contains("names"));
    assert_eq!(call.query.get("sort"), Some(&list(&["name"])));
}

/// Tests that policy and member references resolve into separate groups.
#[tokio::test]
async fn test_policy_members_resolve_both_groups() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(
        vec![json!({
            "member": {"id": "id-fs0", "name": "fs0"},
            "policy": {"name": "daily"}
        })],
        None,
        None,
    );

    let policies = [ResourceRef::by_name("daily")];
    let members = [ResourceRef::by_id("id-fs0")];
    let found = client
        .policies()
        .list_file_system_members(&policies, &members, &ListParams::new().limit(10))
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    let member = found[0].member.as_ref().unwrap();
    assert_eq!(member.name.as_deref(), Some("fs0"));
    assert_eq!(found[0].policy, Some(ResourceRef::by_name("daily")));
    let call = &transport.api_requests()[0];
    assert_eq!(call.path, "/api/2.15/policies/file-systems");
    assert_eq!(call.query.get("policy_names"), Some(&list(&["daily"])));
    assert_eq!(call.query.get("member_ids"), Some(&list(&["id-fs0"])));
    assert_eq!(call.query.get("limit"), Some(&ParamValue::Single("10".into())));
    assert!(!call.query.contains("policy_ids"));
}

/// Tests that a log download yields the raw payload as one item.
#[tokio::test]
async fn test_log_download_raw_payload() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push(MockReply::raw(200, "Jan 1 00:00:00 fb01 kernel: ok\n"));

    let response = client
        .logs()
        .download(1_700_000_000_000, 1_700_000_600_000)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let mut items = response.into_items();

    assert_eq!(
        items.next().await.unwrap(),
        Some(Bytes::from_static(b"Jan 1 00:00:00 fb01 kernel: ok\n"))
    );
    assert!(items.next().await.unwrap().is_none());

    let call = &transport.api_requests()[0];
    assert_eq!(call.path, "/api/2.15/logs");
    assert_eq!(
        call.query.get("start_time"),
        Some(&ParamValue::Single("1700000000000".into()))
    );
}

/// Tests that a singleton document becomes a one-item result.
#[tokio::test]
async fn test_singleton_response() {
    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_json(200, json!({"id": "a1", "name": "fb01", "os": "Purity//FB"}));

    let arrays = client
        .arrays()
        .list()
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .into_items()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(arrays.len(), 1);
    assert_eq!(arrays[0].name.as_deref(), Some("fb01"));
}

/// Tests a hand-built call through the generic entry point.
#[tokio::test]
async fn test_generic_call() {
    use flashblade_sdk::{ApiCall, Endpoint, Params};

    let transport = Arc::new(MockTransport::new());
    let client = api_token_client(&transport, 5);
    transport.push_page(vec![json!({"name": "s3-account"})], None, None);

    let endpoint = Endpoint::<ResourceRef>::get(client.api_path("object-store-accounts"));
    let call = ApiCall::new(endpoint, Params::new()).with_request_id("req-fixed");
    let response = client.call(call).await.unwrap().into_result().unwrap();

    assert_eq!(response.headers.x_request_id.as_deref(), Some("req-fixed"));
    let call = &transport.api_requests()[0];
    assert_eq!(call.path, "/api/2.15/object-store-accounts");
    assert_eq!(call.header("x-request-id"), Some("req-fixed"));
}
