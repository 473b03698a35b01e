use std::sync::Arc;
use std::time::Duration;

use dive_catalog::sync::{Phase, SyncClient, SyncError};
use dive_catalog::SyncConfig;
use futures::future::join_all;
use serde_json::json;

use crate::support::{client, record, CountingTransport};

#[tokio::test(start_paused = true)]
async fn concurrent_reads_share_one_list() {
    let (client, transport) = client();
    transport.set_list_delay(Duration::from_millis(50));

    let results = join_all((0..10).map(|_| client.read("courses"))).await;
    assert_eq!(transport.lists(), 1);

    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
    assert_eq!(client.phase("courses"), Phase::Ready);
}

#[tokio::test]
async fn two_views_within_ttl_fetch_once() {
    let (client, transport) = client();
    let a = client.mount("team");
    let b = client.mount("team");

    a.data().await.unwrap();
    b.data().await.unwrap();
    assert_eq!(transport.lists(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_refetched() {
    let (client, transport) = client();

    client.read("services").await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    client.read("services").await.unwrap();
    assert_eq!(transport.lists(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    client.read("services").await.unwrap();
    assert_eq!(transport.lists(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_marks_failed_and_next_read_retries() {
    let (client, transport) = client();
    transport.set_list_delay(Duration::from_secs(60));

    let err = client.read("reviews").await.unwrap_err();
    assert_eq!(
        err,
        SyncError::Timeout {
            collection: "reviews".into(),
            after_ms: 10_000
        }
    );
    assert!(err.is_network());
    assert_eq!(client.phase("reviews"), Phase::Failed);
    assert_eq!(client.snapshot("reviews").unwrap().len(), 0);
    assert_eq!(client.last_error("reviews"), Some(err));

    transport.set_list_delay(Duration::ZERO);
    client.read("reviews").await.unwrap();
    assert_eq!(transport.lists(), 2);
    assert_eq!(client.phase("reviews"), Phase::Ready);
    assert_eq!(client.last_error("reviews"), None);
}

#[tokio::test]
async fn failed_list_caches_empty_result() {
    let (client, transport) = client();
    transport
        .router
        .create("team", record(json!({"id": "t1", "name": "Sara"})))
        .unwrap();
    transport.fail_lists(true);

    assert!(matches!(client.read("team").await, Err(SyncError::Store(_))));
    assert!(client.snapshot("team").unwrap().is_empty());

    transport.fail_lists(false);
    assert_eq!(client.read("team").await.unwrap().len(), 1);
}

#[tokio::test]
async fn server_errors_surface_through_read() {
    let (client, _) = client();
    assert_eq!(client.read("admin").await, Err(SyncError::AccessDenied));
    assert_eq!(client.phase("admin"), Phase::Failed);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn invalidated_fetch_is_not_cached() {
    let (client, transport) = client();
    transport.set_list_delay(Duration::from_millis(100));

    let reader = client.clone();
    let in_flight = tokio::spawn(async move { reader.read("packages").await });
    tokio::task::yield_now().await;
    assert_eq!(client.phase("packages"), Phase::Loading);

    client.invalidate("packages");
    assert_eq!(client.phase("packages"), Phase::Empty);

    in_flight.await.unwrap().unwrap();
    assert_eq!(client.phase("packages"), Phase::Empty);
    assert!(client.snapshot("packages").is_none());
}

#[tokio::test]
async fn array_fields_arrive_structured() {
    let (client, transport) = client();
    transport
        .router
        .store()
        .insert(
            "courses",
            &record(json!({"id": "c1", "title": "Open Water", "includes": "[\"Pool\"]"})),
        )
        .unwrap();

    let courses = client.read("courses").await.unwrap();
    assert_eq!(
        courses[0].get("includes"),
        Some(&dive_catalog::Value::StringArray(vec!["Pool".into()]))
    );
}

#[tokio::test]
async fn crashed_fetch_is_retried_on_next_read() {
    let (client, transport) = client();
    transport.panic_next_list();

    let first = client.read("team").await;
    assert!(matches!(first, Err(SyncError::Network(_))));
    assert_eq!(client.phase("team"), Phase::Failed);

    let second = client.read("team").await.unwrap();
    assert!(second.is_empty());
    assert_eq!(transport.lists(), 2);
    assert_eq!(client.phase("team"), Phase::Ready);
}

#[tokio::test]
async fn client_from_env_uses_environment_config() {
    let transport = CountingTransport::new();
    let client = SyncClient::from_env(transport.clone()).unwrap();
    assert_eq!(*client.config(), SyncConfig::from_env().unwrap());

    client.read("services").await.unwrap();
    client.read("services").await.unwrap();
    assert_eq!(transport.lists(), 1);
}
