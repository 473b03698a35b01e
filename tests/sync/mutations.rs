use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dive_catalog::catalog::{Course, Review};
use dive_catalog::sync::{Phase, SyncError};
use serde_json::json;

use crate::support::{client, record};

#[tokio::test]
async fn read_after_write_sees_the_new_record() {
    let (client, transport) = client();
    assert!(client.read("courses").await.unwrap().is_empty());

    let created = client
        .create(
            "courses",
            record(json!({"title": "Advanced", "includes": ["A", "B"]})),
        )
        .await
        .unwrap();
    let id = created.id().unwrap();

    let cached = client.snapshot("courses").unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id(), Some(id));
    assert_eq!(client.phase("courses"), Phase::Ready);
    assert_eq!(transport.lists(), 2);

    // Served from the refreshed entry.
    client.read("courses").await.unwrap();
    assert_eq!(transport.lists(), 2);
}

#[tokio::test]
async fn each_successful_mutation_publishes_once() {
    let (client, _) = client();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = client.subscribe("services", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    client
        .create("services", record(json!({"id": "s1", "name": "Rental"})))
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client
        .update("services", "s1", record(json!({"name": "Gear Rental"})))
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    client.delete("services", "s1").await.unwrap();
    client.delete("services", "s1").await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let (client, transport) = client();
    let before = client.read("team").await.unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = client.subscribe("team", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    transport.fail_mutations(true);
    let err = client
        .create("team", record(json!({"name": "Ibrahim"})))
        .await
        .unwrap_err();
    assert!(err.is_network());

    assert!(Arc::ptr_eq(&before, &client.snapshot("team").unwrap()));
    assert_eq!(transport.lists(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_rejections_propagate() {
    let (client, _) = client();
    assert_eq!(
        client
            .update("services", "missing", record(json!({"name": "x"})))
            .await,
        Err(SyncError::NotFound)
    );
    assert!(matches!(
        client.update("courses", "", record(json!({"title": "x"}))).await,
        Err(SyncError::InvalidRequest(_))
    ));
    assert_eq!(
        client.create("admin", record(json!({"username": "x"}))).await,
        Err(SyncError::AccessDenied)
    );
}

#[tokio::test]
async fn update_never_changes_the_identifier() {
    let (client, transport) = client();
    client
        .create("services", record(json!({"id": "s1", "name": "Rental"})))
        .await
        .unwrap();

    client
        .update(
            "services",
            "s1",
            record(json!({"id": "other", "name": "Gear Rental"})),
        )
        .await
        .unwrap();

    let rows = transport.router.list("services").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), Some("s1"));
}

#[tokio::test]
async fn refresh_failure_after_mutation_still_reports_success() {
    let (client, transport) = client();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = client.subscribe("reviews", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    transport.fail_lists(true);
    client
        .create("reviews", record(json!({"name": "Anna", "rating": 5})))
        .await
        .unwrap();

    assert_eq!(client.phase("reviews"), Phase::Failed);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    transport.fail_lists(false);
    assert_eq!(client.read("reviews").await.unwrap().len(), 1);
}

#[tokio::test]
async fn typed_reads_skip_records_that_do_not_decode() {
    let (client, transport) = client();
    client
        .create(
            "courses",
            record(json!({"id": "c1", "title": "Open Water", "maxDepth": "18m", "includes": ["Pool"]})),
        )
        .await
        .unwrap();

    let courses: Vec<Course> = client.read_models().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].max_depth.as_deref(), Some("18m"));
    assert_eq!(courses[0].includes, vec!["Pool"]);

    transport
        .router
        .create("reviews", record(json!({"id": "r1", "name": "Anna", "rating": 5})))
        .unwrap();
    transport
        .router
        .create("reviews", record(json!({"id": "r2", "name": "Kenji", "rating": "five"})))
        .unwrap();

    let reviews: Vec<Review> = client.read_models().await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, Some(5));
}
