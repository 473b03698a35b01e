//! The sync client over the HTTP transport, against a live server.

use std::sync::Arc;

use dive_catalog::record::Value;
use dive_catalog::resource::{self, AppState, ResourceRouter};
use dive_catalog::store::SqliteStore;
use dive_catalog::sync::{HttpTransport, SyncClient, SyncError};
use dive_catalog::LogNotifier;
use serde_json::json;

use crate::support::{config, record};

async fn start_server() -> (String, Arc<ResourceRouter>) {
    let router = Arc::new(ResourceRouter::new(Arc::new(
        SqliteStore::open_in_memory().unwrap(),
    )));
    let app = resource::router(AppState::new(router.clone(), Arc::new(LogNotifier)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), router)
}

async fn http_client() -> (SyncClient, Arc<ResourceRouter>) {
    let (base, router) = start_server().await;
    let transport = HttpTransport::new(&base).unwrap();
    (SyncClient::new(Arc::new(transport), config()), router)
}

#[tokio::test]
async fn round_trips_records_over_http() {
    let (client, router) = http_client().await;

    let created = client
        .create(
            "packages",
            record(json!({"name": "Adventure", "popular": true, "features": ["Night Dive"]})),
        )
        .await
        .unwrap();
    assert!(created.id().is_some());

    let packages = client.read("packages").await.unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].get("popular"), Some(&Value::Bool(true)));
    assert_eq!(
        packages[0].get("features"),
        Some(&Value::StringArray(vec!["Night Dive".into()]))
    );

    let stored = router.store().list("packages").unwrap();
    assert_eq!(stored[0].text("features"), Some(r#"["Night Dive"]"#));
}

#[tokio::test]
async fn status_codes_map_back_to_errors() {
    let (client, _) = http_client().await;

    assert_eq!(client.read("admin").await, Err(SyncError::AccessDenied));
    assert_eq!(
        client
            .update("team", "nobody", record(json!({"name": "x"})))
            .await,
        Err(SyncError::NotFound)
    );
    assert!(matches!(
        client.update("team", "", record(json!({"name": "x"}))).await,
        Err(SyncError::InvalidRequest(_))
    ));
    assert_eq!(
        client.read("boats").await,
        Err(SyncError::Store("Internal server error".into()))
    );
}

#[tokio::test]
async fn gallery_fallback_through_the_client() {
    let (client, router) = http_client().await;
    router
        .store()
        .insert(
            "gallery",
            &record(json!({"id": "", "url": "u1", "alt": "Manta", "type": "photo"})),
        )
        .unwrap();

    client
        .update(
            "gallery",
            "",
            record(json!({"url": "u1", "alt": "Manta", "categories": ["Reefs"]})),
        )
        .await
        .unwrap();

    let gallery = client.read("gallery").await.unwrap();
    assert_eq!(
        gallery[0].get("categories"),
        Some(&Value::StringArray(vec!["Reefs".into()]))
    );
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
    let client = SyncClient::new(Arc::new(transport), config());
    let err = client.read("courses").await.unwrap_err();
    assert!(err.is_network(), "{err:?}");
}
