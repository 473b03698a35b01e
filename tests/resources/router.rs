use dive_catalog::record::Value;
use dive_catalog::resource::ResourceError;
use serde_json::json;

use crate::support::{empty_router, record, seeded_router};

#[test]
fn create_then_list_contains_the_record() {
    let router = empty_router();
    let created = router
        .create(
            "excursions",
            record(json!({"title": "Manta Point", "location": "South Ari"})),
        )
        .unwrap();
    let id = created.id().unwrap().to_string();

    let listed = router.list("excursions").unwrap();
    let found = listed.iter().find(|r| r.id() == Some(id.as_str())).unwrap();
    assert_eq!(found.text("title"), Some("Manta Point"));
    assert_eq!(found.text("location"), Some("South Ari"));
}

#[test]
fn includes_are_stored_as_text_and_listed_as_arrays() {
    let router = empty_router();
    router
        .create(
            "courses",
            record(json!({"id": "abc", "title": "Advanced", "includes": ["A", "B"]})),
        )
        .unwrap();

    let stored = router.store().list("courses").unwrap();
    assert_eq!(stored[0].text("includes"), Some(r#"["A","B"]"#));

    let listed = router.list("courses").unwrap();
    assert_eq!(
        listed[0].get("includes"),
        Some(&Value::StringArray(vec!["A".into(), "B".into()]))
    );
}

#[test]
fn admin_cannot_be_listed() {
    let router = seeded_router();
    assert!(matches!(router.list("admin"), Err(ResourceError::AccessDenied)));
}

#[test]
fn seeded_catalog_lists_every_collection() {
    let router = seeded_router();
    assert_eq!(router.list("courses").unwrap().len(), 3);
    assert_eq!(router.list("excursions").unwrap().len(), 6);
    assert_eq!(router.list("gallery").unwrap().len(), 8);

    let packages = router.list("packages").unwrap();
    let popular: Vec<_> = packages
        .iter()
        .filter(|p| p.get("popular") == Some(&Value::Bool(true)))
        .collect();
    assert_eq!(popular.len(), 1);
}

#[test]
fn repairing_gallery_ids_makes_rows_addressable() {
    let router = empty_router();
    router
        .store()
        .insert(
            "gallery",
            &record(json!({"id": "", "url": "u1", "alt": "Wreck", "type": "photo"})),
        )
        .unwrap();

    assert_eq!(router.repair_gallery_ids().unwrap(), 1);
    let id = router.list("gallery").unwrap()[0].id().unwrap().to_string();

    router
        .update("gallery", &id, record(json!({"type": "video"})))
        .unwrap();
    assert_eq!(router.list("gallery").unwrap()[0].text("type"), Some("video"));
}

#[test]
fn field_names_cannot_inject() {
    let router = empty_router();
    let result = router.create(
        "team",
        record(json!({"name": "x", "role) VALUES ('a'); DROP TABLE team; --": "y"})),
    );
    assert!(matches!(result, Err(ResourceError::Store(_))));
    assert!(router.list("team").unwrap().is_empty());
}
