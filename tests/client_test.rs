//! Client facade behavior tests.

use list_kit::{Client, CreateOptions, DriverKind, Error};
use serde_json::json;

#[tokio::test]
async fn test_malformed_create_options_are_rejected() {
    let err = CreateOptions::from_value(json!({
        "uuid": "fake list",
        "not-allowed-key": 1,
    }))
    .unwrap_err();

    assert!(matches!(err, Error::MalformedConfig(_)));
}

#[test]
fn test_create_options_accept_kebab_case_keys() {
    let options = CreateOptions::from_value(json!({
        "uuid": "fake list",
        "element-uuid": "id",
        "chunk-size": 10,
        "ttl": 3600,
        "headers": {"hash": "ec457d0a974c48d5685a7efa03d137dc8bbde7e3"},
    }))
    .expect("Failed to parse options");

    assert_eq!(options.uuid.as_deref(), Some("fake list"));
    assert_eq!(options.element_uuid.as_deref(), Some("id"));
    assert_eq!(options.chunk_size, Some(10));
    assert_eq!(options.ttl, Some(3600));
    assert_eq!(options.headers.len(), 1);
}

#[test]
fn test_unknown_driver_name_is_rejected() {
    let err = "not-allowed-driver".parse::<DriverKind>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "not-allowed-driver is not a supported driver."
    );
}

#[tokio::test]
async fn test_create_from_parsed_options() {
    let client = Client::in_memory();
    let options = CreateOptions::from_value(json!({
        "uuid": "fake list",
        "element-uuid": "id",
        "chunk-size": 2,
    }))
    .expect("Failed to parse options");

    let records = vec![
        json!({"id": 1, "name": "Leanne Graham"}),
        json!({"id": 2, "name": "Ervin Howell"}),
        json!({"id": 3, "name": "Clementine Bauch"}),
    ];
    let collection = client
        .create(records, &options)
        .await
        .expect("Failed to create list");

    assert_eq!(collection.uuid, "fake-list");
    assert_eq!(collection.items_count, 3);
    assert_eq!(collection.chunk_uuids.len(), 2);
}

#[tokio::test]
async fn test_zero_chunk_size_means_single_chunk() {
    let client = Client::in_memory();
    let options = CreateOptions::default()
        .with_uuid("unbounded")
        .with_chunk_size(0);

    let records: Vec<serde_json::Value> = (1..=50).map(|i| json!({"id": i})).collect();
    let collection = client
        .create(records, &options)
        .await
        .expect("Failed to create list");

    assert_eq!(collection.chunk_uuids.len(), 1);
    assert_eq!(collection.items_count, 50);
}

#[tokio::test]
async fn test_zero_ttl_means_no_expiry() {
    let client = Client::in_memory();
    let options = CreateOptions::default().with_uuid("eternal").with_ttl(0);

    client
        .create(vec![json!({"id": 1})], &options)
        .await
        .expect("Failed to create list");

    assert_eq!(
        client
            .get_ttl("eternal")
            .await
            .expect("Failed to get ttl"),
        None
    );
}

#[tokio::test]
async fn test_remove_list_from_index_hides_the_list() {
    let client = Client::in_memory();
    client
        .create(
            vec![json!({"id": 1})],
            &CreateOptions::default().with_uuid("fake list"),
        )
        .await
        .expect("Failed to create list");

    client
        .remove_list_from_index("fake-list")
        .await
        .expect("Failed to remove from index");

    assert!(client
        .find_list_by_uuid("fake-list")
        .await
        .expect("Failed to find list")
        .is_none());
    assert_eq!(client.index_len().await.expect("Failed to read index"), 0);
}

#[tokio::test]
async fn test_repository_accessor_reaches_the_same_data() {
    let client = Client::in_memory();
    client
        .create(
            vec![json!({"id": 1}), json!({"id": 2})],
            &CreateOptions::default()
                .with_uuid("shared")
                .with_element_uuid("id"),
        )
        .await
        .expect("Failed to create list");

    let elements = client
        .repository()
        .find_by_uuid("shared")
        .await
        .expect("Failed to find list")
        .expect("List expected");
    assert_eq!(elements.len(), 2);
    assert_eq!(client.driver(), DriverKind::InMemory);
}
