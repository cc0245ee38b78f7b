//! Property tests for chunk partitioning.

use list_kit::backend::InMemoryBackend;
use list_kit::{CreateOptions, ListBackend, ListRepository};
use proptest::prelude::*;
use serde_json::json;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Chunk count is always ceil(n / k) and reads reassemble the exact
    /// input order, whatever the list length and chunk size.
    #[test]
    fn chunking_is_transparent(n in 0usize..120, k in 1usize..16) {
        block_on(async move {
            let repo = ListRepository::new(InMemoryBackend::new());
            let records: Vec<serde_json::Value> =
                (0..n).map(|i| json!({"id": i, "payload": i * 7})).collect();
            let options = CreateOptions::default()
                .with_uuid("prop-list")
                .with_element_uuid("id")
                .with_chunk_size(k);

            let collection = repo
                .create(records, &options)
                .await
                .expect("Failed to create list");

            let expected_chunks = n.div_ceil(k);
            prop_assert_eq!(collection.chunk_uuids.len(), expected_chunks);
            prop_assert_eq!(collection.items_count, n);

            let elements = repo
                .find_by_uuid("prop-list")
                .await
                .expect("Failed to find list")
                .expect("List expected");
            let ids: Vec<String> = elements.iter().map(|e| e.uuid.clone()).collect();
            let expected: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            prop_assert_eq!(ids, expected);
            Ok(())
        })?;
    }

    /// Pushing after create keeps count, order and chunk bounds consistent.
    #[test]
    fn pushes_respect_chunk_capacity(n in 1usize..40, k in 1usize..8, pushes in 1usize..10) {
        block_on(async move {
            let repo = ListRepository::new(InMemoryBackend::new());
            let records: Vec<serde_json::Value> =
                (0..n).map(|i| json!({"id": i})).collect();
            let options = CreateOptions::default()
                .with_uuid("prop-push")
                .with_element_uuid("id")
                .with_chunk_size(k);
            repo.create(records, &options)
                .await
                .expect("Failed to create list");

            for p in 0..pushes {
                repo.push_element("prop-push", (n + p).to_string(), &json!({"id": n + p}))
                    .await
                    .expect("Failed to push element");
            }

            let elements = repo
                .find_by_uuid("prop-push")
                .await
                .expect("Failed to find list")
                .expect("List expected");
            prop_assert_eq!(elements.len(), n + pushes);
            prop_assert_eq!(
                repo.get_counter("prop-push").await.expect("Failed to read counter"),
                (n + pushes) as i64
            );

            // No stored chunk may exceed the configured capacity
            let index_bytes = repo
                .backend()
                .get(list_kit::key::INDEX_KEY)
                .await
                .expect("Failed to read index")
                .expect("Index expected");
            let index = list_kit::ListIndex::decode(&index_bytes).expect("Failed to decode index");
            let meta = index.get("prop-push").expect("Metadata expected");
            prop_assert_eq!(meta.items_count, n + pushes);
            for chunk_key in &meta.chunk_uuids {
                let bytes = repo
                    .backend()
                    .get(chunk_key)
                    .await
                    .expect("Failed to read chunk")
                    .expect("Chunk expected");
                let chunk: Vec<list_kit::ListElement> =
                    list_kit::serialization::decode(&bytes).expect("Failed to decode chunk");
                prop_assert!(chunk.len() <= k);
            }
            Ok(())
        })?;
    }
}
