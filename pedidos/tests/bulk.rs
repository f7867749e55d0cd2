mod common;

use common::*;
use bson::doc;
use pedidos::{memory::InMemoryStore, prelude::*};

fn gateway() -> Gateway<InMemoryStore> {
    Gateway::new(InMemoryStore::new())
}

fn insert_op(document: bson::Document) -> BulkOpRequest {
    BulkOpRequest {
        op_type: BulkOpType::Insert,
        document: Some(document),
        filter: None,
        update: None,
        upsert: false,
    }
}

fn update_op(filter: bson::Document, update: bson::Document, upsert: bool) -> BulkOpRequest {
    BulkOpRequest {
        op_type: BulkOpType::Update,
        document: None,
        filter: Some(filter),
        update: Some(update),
        upsert,
    }
}

fn delete_op(filter: bson::Document) -> BulkOpRequest {
    BulkOpRequest {
        op_type: BulkOpType::Delete,
        document: None,
        filter: Some(filter),
        update: None,
        upsert: false,
    }
}

#[tokio::test]
async fn ordered_batch_reports_aggregate_counts() {
    let gateway = gateway();

    let summary = gateway
        .bulk()
        .execute(
            "orders",
            vec![
                insert_op(doc! { "order_id": 1, "restaurant": "Pasta House", "rating": 3 }),
                insert_op(doc! { "order_id": 2, "restaurant": "Pasta House", "rating": 3 }),
                insert_op(doc! { "order_id": 3, "restaurant": "Sushi Bar", "rating": 2 }),
                update_op(doc! { "order_id": 1 }, doc! { "rating": 5 }, false),
                update_op(doc! { "order_id": 2 }, doc! { "rating": 4 }, false),
                delete_op(doc! { "order_id": 3 }),
            ],
        )
        .await
        .unwrap();

    assert_eq!(summary.inserted_count, 3);
    assert_eq!(summary.matched_count, 2);
    assert_eq!(summary.modified_count, 2);
    assert_eq!(summary.deleted_count, 1);
    assert!(summary.upserted_ids.is_empty());
}

#[tokio::test]
async fn delete_of_a_seeded_order_counts_once_then_zero() {
    let gateway = gateway();
    let orders = gateway.repository::<Order>();
    orders.create(order(42, "Pasta House", "2026-08-01", 12.0, 4)).await.unwrap();

    let request = vec![delete_op(doc! { "order_id": 42 })];

    let first = gateway.bulk().execute("orders", request.clone()).await.unwrap();
    assert_eq!(first.deleted_count, 1);

    let second = gateway.bulk().execute("orders", request).await.unwrap();
    assert_eq!(second.deleted_count, 0);
}

#[tokio::test]
async fn unknown_collection_rejects_the_batch_before_execution() {
    let gateway = gateway();

    let err = gateway
        .bulk()
        .execute("invoices", vec![insert_op(doc! { "order_id": 1 })])
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::CollectionNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::BadRequest);
}

#[tokio::test]
async fn malformed_operation_rejects_the_whole_batch() {
    let gateway = gateway();

    let err = gateway
        .bulk()
        .execute(
            "orders",
            vec![
                insert_op(doc! { "order_id": 1 }),
                // Update without an update map.
                BulkOpRequest {
                    op_type: BulkOpType::Update,
                    document: None,
                    filter: Some(doc! { "order_id": 1 }),
                    update: None,
                    upsert: false,
                },
            ],
        )
        .await
        .unwrap_err();

    match err {
        GatewayError::Validation(message) => assert!(message.contains("operation 1")),
        other => panic!("unexpected error: {other:?}"),
    }

    // Validation is atomic: the valid insert before the bad op never ran.
    let orders = gateway.repository::<Order>();
    let all = orders
        .list_raw(ListParams::default().into_query(None).unwrap())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn upsert_creates_a_document_and_reports_its_identifier() {
    let gateway = gateway();

    let summary = gateway
        .bulk()
        .execute(
            "orders",
            vec![update_op(
                doc! { "order_id": 99 },
                doc! { "restaurant": "Pasta House", "rating": 5 },
                true,
            )],
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 0);
    assert_eq!(summary.upserted_ids.len(), 1);

    // The identifier is a well-formed display string, and the document is
    // seeded from the filter plus the update map.
    let id = EntityId::parse(&summary.upserted_ids[0]).unwrap();
    let orders = gateway.repository::<Order>();
    let raw = orders
        .list_raw(
            ListParams::default()
                .into_query(Some(Filter::eq("order_id", 99)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].get_object_id("_id").unwrap(), id.as_object_id());
    assert_eq!(raw[0].get_str("restaurant").unwrap(), "Pasta House");

    // The same update now matches instead of upserting again.
    let second = gateway
        .bulk()
        .execute(
            "orders",
            vec![update_op(doc! { "order_id": 99 }, doc! { "rating": 4 }, true)],
        )
        .await
        .unwrap();
    assert_eq!(second.matched_count, 1);
    assert!(second.upserted_ids.is_empty());
}

#[tokio::test]
async fn update_merges_only_the_named_fields() {
    let gateway = gateway();
    let orders = gateway.repository::<Order>();
    let stored = orders.create(order(7, "Pasta House", "2026-08-01", 19.9, 3)).await.unwrap();

    gateway
        .bulk()
        .execute(
            "orders",
            vec![update_op(doc! { "order_id": 7 }, doc! { "rating": 5 }, false)],
        )
        .await
        .unwrap();

    let fetched = orders.get(stored.id().unwrap()).await.unwrap();
    assert_eq!(fetched.rating, 5);
    // Unlisted fields are preserved.
    assert_eq!(fetched.restaurant, "Pasta House");
    assert_eq!(fetched.total_amount, 19.9);
    assert_eq!(fetched.date, "2026-08-01");
}

#[tokio::test]
async fn duplicate_key_mid_batch_aborts_the_remainder() {
    let gateway = gateway();
    gateway.create_index("orders", "order_id", true).await.unwrap();

    let err = gateway
        .bulk()
        .execute(
            "orders",
            vec![
                insert_op(doc! { "order_id": 1, "restaurant": "Pasta House" }),
                insert_op(doc! { "order_id": 1, "restaurant": "Sushi Bar" }),
                insert_op(doc! { "order_id": 2, "restaurant": "Tacos El Rey" }),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::UniqueConstraintViolation(_)));

    // Ordered execution: the first insert applied, the rest did not.
    let orders = gateway.repository::<Order>();
    let all = orders
        .list_raw(ListParams::default().into_query(None).unwrap())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get_str("restaurant").unwrap(), "Pasta House");
}
