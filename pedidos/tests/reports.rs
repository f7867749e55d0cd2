mod common;

use common::*;
use pedidos::{memory::InMemoryStore, prelude::*};

fn gateway() -> Gateway<InMemoryStore> {
    Gateway::new(InMemoryStore::new())
}

#[tokio::test]
async fn total_orders_counts_the_collection() {
    let gateway = gateway();
    let orders = gateway.repository::<Order>();
    for n in 0..4 {
        orders
            .create(order(n, "Pasta House", "2026-08-01", 10.0, 4))
            .await
            .unwrap();
    }

    let report = gateway.reports().total_orders().await.unwrap();
    assert_eq!(report, OrdersTotal { total_orders: 4 });
}

#[tokio::test]
async fn distinct_cuisines_deduplicates() {
    let gateway = gateway();
    let restaurants = gateway.repository::<Restaurant>();
    restaurants.create(restaurant("Pasta House", "Italian")).await.unwrap();
    restaurants.create(restaurant("La Trattoria", "Italian")).await.unwrap();
    restaurants.create(restaurant("Tacos El Rey", "Mexican")).await.unwrap();

    let mut report = gateway.reports().distinct_cuisines().await.unwrap();
    report.cuisines.sort();
    assert_eq!(report.cuisines, vec!["Italian", "Mexican"]);
}

#[tokio::test]
async fn top_restaurants_averages_joins_and_re_encodes() {
    let gateway = gateway();
    let restaurants = gateway.repository::<Restaurant>();
    let users = gateway.repository::<User>();
    let reviews = gateway.repository::<Review>();

    let rid = *restaurants
        .create(restaurant("Pasta House", "Italian"))
        .await
        .unwrap()
        .id()
        .unwrap();
    let other = *restaurants
        .create(restaurant("Sushi Bar", "Japanese"))
        .await
        .unwrap()
        .id()
        .unwrap();
    let uid = *users.create(user("ana", "ana@example.com")).await.unwrap().id().unwrap();

    for rating in [5, 4, 5] {
        reviews.create(review(rid, uid, rating)).await.unwrap();
    }
    reviews.create(review(other, uid, 2)).await.unwrap();

    let rows = gateway.reports().top_restaurants(Some(1)).await.unwrap();

    assert_eq!(rows.len(), 1);
    let top = &rows[0];
    assert_eq!(top.restaurant_id, rid.to_hex());
    assert_eq!(top.restaurant_name, "Pasta House");
    assert_eq!(top.reviews_count, 3);
    assert!((top.avg_rating - 14.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn top_restaurants_breaks_rating_ties_by_identifier() {
    let gateway = gateway();
    let restaurants = gateway.repository::<Restaurant>();
    let users = gateway.repository::<User>();
    let reviews = gateway.repository::<Review>();

    let a = *restaurants
        .create(restaurant("Pasta House", "Italian"))
        .await
        .unwrap()
        .id()
        .unwrap();
    let b = *restaurants
        .create(restaurant("Sushi Bar", "Japanese"))
        .await
        .unwrap()
        .id()
        .unwrap();
    let uid = *users.create(user("ana", "ana@example.com")).await.unwrap().id().unwrap();

    reviews.create(review(a, uid, 4)).await.unwrap();
    reviews.create(review(b, uid, 4)).await.unwrap();

    let rows = gateway.reports().top_restaurants(Some(2)).await.unwrap();

    let mut expected = vec![a.to_hex(), b.to_hex()];
    expected.sort();
    let actual: Vec<_> = rows.iter().map(|r| r.restaurant_id.clone()).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn most_expensive_items_ranks_by_price() {
    let gateway = gateway();
    let restaurants = gateway.repository::<Restaurant>();
    let items = gateway.repository::<MenuItem>();

    let rid = *restaurants
        .create(restaurant("Pasta House", "Italian"))
        .await
        .unwrap()
        .id()
        .unwrap();
    items.create(menu_item(rid, "Carbonara", 14.5)).await.unwrap();
    items.create(menu_item(rid, "Tartufo", 29.0)).await.unwrap();
    items.create(menu_item(rid, "Bruschetta", 7.0)).await.unwrap();

    let rows = gateway.reports().most_expensive_items(Some(2)).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Tartufo");
    assert_eq!(rows[0].price, 29.0);
    assert_eq!(rows[0].restaurant_id, rid.to_hex());
    assert_eq!(rows[1].name, "Carbonara");
}

#[tokio::test]
async fn daily_revenue_sums_per_date_in_date_order() {
    let gateway = gateway();
    let orders = gateway.repository::<Order>();

    orders.create(order(1, "Pasta House", "2026-08-02", 20.0, 4)).await.unwrap();
    orders.create(order(2, "Pasta House", "2026-08-01", 10.0, 4)).await.unwrap();
    orders.create(order(3, "Sushi Bar", "2026-08-01", 15.0, 5)).await.unwrap();

    let rows = gateway.reports().daily_revenue().await.unwrap();

    assert_eq!(
        rows,
        vec![
            DailyRevenue {
                date: "2026-08-01".to_string(),
                total_revenue: 25.0,
                orders_count: 2,
            },
            DailyRevenue {
                date: "2026-08-02".to_string(),
                total_revenue: 20.0,
                orders_count: 1,
            },
        ]
    );
}

#[tokio::test]
async fn non_positive_limits_are_client_errors() {
    let gateway = gateway();

    for limit in [0, -3] {
        let err = gateway.reports().top_restaurants(Some(limit)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        let err = gateway.reports().most_expensive_items(Some(limit)).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
    }
}

#[tokio::test]
async fn report_defaults_to_a_window_of_five() {
    let gateway = gateway();
    let restaurants = gateway.repository::<Restaurant>();
    let items = gateway.repository::<MenuItem>();

    let rid = *restaurants
        .create(restaurant("Pasta House", "Italian"))
        .await
        .unwrap()
        .id()
        .unwrap();
    for n in 0..8 {
        items
            .create(menu_item(rid, &format!("Dish {n}"), n as f64))
            .await
            .unwrap();
    }

    let rows = gateway.reports().most_expensive_items(None).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].price, 7.0);
}
