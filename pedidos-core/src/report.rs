//! The aggregation-based report engine.
//!
//! Five stateless, read-only queries over the stored documents. The store
//! supplies the aggregation primitives
//! ([`grouped_average`](crate::backend::StoreBackend::grouped_average),
//! [`grouped_sum`](crate::backend::StoreBackend::grouped_sum),
//! [`distinct_values`](crate::backend::StoreBackend::distinct_values),
//! [`count_documents`](crate::backend::StoreBackend::count_documents));
//! ranking policy lives here so every backend shares one tie-break rule:
//! equal averages order ascending by group identifier.

use bson::Bson;
use serde::Serialize;
use std::cmp::Ordering;

use crate::{
    backend::{GroupStats, StoreBackend},
    error::{GatewayError, GatewayResult},
    id::EntityId,
    query::{Query, SortDirection},
};

/// Default top-N window when the caller does not supply one.
const DEFAULT_REPORT_LIMIT: i64 = 5;

/// Total number of orders on record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdersTotal {
    pub total_orders: u64,
}

/// The set of cuisines served across all restaurants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineList {
    pub cuisines: Vec<String>,
}

/// One row of the top-restaurants ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantRating {
    pub restaurant_id: String,
    pub restaurant_name: String,
    #[serde(rename = "avgRating")]
    pub avg_rating: f64,
    pub reviews_count: u64,
}

/// One row of the most-expensive-items ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensiveItem {
    pub name: String,
    pub price: f64,
    pub restaurant_id: String,
}

/// Revenue summed over one order date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: String,
    pub total_revenue: f64,
    pub orders_count: u64,
}

/// Read-only analytics over the entity collections.
#[derive(Debug)]
pub struct ReportEngine<'a, B: StoreBackend> {
    backend: &'a B,
}

impl<'a, B: StoreBackend> ReportEngine<'a, B> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Count of all order documents.
    pub async fn total_orders(&self) -> GatewayResult<OrdersTotal> {
        Ok(OrdersTotal {
            total_orders: self.backend.count_documents("orders").await?,
        })
    }

    /// Unique cuisine values across restaurants, order unspecified.
    pub async fn distinct_cuisines(&self) -> GatewayResult<CuisineList> {
        let cuisines = self
            .backend
            .distinct_values("restaurants", "cuisine")
            .await?
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();

        Ok(CuisineList { cuisines })
    }

    /// Top-N restaurants by average review rating.
    ///
    /// Reviews are grouped by restaurant reference, averaged, ranked
    /// descending by average (ties ascending by identifier), truncated to N,
    /// then each group is joined to its restaurant document to attach the
    /// name. Groups whose restaurant no longer exists are dropped.
    pub async fn top_restaurants(
        &self,
        limit: Option<i64>,
    ) -> GatewayResult<Vec<RestaurantRating>> {
        let limit = report_limit(limit)?;

        let mut groups = self
            .backend
            .grouped_average("reviews", "restaurant_id", "rating")
            .await?;
        rank_descending(&mut groups);
        groups.truncate(limit);

        let mut rows = Vec::with_capacity(groups.len());
        for group in groups {
            let Bson::ObjectId(oid) = group.key else {
                continue;
            };
            let id = EntityId::from_object_id(oid);

            let Some(restaurant) = self.backend.find_by_id("restaurants", &id).await? else {
                continue;
            };
            let name = restaurant
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string();

            rows.push(RestaurantRating {
                restaurant_id: id.to_hex(),
                restaurant_name: name,
                avg_rating: group.value,
                reviews_count: group.count,
            });
        }

        Ok(rows)
    }

    /// Top-N menu items by price, projected to name/price/restaurant
    /// reference.
    pub async fn most_expensive_items(
        &self,
        limit: Option<i64>,
    ) -> GatewayResult<Vec<ExpensiveItem>> {
        let limit = report_limit(limit)?;

        let query = Query::builder()
            .projection(vec![
                "name".to_string(),
                "price".to_string(),
                "restaurant_id".to_string(),
            ])
            .sort("price", SortDirection::Desc)
            .limit(limit as i64)
            .build();

        Ok(self
            .backend
            .find("menu_items", query)
            .await?
            .into_iter()
            .map(|doc| ExpensiveItem {
                name: doc
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                price: numeric(doc.get("price")),
                restaurant_id: doc
                    .get("restaurant_id")
                    .and_then(|v| v.as_object_id())
                    .map(|oid| oid.to_hex())
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// Revenue summed per order date, ascending by date.
    pub async fn daily_revenue(&self) -> GatewayResult<Vec<DailyRevenue>> {
        let mut groups = self
            .backend
            .grouped_sum("orders", "date", "total_amount")
            .await?;
        groups.sort_by(|a, b| key_display(&a.key).cmp(&key_display(&b.key)));

        Ok(groups
            .into_iter()
            .map(|group| DailyRevenue {
                date: match group.key {
                    Bson::String(s) => s,
                    other => key_display(&other),
                },
                total_revenue: group.value,
                orders_count: group.count,
            })
            .collect())
    }
}

/// Resolves the caller-supplied N, defaulting to 5.
///
/// # Errors
///
/// N below 1 is a client error.
fn report_limit(limit: Option<i64>) -> GatewayResult<usize> {
    let limit = limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    if limit < 1 {
        return Err(GatewayError::Validation(format!(
            "limit must be a positive integer, got {limit}"
        )));
    }

    Ok(limit as usize)
}

/// Ranks groups descending by value; equal values order ascending by the
/// key's display encoding, so the ranking is deterministic across backends.
fn rank_descending(groups: &mut [GroupStats]) {
    groups.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| key_display(&a.key).cmp(&key_display(&b.key)))
    });
}

fn key_display(key: &Bson) -> String {
    match key {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn numeric(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}
