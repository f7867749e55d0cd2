//! The five entity types the gateway serves, and their list filters.
//!
//! Each entity is a typed record with an explicit field set; identity rides
//! as `_id` and is absent until the store assigns it. The `*Filter` types
//! own the entity-specific matching rules for list requests (exact match vs
//! case-insensitive substring, identifier fields validated through the
//! codec); everything else about a list request is shared and lives in
//! [`crate::query`].

use bson::Bson;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    entity::Entity,
    error::{GatewayError, GatewayResult},
    id::EntityId,
    query::{Expr, Filter},
};

/// Checks that a date field holds an ISO `YYYY-MM-DD` string.
fn validate_iso_date(field: &str, value: &str) -> GatewayResult<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            GatewayError::Validation(format!("{field} must be an ISO date (YYYY-MM-DD), got '{value}'"))
        })
}

/// Folds a set of optional field expressions into one conjunction.
fn all_of(exprs: Vec<Option<Expr>>) -> Option<Expr> {
    let mut present = exprs.into_iter().flatten();
    let first = present.next()?;
    Some(present.fold(first, Expr::and))
}

/// GeoJSON point: `{ "type": "Point", "coordinates": [longitude, latitude] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    /// Creates a point from a longitude/latitude pair.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { kind: "Point".to_string(), coordinates: [longitude, latitude] }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// A placed order. `order_id` is unique at the store level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub order_id: i64,
    /// Restaurant name, stored denormalized on the order.
    pub restaurant: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub total_amount: f64,
    /// Customer rating, 1-5.
    pub rating: i32,
}

impl Entity for Order {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn collection_name() -> &'static str {
        "orders"
    }

    fn validate(&self) -> GatewayResult<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(GatewayError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        validate_iso_date("date", &self.date)
    }
}

/// List filter for orders: exact restaurant name, exact date.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub restaurant: Option<String>,
    pub date: Option<String>,
}

impl OrderFilter {
    /// Builds the filter predicate, or `None` when no field is set.
    pub fn into_expr(self) -> GatewayResult<Option<Expr>> {
        Ok(all_of(vec![
            self.restaurant.map(|v| Filter::eq("restaurant", v)),
            self.date.map(|v| Filter::eq("date", v)),
        ]))
    }
}

/// A restaurant and its opening metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub cuisine: String,
    pub opening_time: String,
    pub closing_time: String,
    pub location: GeoPoint,
}

impl Entity for Restaurant {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn collection_name() -> &'static str {
        "restaurants"
    }

    fn validate(&self) -> GatewayResult<()> {
        if self.location.kind != "Point" {
            return Err(GatewayError::Validation(format!(
                "location.type must be 'Point', got '{}'",
                self.location.kind
            )));
        }
        Ok(())
    }
}

/// List filter for restaurants: name as case-insensitive substring,
/// cuisine exact.
#[derive(Debug, Clone, Default)]
pub struct RestaurantFilter {
    pub name: Option<String>,
    pub cuisine: Option<String>,
}

impl RestaurantFilter {
    /// Builds the filter predicate, or `None` when no field is set.
    pub fn into_expr(self) -> GatewayResult<Option<Expr>> {
        Ok(all_of(vec![
            self.name.map(|v| Filter::contains("name", v)),
            self.cuisine.map(|v| Filter::eq("cuisine", v)),
        ]))
    }
}

/// A registered user. `email` is unique at the store level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub joined_date: String,
}

impl Entity for User {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn collection_name() -> &'static str {
        "users"
    }

    fn validate(&self) -> GatewayResult<()> {
        validate_iso_date("joined_date", &self.joined_date)
    }
}

/// List filter for users: username as case-insensitive substring, email
/// exact.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserFilter {
    /// Builds the filter predicate, or `None` when no field is set.
    pub fn into_expr(self) -> GatewayResult<Option<Expr>> {
        Ok(all_of(vec![
            self.username.map(|v| Filter::contains("username", v)),
            self.email.map(|v| Filter::eq("email", v)),
        ]))
    }
}

/// A dish on a restaurant's menu. The `restaurant_id` reference is stored
/// but never checked against an actual restaurant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub restaurant_id: EntityId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub available: bool,
}

impl Entity for MenuItem {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn collection_name() -> &'static str {
        "menu_items"
    }
}

/// List filter for menu items: restaurant reference (codec-validated) and
/// availability.
#[derive(Debug, Clone, Default)]
pub struct MenuItemFilter {
    pub restaurant_id: Option<String>,
    pub available: Option<bool>,
}

impl MenuItemFilter {
    /// Builds the filter predicate, or `None` when no field is set.
    ///
    /// # Errors
    ///
    /// Returns a client error naming `restaurant_id` when the reference does
    /// not parse; the query is never executed in that case.
    pub fn into_expr(self) -> GatewayResult<Option<Expr>> {
        let restaurant_id = self
            .restaurant_id
            .map(|raw| EntityId::parse_field("restaurant_id", &raw))
            .transpose()?;

        Ok(all_of(vec![
            restaurant_id.map(|id| Filter::eq("restaurant_id", Bson::from(id))),
            self.available.map(|v| Filter::eq("available", v)),
        ]))
    }
}

/// A user's review of a restaurant. Both references are stored unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub restaurant_id: EntityId,
    pub user_id: EntityId,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
}

impl Entity for Review {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn collection_name() -> &'static str {
        "reviews"
    }

    fn validate(&self) -> GatewayResult<()> {
        validate_iso_date("date", &self.date)
    }
}

/// List filter for reviews: restaurant and user references, both
/// codec-validated.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub restaurant_id: Option<String>,
    pub user_id: Option<String>,
}

impl ReviewFilter {
    /// Builds the filter predicate, or `None` when no field is set.
    ///
    /// # Errors
    ///
    /// Returns a client error naming the offending reference field when it
    /// does not parse.
    pub fn into_expr(self) -> GatewayResult<Option<Expr>> {
        let restaurant_id = self
            .restaurant_id
            .map(|raw| EntityId::parse_field("restaurant_id", &raw))
            .transpose()?;
        let user_id = self
            .user_id
            .map(|raw| EntityId::parse_field("user_id", &raw))
            .transpose()?;

        Ok(all_of(vec![
            restaurant_id.map(|id| Filter::eq("restaurant_id", Bson::from(id))),
            user_id.map(|id| Filter::eq("user_id", Bson::from(id))),
        ]))
    }
}
