#![allow(dead_code)]

use pedidos::prelude::*;

pub fn order(order_id: i64, restaurant: &str, date: &str, total_amount: f64, rating: i32) -> Order {
    Order {
        id: None,
        order_id,
        restaurant: restaurant.to_string(),
        date: date.to_string(),
        total_amount,
        rating,
    }
}

pub fn restaurant(name: &str, cuisine: &str) -> Restaurant {
    Restaurant {
        id: None,
        name: name.to_string(),
        address: "Calle Mayor 1".to_string(),
        phone: "555-0100".to_string(),
        cuisine: cuisine.to_string(),
        opening_time: "12:00".to_string(),
        closing_time: "23:00".to_string(),
        location: GeoPoint::new(-3.70, 40.42),
    }
}

pub fn user(username: &str, email: &str) -> User {
    User {
        id: None,
        username: username.to_string(),
        email: email.to_string(),
        full_name: Some("Test User".to_string()),
        joined_date: "2026-01-15".to_string(),
    }
}

pub fn menu_item(restaurant_id: EntityId, name: &str, price: f64) -> MenuItem {
    MenuItem {
        id: None,
        restaurant_id,
        name: name.to_string(),
        description: None,
        price,
        available: true,
    }
}

pub fn review(restaurant_id: EntityId, user_id: EntityId, rating: i32) -> Review {
    Review {
        id: None,
        restaurant_id,
        user_id,
        rating,
        comment: None,
        date: "2026-08-01".to_string(),
    }
}
