//! Unified entry point for the pedidos gateway.
//!
//! A gateway between client callers and a schema-less document store
//! serving five entity types - orders, restaurants, users, menu items,
//! reviews - plus binary attachments. The crate re-exports the core
//! components and the available backends.
//!
//! - **Identifier codec** - every raw identifier string is validated into
//!   an opaque `EntityId` before it reaches the store
//! - **Query builder** - entity-specific filters plus shared
//!   projection/sort/pagination construction
//! - **Entity repository** - one generic CRUD contract instantiated per
//!   entity type
//! - **Bulk mutation engine** - validated heterogeneous batches against a
//!   named collection, executed in one store call
//! - **Report engine** - counts, distinct values, and top-N rankings
//! - **Blob store facade** - upload/download of attachments by generated
//!   identifier
//!
//! # Quick Start
//!
//! ```ignore
//! use pedidos::{prelude::*, memory::InMemoryStore, model::Restaurant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Gateway::new(InMemoryStore::new());
//!     let restaurants = gateway.repository::<Restaurant>();
//!
//!     let stored = restaurants.create(Restaurant {
//!         id: None,
//!         name: "Pasta House".to_string(),
//!         address: "Calle Mayor 1".to_string(),
//!         phone: "555-0100".to_string(),
//!         cuisine: "Italian".to_string(),
//!         opening_time: "12:00".to_string(),
//!         closing_time: "23:00".to_string(),
//!         location: GeoPoint::new(-3.70, 40.42),
//!     }).await?;
//!
//!     let found = restaurants
//!         .list(
//!             ListParams::default()
//!                 .into_query(RestaurantFilter {
//!                     name: Some("pasta".to_string()),
//!                     cuisine: None,
//!                 }.into_expr()?)?,
//!         )
//!         .await?;
//!     assert_eq!(found.len(), 1);
//!
//!     gateway.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - in-memory store for development and testing
//! - [`mongodb`] - persistent MongoDB backend (requires the `mongodb`
//!   feature)

pub mod prelude;

pub use pedidos_core::{
    backend, blob, bulk, entity, error, gateway, id, model, query, report, repository,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory backend implementations.
pub mod memory {
    pub use pedidos_memory::{InMemoryBlobStore, InMemoryStore};
}

/// MongoDB backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use pedidos_mongodb::{GridFsBlobStore, MongoStore, MongoStoreBuilder};
}
