//! In-memory backends for the pedidos gateway.
//!
//! This crate provides thread-safe, in-memory implementations of the
//! gateway's `StoreBackend` and `BlobBackend` contracts. It mirrors the
//! store semantics the MongoDB backend relies on - case-insensitive
//! substring filters, numeric comparison across integer widths, ordered
//! bulk application, unique-index enforcement - so it can stand in as the
//! substitute store in development and tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use pedidos::{gateway::Gateway, memory::InMemoryStore, model::Order};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Gateway::new(InMemoryStore::new());
//!     let orders = gateway.repository::<Order>();
//!
//!     let stored = orders.create(Order {
//!         id: None,
//!         order_id: 1,
//!         restaurant: "Pasta House".to_string(),
//!         date: "2026-08-01".to_string(),
//!         total_amount: 19.9,
//!         rating: 5,
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as pedidos_memory;

pub mod blob;
pub mod evaluator;
pub mod store;

pub use blob::InMemoryBlobStore;
pub use store::InMemoryStore;
