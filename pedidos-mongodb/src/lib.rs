//! MongoDB backend for the pedidos gateway.
//!
//! This crate implements the gateway's `StoreBackend` and `BlobBackend`
//! contracts on the MongoDB driver:
//!
//! - **Query execution** - filter expressions translate to native filter
//!   documents; projection, sort, skip, and limit ride on find options
//! - **Batched mutations** - bulk batches execute as one ordered client
//!   bulk-write call
//! - **Aggregation** - the report primitives run as `$group` pipelines,
//!   `distinct`, and counts
//! - **Attachments** - GridFS-backed blob storage
//! - **Error mapping** - duplicate-key write failures surface as
//!   `UniqueConstraintViolation` rather than generic backend errors
//!
//! # Connection
//!
//! The store handle is built once from a connection string and injected
//! into the gateway by the process-wide lifecycle:
//!
//! ```ignore
//! use pedidos::{gateway::Gateway, mongodb::MongoStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::builder("mongodb://localhost:27017", "pedidos")
//!         .build()
//!         .await?;
//!     let gateway = Gateway::new(store);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as pedidos_mongodb;

pub mod blob;
pub mod query;
pub mod store;

pub use blob::GridFsBlobStore;
pub use store::{MongoStore, MongoStoreBuilder};
