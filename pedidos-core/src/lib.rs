//! Store-agnostic core of the pedidos gateway: a generic data-access layer
//! between client callers and a schema-less document store serving orders,
//! restaurants, users, menu items, and reviews, plus binary attachments.
//!
//! This crate provides:
//!
//! - **Identifier codec** ([`id`]) - the opaque identity type every other
//!   component depends on
//! - **Query model** ([`query`]) - filter AST, query descriptor, and the
//!   shared projection/sort/pagination builder
//! - **Entity model** ([`entity`], [`model`]) - the five typed entities and
//!   their entity-specific list filters
//! - **Backend abstraction** ([`backend`]) - the single seam to the store
//! - **Entity repository** ([`repository`]) - one generic CRUD contract
//!   instantiated per entity type
//! - **Bulk mutation engine** ([`bulk`]) - validated heterogeneous batches
//! - **Report engine** ([`report`]) - counting, distinct values, and top-N
//!   rankings
//! - **Blob store facade** ([`blob`]) - binary attachments by generated id
//! - **Error handling** ([`error`]) - the client-facing error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use pedidos_core::{gateway::Gateway, model::Order, query::ListParams};
//!
//! let gateway = Gateway::new(backend);
//! let orders = gateway.repository::<Order>();
//! let page = orders
//!     .list(ListParams::default().into_query(None)?)
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as pedidos_core;

pub mod backend;
pub mod blob;
pub mod bulk;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod id;
pub mod model;
pub mod query;
pub mod report;
pub mod repository;
