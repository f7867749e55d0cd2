//! Storage backend abstraction for the gateway.
//!
//! [`StoreBackend`] is the only seam between the gateway's components and
//! the document store. The handle is created once at process startup and
//! injected explicitly into [`crate::gateway::Gateway`]; components never
//! reach for ambient global state, which keeps every one of them testable
//! against a substitute store.
//!
//! All operations are synchronous request/response calls: no retries, no
//! caching, no background work. Staleness and isolation are exactly what the
//! store provides for single-document operations.

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::{
    bulk::{BulkOp, BulkSummary},
    error::GatewayResult,
    id::EntityId,
    query::Query,
};

/// Per-group aggregate produced by [`StoreBackend::grouped_average`] and
/// [`StoreBackend::grouped_sum`].
///
/// Group ordering is store-defined; ranking policy belongs to the report
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// The grouping key value.
    pub key: Bson,
    /// Average or sum of the value field, depending on the operation.
    pub value: f64,
    /// Number of documents in the group.
    pub count: u64,
}

/// Abstract interface to the document store.
///
/// Implementations must be thread-safe (`Send + Sync`); the process shares
/// one handle across all components. Operations return
/// [`GatewayResult`](crate::error::GatewayResult) and surface every failure
/// to the caller unchanged.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Runs a structured query against a collection, applying filter,
    /// projection, sort, skip, and limit in that order.
    ///
    /// Always returns a (possibly empty) sequence; zero matches is not an
    /// error.
    async fn find(&self, collection: &str, query: Query) -> GatewayResult<Vec<Document>>;

    /// Inserts one document and returns the store-assigned identity.
    ///
    /// The document must not carry an identity field; unique-index
    /// collisions surface as
    /// [`UniqueConstraintViolation`](crate::error::GatewayError::UniqueConstraintViolation).
    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<EntityId>;

    /// Fetches one document by identity, `None` when absent.
    async fn find_by_id(
        &self,
        collection: &str,
        id: &EntityId,
    ) -> GatewayResult<Option<Document>>;

    /// Replaces the full document stored under `id`.
    ///
    /// Returns whether a document matched; the caller decides what zero
    /// matches means.
    async fn replace_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        document: Document,
    ) -> GatewayResult<bool>;

    /// Deletes one document by identity. Returns whether anything was
    /// removed.
    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> GatewayResult<bool>;

    /// Executes an ordered batch of mutations against a collection in one
    /// store call.
    ///
    /// Operations are applied in input order; the first store-level failure
    /// aborts the remainder, leaving earlier operations applied. Batches are
    /// not transactions.
    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<BulkOp>,
    ) -> GatewayResult<BulkSummary>;

    /// Counts all documents in a collection.
    async fn count_documents(&self, collection: &str) -> GatewayResult<u64>;

    /// Returns the distinct values of a field across a collection, order
    /// unspecified.
    async fn distinct_values(&self, collection: &str, field: &str) -> GatewayResult<Vec<Bson>>;

    /// Groups a collection by `group_field` and averages `value_field` per
    /// group.
    async fn grouped_average(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>>;

    /// Groups a collection by `group_field` and sums `value_field` per
    /// group.
    async fn grouped_sum(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>>;

    /// Creates an index on a field, optionally enforcing uniqueness.
    ///
    /// Consumed by external index-provisioning tooling; the gateway itself
    /// never pre-checks uniqueness.
    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> GatewayResult<()>;

    /// Cleanly shuts down the backend, releasing the store connection.
    async fn shutdown(self) -> GatewayResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}
