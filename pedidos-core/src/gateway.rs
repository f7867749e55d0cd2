//! The gateway: one injected store handle, all components hanging off it.
//!
//! The process creates the backend once at startup and hands it to
//! [`Gateway::new`]; repositories, the bulk engine, and the report engine
//! all borrow the same handle. Nothing here is global or ambient, so any
//! [`StoreBackend`] substitute works for tests.

use crate::{
    backend::StoreBackend,
    bulk::BulkEngine,
    entity::Entity,
    error::GatewayResult,
    report::ReportEngine,
    repository::Repository,
};

/// Entry point to the data-access core, generic over the injected backend.
#[derive(Debug)]
pub struct Gateway<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> Gateway<B> {
    /// Wraps a store handle created by the process-wide lifecycle.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Typed CRUD repository for one entity type.
    pub fn repository<E: Entity>(&self) -> Repository<'_, B, E> {
        Repository::new(&self.backend)
    }

    /// The heterogeneous bulk-mutation engine.
    pub fn bulk(&self) -> BulkEngine<'_, B> {
        BulkEngine::new(&self.backend)
    }

    /// The read-only report engine.
    pub fn reports(&self) -> ReportEngine<'_, B> {
        ReportEngine::new(&self.backend)
    }

    /// Creates an index on a collection field, optionally unique.
    ///
    /// Exposed for external index-provisioning tooling; the gateway never
    /// creates indexes on its own.
    pub async fn create_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> GatewayResult<()> {
        self.backend.create_index(collection, field, unique).await
    }

    /// Shuts down the store handle, consuming the gateway.
    pub async fn shutdown(self) -> GatewayResult<()> {
        self.backend.shutdown().await
    }
}
