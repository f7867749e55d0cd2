//! Binary attachment storage, keyed by generated identifiers.
//!
//! A peer component of the document gateway: arbitrary file content plus
//! filename/content-type metadata, stored under a store-generated
//! [`EntityId`] and fetched back by it. No size limits are enforced here;
//! that is the store's concern.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{GatewayError, GatewayResult},
    id::EntityId,
};

/// A stored attachment: content plus the metadata it was uploaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub content: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Abstract interface to the binary attachment store.
#[async_trait]
pub trait BlobBackend: Send + Sync + Debug {
    /// Stores content with its metadata and returns the generated identity.
    async fn put(
        &self,
        content: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> GatewayResult<EntityId>;

    /// Fetches a stored attachment, `None` when absent.
    async fn get(&self, id: &EntityId) -> GatewayResult<Option<StoredBlob>>;
}

/// Upload/download facade over a [`BlobBackend`].
///
/// Malformed identifiers are rejected by the codec before this facade is
/// reached; a well-formed identifier with no stored content is
/// [`GatewayError::NotFound`].
#[derive(Debug)]
pub struct BlobStore<F: BlobBackend> {
    backend: F,
}

impl<F: BlobBackend> BlobStore<F> {
    /// Creates the facade over an injected blob backend.
    pub fn new(backend: F) -> Self {
        Self { backend }
    }

    /// Stores content and returns its fresh identifier.
    pub async fn upload(
        &self,
        content: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> GatewayResult<EntityId> {
        self.backend.put(content, filename, content_type).await
    }

    /// Fetches content and metadata by identifier.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when the identifier matches no stored
    /// attachment.
    pub async fn download(&self, id: &EntityId) -> GatewayResult<StoredBlob> {
        self.backend
            .get(id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(id.to_hex(), "fs".to_string()))
    }
}
