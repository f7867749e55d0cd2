//! In-memory binary attachment storage.

use async_trait::async_trait;
use bson::oid::ObjectId;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use pedidos_core::{
    blob::{BlobBackend, StoredBlob},
    error::GatewayResult,
    id::EntityId,
};

/// Attachment store backed by a locked map; the blob counterpart of
/// [`InMemoryStore`](crate::store::InMemoryStore).
#[derive(Default, Clone, Debug)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl InMemoryBlobStore {
    /// Creates a new empty attachment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobBackend for InMemoryBlobStore {
    async fn put(
        &self,
        content: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> GatewayResult<EntityId> {
        let oid = ObjectId::new();

        self.blobs.write().await.insert(
            oid.to_hex(),
            StoredBlob {
                content,
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            },
        );

        Ok(EntityId::from_object_id(oid))
    }

    async fn get(&self, id: &EntityId) -> GatewayResult<Option<StoredBlob>> {
        Ok(self.blobs.read().await.get(&id.to_hex()).cloned())
    }
}
