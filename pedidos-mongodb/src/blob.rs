//! GridFS-backed binary attachment storage.
//!
//! Content lives in the bucket's chunk collection; filename rides on the
//! file document and the content type in its metadata document. Absence is
//! detected with a file lookup before the download stream is opened, so a
//! missing attachment surfaces as a clean `None` rather than a stream
//! error.

use async_trait::async_trait;
use bson::{Bson, doc};
use futures::{AsyncReadExt, AsyncWriteExt, TryStreamExt};
use mongodb::{Client, gridfs::GridFsBucket};
use tracing::debug;

use pedidos_core::{
    blob::{BlobBackend, StoredBlob},
    error::{GatewayError, GatewayResult},
    id::EntityId,
};

use crate::store::map_store_error;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Attachment store over a GridFS bucket.
#[derive(Debug)]
pub struct GridFsBlobStore {
    bucket: GridFsBucket,
}

impl GridFsBlobStore {
    /// Opens the default bucket of the given database.
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            bucket: client.database(database).gridfs_bucket(None),
        }
    }
}

#[async_trait]
impl BlobBackend for GridFsBlobStore {
    async fn put(
        &self,
        content: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> GatewayResult<EntityId> {
        debug!(filename, size = content.len(), "uploading attachment");

        let mut stream = self
            .bucket
            .open_upload_stream(filename)
            .metadata(doc! { "content_type": content_type })
            .await
            .map_err(map_store_error)?;
        let id = stream.id().clone();

        stream
            .write_all(&content)
            .await
            .map_err(|e| GatewayError::Backend(e.to_string()))?;
        stream
            .close()
            .await
            .map_err(|e| GatewayError::Backend(e.to_string()))?;

        match id {
            Bson::ObjectId(oid) => Ok(EntityId::from_object_id(oid)),
            other => Err(GatewayError::Backend(format!(
                "bucket assigned a non-ObjectId identity: {other}"
            ))),
        }
    }

    async fn get(&self, id: &EntityId) -> GatewayResult<Option<StoredBlob>> {
        let file = self
            .bucket
            .find(doc! { "_id": id.as_object_id() })
            .await
            .map_err(map_store_error)?
            .try_next()
            .await
            .map_err(map_store_error)?;

        let Some(file) = file else {
            return Ok(None);
        };

        let mut stream = self
            .bucket
            .open_download_stream(Bson::ObjectId(id.as_object_id()))
            .await
            .map_err(map_store_error)?;
        let mut content = Vec::new();
        stream
            .read_to_end(&mut content)
            .await
            .map_err(|e| GatewayError::Backend(e.to_string()))?;

        Ok(Some(StoredBlob {
            content,
            filename: file.filename.unwrap_or_default(),
            content_type: file
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get_str("content_type").ok())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
        }))
    }
}
