use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, IndexModel, Namespace,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{
        ClientOptions, DeleteOneModel, FindOptions, IndexOptions, InsertOneModel, UpdateOneModel,
        WriteModel,
    },
};
use tracing::debug;

use pedidos_core::{
    backend::{GroupStats, StoreBackend},
    bulk::{BulkOp, BulkSummary},
    error::{GatewayError, GatewayResult},
    id::EntityId,
    query::{Query, QueryVisitor},
};

use crate::query::{MongoQueryTranslator, projection_document, sort_document};

/// MongoDB-backed document store.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn namespace(&self, collection_name: &str) -> Namespace {
        Namespace {
            db: self.database.clone(),
            coll: collection_name.to_string(),
        }
    }
}

/// Maps a driver error onto the gateway taxonomy. Duplicate-key write
/// failures (code 11000) become `UniqueConstraintViolation` instead of
/// leaking as generic backend errors.
pub(crate) fn map_store_error(err: MongoError) -> GatewayError {
    if is_duplicate_key(&err) {
        return GatewayError::UniqueConstraintViolation(err.to_string());
    }

    GatewayError::Backend(err.to_string())
}

const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(err: &MongoError) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::BulkWrite(bulk_error) => bulk_error
            .write_errors
            .values()
            .any(|write_error| write_error.code == DUPLICATE_KEY_CODE),
        _ => false,
    }
}

fn numeric(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

impl MongoStore {
    /// Runs a `$group` pipeline accumulating one value per group, shared by
    /// the average and sum primitives.
    async fn grouped(
        &self,
        collection: &str,
        group_field: &str,
        accumulator: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": format!("${group_field}"),
                "value": { accumulator: format!("${value_field}") },
                "count": { "$sum": 1 },
            }
        }];

        Ok(self
            .get_collection(collection)
            .aggregate(pipeline)
            .await
            .map_err(map_store_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(map_store_error)?
            .into_iter()
            .map(|group| GroupStats {
                key: group.get("_id").cloned().unwrap_or(Bson::Null),
                value: numeric(group.get("value")),
                count: numeric(group.get("count")) as u64,
            })
            .collect())
    }
}

#[async_trait]
impl StoreBackend for MongoStore {
    async fn find(&self, collection: &str, query: Query) -> GatewayResult<Vec<Document>> {
        let mut options = FindOptions::default();

        options.limit = query.limit;
        options.skip = Some(query.skip);
        if let Some(fields) = &query.projection {
            options.projection = Some(projection_document(fields));
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(sort_document(sort));
        }

        Ok(self
            .get_collection(collection)
            .find(match &query.filter {
                Some(expr) => MongoQueryTranslator.visit_expr(expr)?,
                None => doc! {},
            })
            .with_options(options)
            .await
            .map_err(map_store_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(map_store_error)?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<EntityId> {
        let result = self
            .get_collection(collection)
            .insert_one(document)
            .await
            .map_err(map_store_error)?;

        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(EntityId::from_object_id(oid)),
            other => Err(GatewayError::Backend(format!(
                "store assigned a non-ObjectId identity: {other}"
            ))),
        }
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &EntityId,
    ) -> GatewayResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(doc! { "_id": id.as_object_id() })
            .await
            .map_err(map_store_error)
    }

    async fn replace_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        document: Document,
    ) -> GatewayResult<bool> {
        let result = self
            .get_collection(collection)
            .replace_one(doc! { "_id": id.as_object_id() }, document)
            .await
            .map_err(map_store_error)?;

        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> GatewayResult<bool> {
        let result = self
            .get_collection(collection)
            .delete_one(doc! { "_id": id.as_object_id() })
            .await
            .map_err(map_store_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<BulkOp>,
    ) -> GatewayResult<BulkSummary> {
        debug!(collection, operations = operations.len(), "submitting bulk write");

        let namespace = self.namespace(collection);
        let models = operations
            .into_iter()
            .map(|operation| match operation {
                BulkOp::Insert { document } => WriteModel::InsertOne(
                    InsertOneModel::builder()
                        .namespace(namespace.clone())
                        .document(document)
                        .build(),
                ),
                BulkOp::Update { filter, update, upsert } => WriteModel::UpdateOne(
                    UpdateOneModel::builder()
                        .namespace(namespace.clone())
                        .filter(filter)
                        .update(doc! { "$set": update })
                        .upsert(upsert)
                        .build(),
                ),
                BulkOp::Delete { filter } => WriteModel::DeleteOne(
                    DeleteOneModel::builder()
                        .namespace(namespace.clone())
                        .filter(filter)
                        .build(),
                ),
            })
            .collect::<Vec<_>>();

        // Ordered execution: the first failing operation aborts the rest of
        // the batch; earlier operations stay applied.
        let result = self
            .client
            .bulk_write(models)
            .ordered(true)
            .verbose_results()
            .await
            .map_err(map_store_error)?;

        let mut upserted = result
            .update_results
            .into_iter()
            .filter_map(|(index, update)| update.upserted_id.map(|id| (index, id)))
            .collect::<Vec<_>>();
        upserted.sort_by_key(|(index, _)| *index);

        Ok(BulkSummary {
            inserted_count: result.summary.inserted_count as u64,
            matched_count: result.summary.matched_count as u64,
            modified_count: result.summary.modified_count as u64,
            deleted_count: result.summary.deleted_count as u64,
            upserted_ids: upserted
                .into_iter()
                .filter_map(|(_, id)| match id {
                    Bson::ObjectId(oid) => Some(oid.to_hex()),
                    _ => None,
                })
                .collect(),
        })
    }

    async fn count_documents(&self, collection: &str) -> GatewayResult<u64> {
        self.get_collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(map_store_error)
    }

    async fn distinct_values(&self, collection: &str, field: &str) -> GatewayResult<Vec<Bson>> {
        self.get_collection(collection)
            .distinct(field, doc! {})
            .await
            .map_err(map_store_error)
    }

    async fn grouped_average(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>> {
        self.grouped(collection, group_field, "$avg", value_field)
            .await
    }

    async fn grouped_sum(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>> {
        self.grouped(collection, group_field, "$sum", value_field)
            .await
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> GatewayResult<()> {
        debug!(collection, field, unique, "creating index");

        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { field: 1 })
                    .options(IndexOptions::builder().unique(unique).build())
                    .build(),
            )
            .await
            .map_err(map_store_error)?;

        Ok(())
    }

    async fn shutdown(self) -> GatewayResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder for [`MongoStore`] from a connection string.
pub struct MongoStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    pub async fn build(self) -> GatewayResult<MongoStore> {
        Ok(MongoStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| GatewayError::Initialization(e.to_string()))?,
            )
            .map_err(|e| GatewayError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
