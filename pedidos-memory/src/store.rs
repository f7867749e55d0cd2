//! In-memory storage backend for the gateway.
//!
//! Stores documents as BSON bodies in ordered maps behind async-aware
//! read-write locks. Iteration order is the identifier order, so listing
//! without an explicit sort is deterministic and pagination windows never
//! overlap or leave gaps. Unique indexes are emulated so the backend can
//! stand in for the real store in tests.

use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use mea::rwlock::RwLock;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use pedidos_core::{
    backend::{GroupStats, StoreBackend},
    bulk::{BulkOp, BulkSummary},
    error::{GatewayError, GatewayResult},
    id::EntityId,
    query::{Query, SortDirection},
};

use crate::evaluator::{Comparable, DocumentEvaluator, matches_raw_filter};

/// Document bodies (without `_id`) keyed by identifier hex.
type CollectionMap = BTreeMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;
/// Unique-indexed field names per collection.
type UniqueIndexMap = HashMap<String, BTreeSet<String>>;

/// Thread-safe in-memory document store.
///
/// Cloneable; clones share the same underlying data through `Arc`. Queries
/// scan the whole collection, which is fine at the scale this backend is
/// for (development and tests).
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
    unique_fields: Arc<RwLock<UniqueIndexMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Re-attaches the identity field when a stored body leaves the store.
fn with_id(key: &str, body: &Document) -> Document {
    let mut document = doc! { "_id": ObjectId::parse_str(key).expect("stored key is valid hex") };
    document.extend(body.clone());
    document
}

/// Applies a field-inclusion mask: named fields plus identity.
fn apply_projection(document: Document, fields: &[String]) -> Document {
    document
        .into_iter()
        .filter(|(k, _)| k == "_id" || fields.iter().any(|f| f == k))
        .collect()
}

/// Finds the unique field (if any) that `candidate` would collide on,
/// ignoring the document stored under `skip_key`.
fn unique_conflict(
    collection_map: &CollectionMap,
    unique: &BTreeSet<String>,
    candidate: &Document,
    skip_key: Option<&str>,
) -> Option<String> {
    for field in unique {
        let Some(value) = candidate.get(field) else {
            continue;
        };
        let collides = collection_map
            .iter()
            .filter(|(key, _)| Some(key.as_str()) != skip_key)
            .any(|(_, body)| {
                body.get(field)
                    .is_some_and(|existing| Comparable::from(existing) == Comparable::from(value))
            });
        if collides {
            return Some(field.clone());
        }
    }

    None
}

fn duplicate_key(collection: &str, field: &str) -> GatewayError {
    GatewayError::UniqueConstraintViolation(format!(
        "duplicate value for unique field {field} in {collection}"
    ))
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Accumulates per-group sums and counts of `value_field` over a collection.
fn group_totals(
    collection_map: &CollectionMap,
    group_field: &str,
    value_field: &str,
) -> Vec<(Bson, f64, u64)> {
    let mut groups: Vec<(Bson, f64, u64)> = Vec::new();

    for body in collection_map.values() {
        let Some(key) = body.get(group_field) else {
            continue;
        };
        let Some(value) = body.get(value_field).and_then(numeric) else {
            continue;
        };

        match groups
            .iter_mut()
            .find(|(existing, _, _)| Comparable::from(&*existing) == Comparable::from(key))
        {
            Some((_, sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => groups.push((key.clone(), value, 1)),
        }
    }

    groups
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn find(&self, collection: &str, query: Query) -> GatewayResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut documents = Vec::new();
        for (key, body) in collection_map.iter() {
            let document = with_id(key, body);
            let matched = match &query.filter {
                Some(expr) => DocumentEvaluator::new(&document).evaluate(expr)?,
                None => true,
            };
            if matched {
                documents.push(document);
            }
        }

        if let Some(sort) = &query.sort {
            // Stable sort keeps identifier order between equal keys.
            documents.sort_by(|a, b| {
                let left = a.get(&sort.field).map(Comparable::from);
                let right = b.get(&sort.field).map(Comparable::from);
                let ordering = match (left, right) {
                    (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let limit = query.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        let mut documents = documents
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .collect::<Vec<_>>();

        if let Some(fields) = &query.projection {
            documents = documents
                .into_iter()
                .map(|d| apply_projection(d, fields))
                .collect();
        }

        Ok(documents)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<EntityId> {
        let unique_fields = self.unique_fields.read().await;
        let mut store = self.store.write().await;
        let collection_map = store.entry(collection.to_string()).or_default();

        if let Some(unique) = unique_fields.get(collection) {
            if let Some(field) = unique_conflict(collection_map, unique, &document, None) {
                return Err(duplicate_key(collection, &field));
            }
        }

        let oid = ObjectId::new();
        collection_map.insert(oid.to_hex(), document);

        Ok(EntityId::from_object_id(oid))
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &EntityId,
    ) -> GatewayResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .and_then(|collection_map| collection_map.get(&id.to_hex()))
            .map(|body| with_id(&id.to_hex(), body)))
    }

    async fn replace_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        document: Document,
    ) -> GatewayResult<bool> {
        let unique_fields = self.unique_fields.read().await;
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(false);
        };

        let key = id.to_hex();
        if !collection_map.contains_key(&key) {
            return Ok(false);
        }

        if let Some(unique) = unique_fields.get(collection) {
            if let Some(field) = unique_conflict(collection_map, unique, &document, Some(&key)) {
                return Err(duplicate_key(collection, &field));
            }
        }

        collection_map.insert(key, document);
        Ok(true)
    }

    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> GatewayResult<bool> {
        let mut store = self.store.write().await;

        Ok(store
            .get_mut(collection)
            .is_some_and(|collection_map| collection_map.remove(&id.to_hex()).is_some()))
    }

    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<BulkOp>,
    ) -> GatewayResult<BulkSummary> {
        let unique_fields = self.unique_fields.read().await;
        let mut store = self.store.write().await;
        let collection_map = store.entry(collection.to_string()).or_default();
        let unique = unique_fields.get(collection);

        let mut summary = BulkSummary::default();

        // Ordered application: the first failure aborts the remainder and
        // earlier operations stay applied.
        for operation in operations {
            match operation {
                BulkOp::Insert { mut document } => {
                    let key = match document.remove("_id") {
                        Some(Bson::ObjectId(oid)) => oid.to_hex(),
                        _ => ObjectId::new().to_hex(),
                    };
                    if let Some(unique) = unique {
                        if let Some(field) =
                            unique_conflict(collection_map, unique, &document, None)
                        {
                            return Err(duplicate_key(collection, &field));
                        }
                    }
                    collection_map.insert(key, document);
                    summary.inserted_count += 1;
                }
                BulkOp::Update { filter, update, upsert } => {
                    let matched_key = collection_map
                        .iter()
                        .find(|(key, body)| matches_raw_filter(&with_id(key, body), &filter))
                        .map(|(key, _)| key.clone());

                    match matched_key {
                        Some(key) => {
                            summary.matched_count += 1;

                            let mut merged = collection_map[&key].clone();
                            for (field, value) in update.iter() {
                                merged.insert(field.clone(), value.clone());
                            }
                            if let Some(unique) = unique {
                                if let Some(field) =
                                    unique_conflict(collection_map, unique, &merged, Some(&key))
                                {
                                    return Err(duplicate_key(collection, &field));
                                }
                            }
                            if merged != collection_map[&key] {
                                summary.modified_count += 1;
                                collection_map.insert(key, merged);
                            }
                        }
                        None if upsert => {
                            // Seed from the filter's equality fields, then
                            // apply the update map, the way the store builds
                            // upserted documents.
                            let key = match filter.get("_id") {
                                Some(Bson::ObjectId(oid)) => oid.to_hex(),
                                _ => ObjectId::new().to_hex(),
                            };
                            let mut seeded: Document = filter
                                .iter()
                                .filter(|(field, _)| field.as_str() != "_id")
                                .map(|(field, value)| (field.clone(), value.clone()))
                                .collect();
                            for (field, value) in update.iter() {
                                seeded.insert(field.clone(), value.clone());
                            }
                            if let Some(unique) = unique {
                                if let Some(field) =
                                    unique_conflict(collection_map, unique, &seeded, None)
                                {
                                    return Err(duplicate_key(collection, &field));
                                }
                            }
                            collection_map.insert(key.clone(), seeded);
                            summary.upserted_ids.push(key);
                        }
                        None => {}
                    }
                }
                BulkOp::Delete { filter } => {
                    let matched_key = collection_map
                        .iter()
                        .find(|(key, body)| matches_raw_filter(&with_id(key, body), &filter))
                        .map(|(key, _)| key.clone());

                    if let Some(key) = matched_key {
                        collection_map.remove(&key);
                        summary.deleted_count += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn count_documents(&self, collection: &str) -> GatewayResult<u64> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .map(|collection_map| collection_map.len() as u64)
            .unwrap_or(0))
    }

    async fn distinct_values(&self, collection: &str, field: &str) -> GatewayResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut values: Vec<Bson> = Vec::new();
        for body in collection_map.values() {
            if let Some(value) = body.get(field) {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }

        Ok(values)
    }

    async fn grouped_average(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        Ok(group_totals(collection_map, group_field, value_field)
            .into_iter()
            .map(|(key, sum, count)| GroupStats { key, value: sum / count as f64, count })
            .collect())
    }

    async fn grouped_sum(
        &self,
        collection: &str,
        group_field: &str,
        value_field: &str,
    ) -> GatewayResult<Vec<GroupStats>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        Ok(group_totals(collection_map, group_field, value_field)
            .into_iter()
            .map(|(key, sum, count)| GroupStats { key, value: sum, count })
            .collect())
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> GatewayResult<()> {
        if unique {
            self.unique_fields
                .write()
                .await
                .entry(collection.to_string())
                .or_default()
                .insert(field.to_string());
        }

        Ok(())
    }
}
