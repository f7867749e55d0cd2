//! The heterogeneous bulk-mutation engine.
//!
//! A bulk request targets one named collection and carries an ordered list
//! of tagged operations. The wire shape ([`BulkOpRequest`]) has optional
//! fields because the tag decides which are required; decoding it into the
//! closed sum [`BulkOp`] is where that requirement is enforced, so a
//! malformed operation can never reach a backend. Validation is all-or-
//! nothing: a bad collection name or a bad operation rejects the entire
//! batch before anything executes.

use bson::Document;
use serde::{Deserialize, Serialize};

use crate::{
    backend::StoreBackend,
    error::{GatewayError, GatewayResult},
};

/// The collections the bulk endpoint may target.
pub const KNOWN_COLLECTIONS: [&str; 5] =
    ["orders", "restaurants", "users", "menu_items", "reviews"];

/// Operation tag on the bulk wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOpType {
    Insert,
    Update,
    Delete,
}

/// One operation as it arrives from the caller.
///
/// All payload fields are optional at this stage; [`BulkOp::try_from`]
/// enforces the per-tag requirements.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOpRequest {
    #[serde(rename = "type")]
    pub op_type: BulkOpType,
    /// Document to insert (insert only).
    pub document: Option<Document>,
    /// Match predicate (update and delete).
    pub filter: Option<Document>,
    /// Fields to set on the matched document (update only).
    pub update: Option<Document>,
    /// Whether a non-matching update creates the document.
    #[serde(default)]
    pub upsert: bool,
}

/// A validated bulk operation. Each variant carries exactly the fields its
/// execution needs.
#[derive(Debug, Clone)]
pub enum BulkOp {
    /// Insert a new document; the store assigns its identity.
    Insert { document: Document },
    /// Partial merge: only the fields named in `update` change, everything
    /// else on the matched document is preserved.
    Update { filter: Document, update: Document, upsert: bool },
    /// Remove the first document matching `filter`.
    Delete { filter: Document },
}

impl TryFrom<BulkOpRequest> for BulkOp {
    type Error = GatewayError;

    fn try_from(request: BulkOpRequest) -> Result<Self, Self::Error> {
        match request.op_type {
            BulkOpType::Insert => {
                let document = request.document.ok_or_else(|| {
                    GatewayError::Validation("insert operation requires a document".to_string())
                })?;
                Ok(BulkOp::Insert { document })
            }
            BulkOpType::Update => {
                let filter = request.filter.ok_or_else(|| {
                    GatewayError::Validation("update operation requires a filter".to_string())
                })?;
                let update = request.update.ok_or_else(|| {
                    GatewayError::Validation("update operation requires an update map".to_string())
                })?;
                Ok(BulkOp::Update { filter, update, upsert: request.upsert })
            }
            BulkOpType::Delete => {
                let filter = request.filter.ok_or_else(|| {
                    GatewayError::Validation("delete operation requires a filter".to_string())
                })?;
                Ok(BulkOp::Delete { filter })
            }
        }
    }
}

/// Aggregate counts for one executed batch.
///
/// `upserted_ids` holds the display encodings of identifiers created by
/// upserts, in the store's reporting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkSummary {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
    pub upserted_ids: Vec<String>,
}

/// Executes mixed insert/update/delete batches against a named collection.
#[derive(Debug)]
pub struct BulkEngine<'a, B: StoreBackend> {
    backend: &'a B,
}

impl<'a, B: StoreBackend> BulkEngine<'a, B> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Validates and executes an ordered batch.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::CollectionNotFound`] when the target is not one of
    ///   the known collections; nothing executes.
    /// - [`GatewayError::Validation`] identifying the offending operation
    ///   when any operation is missing a required field; nothing executes.
    /// - Store errors from execution itself; operations already applied by
    ///   the store stay applied (ordered execution, first failure aborts the
    ///   remainder).
    pub async fn execute(
        &self,
        collection: &str,
        requests: Vec<BulkOpRequest>,
    ) -> GatewayResult<BulkSummary> {
        if !KNOWN_COLLECTIONS.contains(&collection) {
            return Err(GatewayError::CollectionNotFound(collection.to_string()));
        }

        let operations = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                BulkOp::try_from(request).map_err(|e| {
                    GatewayError::Validation(format!("operation {index}: {e}"))
                })
            })
            .collect::<GatewayResult<Vec<BulkOp>>>()?;

        self.backend.bulk_write(collection, operations).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn decodes_each_tag_from_json() {
        let requests: Vec<BulkOpRequest> = serde_json::from_value(serde_json::json!([
            { "type": "insert", "document": { "order_id": 1 } },
            { "type": "update", "filter": { "order_id": 1 }, "update": { "rating": 5 }, "upsert": true },
            { "type": "delete", "filter": { "order_id": 1 } },
        ]))
        .unwrap();

        let ops = requests
            .into_iter()
            .map(BulkOp::try_from)
            .collect::<GatewayResult<Vec<_>>>()
            .unwrap();

        assert!(matches!(ops[0], BulkOp::Insert { .. }));
        assert!(matches!(ops[1], BulkOp::Update { upsert: true, .. }));
        assert!(matches!(ops[2], BulkOp::Delete { .. }));
    }

    #[test]
    fn insert_without_document_is_rejected() {
        let request = BulkOpRequest {
            op_type: BulkOpType::Insert,
            document: None,
            filter: Some(doc! { "order_id": 1 }),
            update: None,
            upsert: false,
        };
        assert!(matches!(
            BulkOp::try_from(request),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn update_requires_both_filter_and_update_map() {
        let missing_update = BulkOpRequest {
            op_type: BulkOpType::Update,
            document: None,
            filter: Some(doc! { "order_id": 1 }),
            update: None,
            upsert: false,
        };
        assert!(BulkOp::try_from(missing_update).is_err());

        let missing_filter = BulkOpRequest {
            op_type: BulkOpType::Update,
            document: None,
            filter: None,
            update: Some(doc! { "rating": 5 }),
            upsert: false,
        };
        assert!(BulkOp::try_from(missing_filter).is_err());
    }

    #[test]
    fn known_collections_cover_the_five_entities() {
        for name in ["orders", "restaurants", "users", "menu_items", "reviews"] {
            assert!(KNOWN_COLLECTIONS.contains(&name));
        }
        assert!(!KNOWN_COLLECTIONS.contains(&"invoices"));
    }
}
