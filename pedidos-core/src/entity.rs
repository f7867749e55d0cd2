//! Core traits for entity representation and serialization.
//!
//! Every record the gateway stores is a typed entity with an explicit field
//! set. The [`Entity`] trait names the collection the type lives in and
//! exposes its identity; [`EntityExt`] supplies the BSON conversions the
//! repository uses to cross the store boundary.

use bson::{Document, de::deserialize_from_document, ser::serialize_to_document};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{GatewayError, GatewayResult},
    id::EntityId,
};

/// The identity field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// Core trait that all stored entity types implement.
///
/// Identity is `Option<EntityId>`: absent on a document that has not been
/// stored yet (the store assigns it on insert, once, immutably), present on
/// every record read back.
///
/// # Example
///
/// ```ignore
/// use pedidos_core::{entity::Entity, id::EntityId};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Order {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<EntityId>,
///     pub order_id: i64,
///     // ...
/// }
///
/// impl Entity for Order {
///     fn id(&self) -> Option<&EntityId> {
///         self.id.as_ref()
///     }
///
///     fn collection_name() -> &'static str {
///         "orders"
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns this entity's identity, if it has been stored.
    fn id(&self) -> Option<&EntityId>;

    /// Returns the name of the collection this entity type belongs to.
    fn collection_name() -> &'static str;

    /// Boundary validation, run before any write reaches the store.
    ///
    /// The default accepts everything; entity types with field constraints
    /// (rating ranges, date formats) override it and fail with
    /// [`GatewayError::Validation`] naming the offending field.
    fn validate(&self) -> GatewayResult<()> {
        Ok(())
    }
}

/// Extension trait providing BSON conversion for entities.
///
/// Automatically implemented for every [`Entity`].
pub trait EntityExt: Entity {
    /// Serializes this entity to a BSON document.
    fn to_document(&self) -> GatewayResult<Document>;

    /// Deserializes an entity from a stored BSON document.
    fn from_document(document: Document) -> GatewayResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_document(&self) -> GatewayResult<Document> {
        Ok(serialize_to_document(self)?)
    }

    fn from_document(document: Document) -> GatewayResult<Self> {
        deserialize_from_document(document)
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }
}
