//! The generic entity repository.
//!
//! One CRUD implementation, instantiated per entity type through
//! [`crate::gateway::Gateway::repository`]. Filter/sort/paginate logic is
//! never duplicated per entity: the repository executes whatever
//! [`Query`](crate::query::Query) the query builder produced.

use bson::Document;
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    entity::{Entity, EntityExt, ID_FIELD},
    error::{GatewayError, GatewayResult},
    id::EntityId,
    query::Query,
};

/// Typed CRUD access to one entity collection.
#[derive(Debug)]
pub struct Repository<'a, B: StoreBackend, E: Entity> {
    backend: &'a B,
    _marker: PhantomData<E>,
}

impl<'a, B: StoreBackend, E: Entity> Repository<'a, B, E> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { backend, _marker: PhantomData }
    }

    /// Returns the name of the collection this repository operates on.
    pub fn collection_name(&self) -> &'static str {
        E::collection_name()
    }

    /// Lists entities matching a query descriptor.
    ///
    /// Returns an ordered, possibly empty sequence; zero matches never
    /// fails. Intended for descriptors without a field mask - a masked
    /// document cannot decode into the full typed record, use
    /// [`Repository::list_raw`] for those.
    pub async fn list(&self, query: Query) -> GatewayResult<Vec<E>> {
        self.backend
            .find(E::collection_name(), query)
            .await?
            .into_iter()
            .map(E::from_document)
            .collect()
    }

    /// Lists raw documents matching a query descriptor, honoring the field
    /// mask when one is present (named fields plus identity).
    pub async fn list_raw(&self, query: Query) -> GatewayResult<Vec<Document>> {
        self.backend.find(E::collection_name(), query).await
    }

    /// Inserts a new entity and returns the stored record as the store
    /// holds it, so store-side defaults and normalization are reflected.
    ///
    /// Any caller-supplied identity is discarded; the store assigns it.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Validation`] when boundary validation fails,
    /// [`GatewayError::UniqueConstraintViolation`] when a unique field
    /// collides.
    pub async fn create(&self, entity: E) -> GatewayResult<E> {
        entity.validate()?;

        let mut document = entity.to_document()?;
        document.remove(ID_FIELD);

        let id = self
            .backend
            .insert_one(E::collection_name(), document)
            .await?;

        let stored = self
            .backend
            .find_by_id(E::collection_name(), &id)
            .await?
            .ok_or_else(|| {
                GatewayError::Backend(format!(
                    "inserted document {id} missing from {} on read-back",
                    E::collection_name()
                ))
            })?;

        E::from_document(stored)
    }

    /// Fetches one entity by identity.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when the identifier matches nothing.
    pub async fn get(&self, id: &EntityId) -> GatewayResult<E> {
        let document = self
            .backend
            .find_by_id(E::collection_name(), id)
            .await?
            .ok_or_else(|| not_found::<E>(id))?;

        E::from_document(document)
    }

    /// Replaces the full stored document with the supplied entity's fields
    /// and returns the stored record.
    ///
    /// Every field is resupplied; this is not a merge. Identity is immutable
    /// and taken from `id`, never from the entity body.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when the identifier matches nothing
    /// (judged on whether anything matched, so a no-op replace of an
    /// existing document still succeeds).
    pub async fn update(&self, id: &EntityId, entity: E) -> GatewayResult<E> {
        entity.validate()?;

        let mut document = entity.to_document()?;
        document.remove(ID_FIELD);

        let matched = self
            .backend
            .replace_by_id(E::collection_name(), id, document)
            .await?;
        if !matched {
            return Err(not_found::<E>(id));
        }

        self.get(id).await
    }

    /// Permanently removes one entity by identity.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when nothing was deleted; deleting an
    /// absent identifier is never a silent no-op.
    pub async fn delete(&self, id: &EntityId) -> GatewayResult<()> {
        if !self.backend.delete_by_id(E::collection_name(), id).await? {
            return Err(not_found::<E>(id));
        }

        Ok(())
    }
}

fn not_found<E: Entity>(id: &EntityId) -> GatewayError {
    GatewayError::NotFound(id.to_hex(), E::collection_name().to_string())
}
