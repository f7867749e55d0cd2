//! The identifier codec.
//!
//! Every document identifier that enters the gateway as a string must pass
//! through [`EntityId::parse`] before it is used anywhere. The wrapper type
//! can only be constructed from raw input via the codec, so a malformed
//! identifier (`InvalidIdentifier`) can never be confused downstream with a
//! well-formed identifier that matched nothing (`NotFound`).

use bson::{Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GatewayError, GatewayResult};

/// Opaque, store-assigned document identity.
///
/// The accepted external encoding is the store's canonical one: exactly 24
/// characters, each a digit or lowercase `a`-`f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(ObjectId);

impl EntityId {
    /// Parses a raw identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidIdentifier`] naming the offending value
    /// when the input is not 24 lowercase hex characters.
    pub fn parse(raw: &str) -> GatewayResult<Self> {
        if raw.len() != 24 || !raw.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(GatewayError::InvalidIdentifier(raw.to_string()));
        }

        ObjectId::parse_str(raw)
            .map(EntityId)
            .map_err(|_| GatewayError::InvalidIdentifier(raw.to_string()))
    }

    /// Parses a raw identifier that arrived in a named filter or path field.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidIdentifier`] naming the field, so the
    /// caller sees which input was malformed.
    pub fn parse_field(field: &str, raw: &str) -> GatewayResult<Self> {
        Self::parse(raw).map_err(|_| {
            GatewayError::InvalidIdentifier(format!("{field}: {raw}"))
        })
    }

    /// Wraps an identity freshly assigned by the store.
    pub fn from_object_id(oid: ObjectId) -> Self {
        EntityId(oid)
    }

    /// Returns the underlying store-native identifier.
    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    /// Returns the canonical 24-hex display encoding.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl From<EntityId> for Bson {
    fn from(id: EntityId) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl From<ObjectId> for EntityId {
    fn from(oid: ObjectId) -> Self {
        EntityId(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_identifiers() {
        let raw = "64f1c0ffee0123456789abcd";
        let id = EntityId::parse(raw).unwrap();
        assert_eq!(id.to_hex(), raw);
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn round_trips_store_assigned_identity() {
        let oid = ObjectId::new();
        let id = EntityId::from_object_id(oid);
        assert_eq!(EntityId::parse(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for raw in [
            "",
            "123",
            "64f1c0ffee0123456789abc",    // too short
            "64f1c0ffee0123456789abcde",  // too long
            "64F1C0FFEE0123456789ABCD",   // uppercase
            "64f1c0ffee0123456789abcg",   // non-hex
            "not-an-identifier-at-all",
        ] {
            assert!(matches!(
                EntityId::parse(raw),
                Err(GatewayError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn parse_field_names_the_offending_field() {
        let err = EntityId::parse_field("restaurant_id", "nope").unwrap_err();
        match err {
            GatewayError::InvalidIdentifier(msg) => {
                assert!(msg.contains("restaurant_id"));
                assert!(msg.contains("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
