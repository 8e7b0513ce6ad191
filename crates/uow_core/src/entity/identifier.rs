//! Identity resolution: persisted vs. new entities.

use crate::entity::definition::Definitions;
use crate::error::{UowError, UowResult};
use crate::object::Entity;
use crate::value::Value;
use std::sync::Arc;

/// Distinguishes persisted entities from new ones and produces stable
/// identity keys for collection diffing. No side effects.
pub trait Identifier {
    /// Checks whether a value is an object of a trackable entity type.
    fn is_entity(&self, value: &Value) -> bool;

    /// Checks whether an entity has been assigned a durable identity by
    /// the persistence layer.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the declared identity property does
    /// not exist on the entity.
    fn is_persisted(&self, entity: &Entity) -> UowResult<bool>;

    /// Returns an entity's identity key.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the entity is not persisted.
    fn identity(&self, entity: &Entity) -> UowResult<Value>;
}

/// Default identifier driven by the definition repository.
///
/// An entity is any object whose class has a definition; it is persisted
/// when its declared identity property holds a non-null value.
#[derive(Debug, Clone)]
pub struct DefinitionIdentifier {
    definitions: Arc<Definitions>,
}

impl DefinitionIdentifier {
    /// Creates an identifier over a definition repository.
    #[must_use]
    pub fn new(definitions: Arc<Definitions>) -> Self {
        Self { definitions }
    }

    fn identity_value(&self, entity: &Entity) -> UowResult<Value> {
        let definition = self.definitions.get(entity)?;
        entity
            .get(definition.identity_property())
            .ok_or_else(|| {
                UowError::property_not_found(definition.identity_property(), entity.class())
            })
    }
}

impl Identifier for DefinitionIdentifier {
    fn is_entity(&self, value: &Value) -> bool {
        value
            .as_entity()
            .is_some_and(|entity| self.definitions.has(&entity.class()))
    }

    fn is_persisted(&self, entity: &Entity) -> UowResult<bool> {
        Ok(!self.identity_value(entity)?.is_null())
    }

    fn identity(&self, entity: &Entity) -> UowResult<Value> {
        let identity = self.identity_value(entity)?;
        if identity.is_null() {
            return Err(UowError::runtime(
                "can't get identity of not persisted entity",
            ));
        }
        Ok(identity)
    }
}
