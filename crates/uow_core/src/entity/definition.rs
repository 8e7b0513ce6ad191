//! Entity definitions: observed properties and associations.
//!
//! Definitions describe what the engine observes on each entity class.
//! They are supplied by the application and consumed read-only.

use crate::error::{UowError, UowResult};
use crate::object::Entity;
use std::collections::HashMap;

/// Kind of a declared association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// The property references a single entity.
    ToSingle,
    /// The property references a collection of entities.
    ToMany,
}

/// A declared relationship of a property to one or many other entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    kind: AssociationKind,
    target_class: String,
}

impl Association {
    /// Declares a to-one association with the given target class.
    #[must_use]
    pub fn to_single(target_class: impl Into<String>) -> Self {
        Self {
            kind: AssociationKind::ToSingle,
            target_class: target_class.into(),
        }
    }

    /// Declares a to-many association with the given target class.
    #[must_use]
    pub fn to_many(target_class: impl Into<String>) -> Self {
        Self {
            kind: AssociationKind::ToMany,
            target_class: target_class.into(),
        }
    }

    /// Returns the association kind.
    #[must_use]
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Returns the declared target class.
    #[must_use]
    pub fn target_class(&self) -> &str {
        &self.target_class
    }

    /// Checks whether an entity is an instance of the target class.
    #[must_use]
    pub fn targets(&self, entity: &Entity) -> bool {
        entity.class() == self.target_class
    }
}

/// An observed property: a name plus an optional association descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    association: Option<Association>,
}

impl Property {
    /// Declares a scalar (non-associated) property.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            association: None,
        }
    }

    /// Declares an associated property.
    #[must_use]
    pub fn associated(name: impl Into<String>, association: Association) -> Self {
        Self {
            name: name.into(),
            association: Some(association),
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks whether this property is associated with other entities.
    #[must_use]
    pub fn is_associated(&self) -> bool {
        self.association.is_some()
    }

    /// Returns the association descriptor, if any.
    #[must_use]
    pub fn association(&self) -> Option<&Association> {
        self.association.as_ref()
    }
}

/// The set of observed properties for one entity class.
#[derive(Debug, Clone)]
pub struct Definition {
    class: String,
    identity_property: String,
    observed: Vec<Property>,
}

impl Definition {
    /// Creates a definition for a class with the given identity property.
    #[must_use]
    pub fn new(class: impl Into<String>, identity_property: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            identity_property: identity_property.into(),
            observed: Vec::new(),
        }
    }

    /// Adds an observed property.
    #[must_use]
    pub fn observe(mut self, property: Property) -> Self {
        self.observed.push(property);
        self
    }

    /// Returns the class this definition describes.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the property holding the persistence identity.
    #[must_use]
    pub fn identity_property(&self) -> &str {
        &self.identity_property
    }

    /// Returns the observed properties, in declaration order.
    #[must_use]
    pub fn observed_properties(&self) -> &[Property] {
        &self.observed
    }

    /// Checks whether an entity is an instance of this definition's class.
    #[must_use]
    pub fn fits(&self, entity: &Entity) -> bool {
        entity.class() == self.class
    }
}

/// Repository of entity definitions, keyed by class.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    by_class: HashMap<String, Definition>,
}

impl Definitions {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one for the same class.
    pub fn add(&mut self, definition: Definition) {
        self.by_class.insert(definition.class().to_owned(), definition);
    }

    /// Checks whether a class has a definition.
    #[must_use]
    pub fn has(&self, class: &str) -> bool {
        self.by_class.contains_key(class)
    }

    /// Returns the definition for an entity.
    ///
    /// # Errors
    ///
    /// Returns [`UowError::MissingDefinition`] when the entity's class has
    /// no definition.
    pub fn get(&self, entity: &Entity) -> UowResult<&Definition> {
        let class = entity.class();
        self.by_class
            .get(&class)
            .ok_or_else(|| UowError::missing_definition(class))
    }
}

impl FromIterator<Definition> for Definitions {
    fn from_iter<I: IntoIterator<Item = Definition>>(iter: I) -> Self {
        let mut definitions = Self::new();
        for definition in iter {
            definitions.add(definition);
        }
        definitions
    }
}
