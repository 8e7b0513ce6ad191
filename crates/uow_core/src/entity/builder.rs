//! Recursive change builder.

use crate::entity::change::{Change, ChangeSet};
use crate::entity::comparer::{DeepValueComparer, ValueComparer};
use crate::entity::definition::{Association, AssociationKind, Definitions, Property};
use crate::entity::identifier::Identifier;
use crate::error::{UowError, UowResult};
use crate::object::{Entity, ObjectToken, PropertyAccess, PropertyAccessor};
use crate::value::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Computes a structured description of every difference between two
/// states of an entity, including nested single associations and
/// collection associations.
pub struct ChangeBuilder {
    definitions: Arc<Definitions>,
    identifier: Arc<dyn Identifier>,
    value_comparer: Box<dyn ValueComparer>,
    accessor: Box<dyn PropertyAccess>,
}

impl ChangeBuilder {
    /// Creates a builder with the default value comparer and accessor.
    #[must_use]
    pub fn new(definitions: Arc<Definitions>, identifier: Arc<dyn Identifier>) -> Self {
        Self::with_parts(
            definitions,
            identifier,
            Box::new(DeepValueComparer::new()),
            Box::new(PropertyAccessor::new()),
        )
    }

    /// Creates a builder with explicit comparer and accessor capabilities.
    #[must_use]
    pub fn with_parts(
        definitions: Arc<Definitions>,
        identifier: Arc<dyn Identifier>,
        value_comparer: Box<dyn ValueComparer>,
        accessor: Box<dyn PropertyAccess>,
    ) -> Self {
        Self {
            definitions,
            identifier,
            value_comparer,
            accessor,
        }
    }

    /// Builds the full change set between an old and a new entity state.
    ///
    /// An entity with zero differing observed properties yields an empty
    /// set, which is a valid result. Entity pairs re-entered through a
    /// cyclic association are treated as unchanged.
    ///
    /// # Errors
    ///
    /// Propagates comparison, property-access and association-validation
    /// errors, see [`UowError`].
    pub fn build_changes(&self, old: &Value, new: &Value) -> UowResult<ChangeSet> {
        let mut visiting = HashSet::new();
        self.build_changes_guarded(old, new, &mut visiting)
    }

    /// Checks whether one observed property differs between two entities.
    ///
    /// # Errors
    ///
    /// Returns an argument error for non-object or class-mismatched
    /// arguments and a not-found error for an unknown property.
    pub fn is_different(&self, property: &Property, old: &Value, new: &Value) -> UowResult<bool> {
        self.value_comparer.has_different_value(property, new, old)
    }

    /// Builds the change for a single property of two entities.
    ///
    /// # Errors
    ///
    /// Returns [`UowError::NoDifference`] when the property values turn out
    /// identical — this helper must only be invoked after
    /// [`ChangeBuilder::is_different`] confirmed a difference.
    pub fn build_change(&self, property: &Property, old: &Value, new: &Value) -> UowResult<Change> {
        if !self.is_different(property, old, new)? {
            return Err(UowError::NoDifference);
        }

        let old_value = self.accessor.get_value(old, property.name())?;
        let new_value = self.accessor.get_value(new, property.name())?;

        let mut visiting = HashSet::new();
        self.build_property_change(property, old_value, new_value, &mut visiting)
    }

    fn build_changes_guarded(
        &self,
        old: &Value,
        new: &Value,
        visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
    ) -> UowResult<ChangeSet> {
        let Some(old_entity) = old.as_entity() else {
            return Err(UowError::invalid_argument(
                "changes can only be built for valid objects",
            ));
        };
        let Some(new_entity) = new.as_entity() else {
            return Err(UowError::invalid_argument(
                "changes can only be built for valid objects",
            ));
        };

        if !visiting.insert((old_entity.token(), new_entity.token())) {
            return Ok(ChangeSet::default());
        }

        let definition = self.definitions.get(old_entity)?;
        let mut changes = Vec::new();
        for property in definition.observed_properties() {
            if self.is_different(property, old, new)? {
                let old_value = self.accessor.get_value(old, property.name())?;
                let new_value = self.accessor.get_value(new, property.name())?;
                changes.push(self.build_property_change(property, old_value, new_value, visiting)?);
            }
        }

        Ok(ChangeSet::new(changes))
    }

    fn build_property_change(
        &self,
        property: &Property,
        old_value: Value,
        new_value: Value,
        visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
    ) -> UowResult<Change> {
        if let Some(association) = property.association() {
            return match association.kind() {
                AssociationKind::ToSingle => {
                    self.build_to_single_change(property, association, old_value, new_value, visiting)
                }
                AssociationKind::ToMany => {
                    self.build_to_many_change(property, association, old_value, new_value, visiting)
                }
            };
        }

        Ok(Change::Scalar {
            property: property.clone(),
            old: old_value,
            new: new_value,
        })
    }

    fn build_to_single_change(
        &self,
        property: &Property,
        association: &Association,
        old_value: Value,
        new_value: Value,
        visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
    ) -> UowResult<Change> {
        if new_value.is_null() {
            let old_entity = expect_target_entity(property, association, &old_value)?;
            return Ok(Change::RemovedEntity {
                property: property.clone(),
                entity: old_entity,
            });
        }

        if old_value.is_null() {
            let new_entity = expect_target_entity(property, association, &new_value)?;
            let persisted = self.identifier.is_persisted(&new_entity)?;
            return Ok(Change::NewEntity {
                property: property.clone(),
                entity: new_entity,
                persisted,
            });
        }

        let old_entity = expect_target_entity(property, association, &old_value)?;
        let new_entity = expect_target_entity(property, association, &new_value)?;
        let changes = self.build_changes_guarded(&old_value, &new_value, visiting)?;

        // The nested set may be empty when the difference lies outside the
        // target class's observed properties; callers treat an empty nested
        // set as a no-op edit.
        Ok(Change::EditedEntity {
            property: property.clone(),
            changes,
            old: old_entity,
            new: new_entity,
        })
    }

    fn build_to_many_change(
        &self,
        property: &Property,
        association: &Association,
        old_value: Value,
        new_value: Value,
        visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
    ) -> UowResult<Change> {
        let Some(new_elements) = new_value.as_array() else {
            return Err(UowError::NotTraversable {
                property: property.name().to_owned(),
            });
        };

        let old_by_identity = self.to_persisted_entries(&old_value)?;
        let mut seen_identities: HashSet<Value> = HashSet::new();
        let mut changes = Vec::new();

        for element in new_elements {
            let new_element = expect_target_entity(property, association, element)?;

            if !self.identifier.is_persisted(&new_element)? {
                changes.push(Change::NewEntity {
                    property: property.clone(),
                    entity: new_element,
                    persisted: false,
                });
                continue;
            }

            let identity = self.identifier.identity(&new_element)?;
            seen_identities.insert(identity.clone());

            if let Some(old_element) = lookup(&old_by_identity, &identity) {
                let nested = self.build_changes_guarded(
                    &old_element.as_value(),
                    &new_element.as_value(),
                    visiting,
                )?;
                if !nested.is_empty() {
                    changes.push(Change::EditedEntity {
                        property: property.clone(),
                        changes: nested,
                        old: old_element.clone(),
                        new: new_element,
                    });
                }
                continue;
            }

            // A pre-existing entity newly associated with this collection.
            changes.push(Change::NewEntity {
                property: property.clone(),
                entity: new_element,
                persisted: true,
            });
        }

        for (identity, old_element) in &old_by_identity {
            if !seen_identities.contains(identity) {
                changes.push(Change::RemovedEntity {
                    property: property.clone(),
                    entity: old_element.clone(),
                });
            }
        }

        Ok(Change::AssociatedCollection {
            property: property.clone(),
            old: old_value,
            new: new_value,
            changes,
        })
    }

    /// Keys the old collection by persistence identity. Elements lacking
    /// identity cannot be matched and are excluded; a non-traversable old
    /// value yields an empty map.
    fn to_persisted_entries(&self, old_value: &Value) -> UowResult<Vec<(Value, Entity)>> {
        let Some(elements) = old_value.as_array() else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for element in elements {
            let Some(entity) = element.as_entity() else {
                continue;
            };
            if self.identifier.is_persisted(entity)? {
                entries.push((self.identifier.identity(entity)?, entity.clone()));
            }
        }
        Ok(entries)
    }
}

fn lookup<'a>(entries: &'a [(Value, Entity)], identity: &Value) -> Option<&'a Entity> {
    entries
        .iter()
        .find(|(key, _)| key == identity)
        .map(|(_, entity)| entity)
}

fn expect_target_entity(
    property: &Property,
    association: &Association,
    value: &Value,
) -> UowResult<Entity> {
    match value.as_entity() {
        Some(entity) if association.targets(entity) => Ok(entity.clone()),
        _ => Err(UowError::AssociationMismatch {
            property: property.name().to_owned(),
            expected: association.target_class().to_owned(),
        }),
    }
}
