//! Change descriptions produced by diffing two entity states.

use crate::entity::definition::Property;
use crate::object::Entity;
use crate::value::Value;

/// One property's difference between two entity states.
#[derive(Debug, Clone)]
pub enum Change {
    /// A scalar property changed value.
    Scalar {
        /// The changed property.
        property: Property,
        /// Value before the change.
        old: Value,
        /// Value after the change.
        new: Value,
    },
    /// A new entity appeared under an association.
    NewEntity {
        /// The association property.
        property: Property,
        /// The newly associated entity.
        entity: Entity,
        /// Whether the entity was already persisted elsewhere when it was
        /// associated.
        persisted: bool,
    },
    /// An associated entity disappeared.
    RemovedEntity {
        /// The association property.
        property: Property,
        /// The entity that is no longer associated.
        entity: Entity,
    },
    /// An associated entity was edited.
    EditedEntity {
        /// The association property.
        property: Property,
        /// The nested change set of the associated entity.
        changes: ChangeSet,
        /// Old state of the associated entity.
        old: Entity,
        /// New state of the associated entity.
        new: Entity,
    },
    /// A to-many association changed.
    AssociatedCollection {
        /// The association property.
        property: Property,
        /// Old collection value.
        old: Value,
        /// New collection value.
        new: Value,
        /// Per-element changes, in new-collection order with removals last.
        changes: Vec<Change>,
    },
}

impl Change {
    /// Returns the property this change describes.
    #[must_use]
    pub fn property(&self) -> &Property {
        match self {
            Change::Scalar { property, .. }
            | Change::NewEntity { property, .. }
            | Change::RemovedEntity { property, .. }
            | Change::EditedEntity { property, .. }
            | Change::AssociatedCollection { property, .. } => property,
        }
    }
}

/// Ordered sequence of [`Change`] values for one entity's commit.
///
/// May be empty — an entity with zero differing properties is a valid,
/// non-error result at the top level.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates a change set from a list of changes.
    #[must_use]
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    /// Returns the number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Checks whether the set contains no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates over the changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Returns the change for a property, if the property changed.
    #[must_use]
    pub fn change_for(&self, property: &str) -> Option<&Change> {
        self.changes
            .iter()
            .find(|change| change.property().name() == property)
    }

    /// Checks whether a property changed.
    #[must_use]
    pub fn has_change_for(&self, property: &str) -> bool {
        self.change_for(property).is_some()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
