//! Snapshotting and snapshot-based recovery.

use crate::object::Entity;

/// Capability for taking baseline snapshots of entities.
///
/// A snapshot is an independent deep copy of an entity's state at the
/// moment it was taken; later mutation of the live entity must never be
/// visible through the snapshot.
pub trait SnapshotMaker {
    /// Takes a snapshot of an entity.
    fn snapshot_of(&self, entity: &Entity) -> Entity;
}

/// Capability for restoring an entity from a snapshot (rollback).
pub trait RecoveryPoint {
    /// Overwrites the entity's live properties from the snapshot,
    /// field by field.
    fn restore(&self, entity: &Entity, snapshot: &Entity);
}

/// Default snapshot maker backed by [`Entity::deep_clone`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCopySnapshotMaker;

impl DeepCopySnapshotMaker {
    /// Creates a new deep-copy snapshot maker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotMaker for DeepCopySnapshotMaker {
    fn snapshot_of(&self, entity: &Entity) -> Entity {
        entity.deep_clone()
    }
}

/// Default recovery point that deep-copies property values back from the
/// snapshot, so restored state never aliases the stored snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyRestorer;

impl PropertyRestorer {
    /// Creates a new property restorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RecoveryPoint for PropertyRestorer {
    fn restore(&self, entity: &Entity, snapshot: &Entity) {
        // Re-cloning keeps the snapshot usable for a later rollback.
        entity.replace_properties(snapshot.deep_clone().properties());
    }
}
