//! Entity registry: snapshot storage and lifecycle.

use crate::error::{UowError, UowResult};
use crate::object::entity::{Entity, ObjectToken};
use crate::object::snapshot::{
    DeepCopySnapshotMaker, PropertyRestorer, RecoveryPoint, SnapshotMaker,
};
use std::collections::{HashMap, HashSet};

/// Stores tracked entities and their baseline snapshots.
///
/// Entities are keyed by [`ObjectToken`], not persistence identity —
/// entities may be registered before the persistence layer assigns them one.
pub trait Registry {
    /// Checks whether an entity is registered.
    fn is_registered(&self, entity: &Entity) -> bool;

    /// Registers an entity and takes an immediate snapshot.
    ///
    /// Registering an already-registered entity re-snapshots it.
    fn register(&mut self, entity: &Entity);

    /// Returns the stored snapshot of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`UowError::NotRegistered`] when the entity is not tracked.
    fn get_snapshot(&self, entity: &Entity) -> UowResult<Entity>;

    /// Replaces every registered entity's snapshot with a fresh deep copy
    /// of its current state.
    fn make_new_snapshots(&mut self);

    /// Replaces one registered entity's snapshot with a fresh deep copy of
    /// its current state. No-op for unregistered entities.
    fn make_new_object_snapshot(&mut self, entity: &Entity);

    /// Checks whether an entity is flagged as removed.
    fn is_removed(&self, entity: &Entity) -> bool;

    /// Flags an entity as removed, registering it first if needed so a
    /// last-known snapshot exists before deletion.
    fn remove(&mut self, entity: &Entity);

    /// Purges every entity flagged as removed, deleting its registration
    /// and stored snapshot.
    fn clean_removed(&mut self);

    /// Purges one removed entity's registration, snapshot and removal flag.
    ///
    /// # Errors
    ///
    /// Returns an argument error when the entity was never flagged removed.
    fn clean_removed_object(&mut self, entity: &Entity) -> UowResult<()>;

    /// Returns all registered entities in registration order.
    fn all(&self) -> Vec<Entity>;

    /// Restores every registered entity's live state from its snapshot and
    /// clears all removal flags.
    fn reset(&mut self);
}

/// In-memory [`Registry`] implementation.
pub struct InMemoryRegistry {
    snapshot_maker: Box<dyn SnapshotMaker>,
    recovery_point: Box<dyn RecoveryPoint>,
    objects: HashMap<ObjectToken, Entity>,
    snapshots: HashMap<ObjectToken, Entity>,
    removed: HashSet<ObjectToken>,
    order: Vec<ObjectToken>,
}

impl InMemoryRegistry {
    /// Creates a registry with explicit snapshot and recovery capabilities.
    #[must_use]
    pub fn new(
        snapshot_maker: Box<dyn SnapshotMaker>,
        recovery_point: Box<dyn RecoveryPoint>,
    ) -> Self {
        Self {
            snapshot_maker,
            recovery_point,
            objects: HashMap::new(),
            snapshots: HashMap::new(),
            removed: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Checks whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn purge(&mut self, token: ObjectToken) {
        self.objects.remove(&token);
        self.snapshots.remove(&token);
        self.removed.remove(&token);
        self.order.retain(|t| *t != token);
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(
            Box::new(DeepCopySnapshotMaker::new()),
            Box::new(PropertyRestorer::new()),
        )
    }
}

impl Registry for InMemoryRegistry {
    fn is_registered(&self, entity: &Entity) -> bool {
        self.objects.contains_key(&entity.token())
    }

    fn register(&mut self, entity: &Entity) {
        let token = entity.token();
        if !self.objects.contains_key(&token) {
            self.order.push(token);
        }
        self.objects.insert(token, entity.clone());
        self.snapshots
            .insert(token, self.snapshot_maker.snapshot_of(entity));
    }

    fn get_snapshot(&self, entity: &Entity) -> UowResult<Entity> {
        self.snapshots
            .get(&entity.token())
            .cloned()
            .ok_or(UowError::NotRegistered)
    }

    fn make_new_snapshots(&mut self) {
        for token in &self.order {
            if let Some(entity) = self.objects.get(token) {
                self.snapshots
                    .insert(*token, self.snapshot_maker.snapshot_of(entity));
            }
        }
    }

    fn make_new_object_snapshot(&mut self, entity: &Entity) {
        let token = entity.token();
        if self.objects.contains_key(&token) {
            self.snapshots
                .insert(token, self.snapshot_maker.snapshot_of(entity));
        }
    }

    fn is_removed(&self, entity: &Entity) -> bool {
        self.removed.contains(&entity.token())
    }

    fn remove(&mut self, entity: &Entity) {
        if !self.is_registered(entity) {
            self.register(entity);
        }
        self.removed.insert(entity.token());
    }

    fn clean_removed(&mut self) {
        let removed: Vec<ObjectToken> = self.removed.iter().copied().collect();
        for token in removed {
            self.purge(token);
        }
    }

    fn clean_removed_object(&mut self, entity: &Entity) -> UowResult<()> {
        if !self.removed.contains(&entity.token()) {
            return Err(UowError::invalid_argument(
                "object wasn't flagged as removed",
            ));
        }
        self.purge(entity.token());
        Ok(())
    }

    fn all(&self) -> Vec<Entity> {
        self.order
            .iter()
            .filter_map(|token| self.objects.get(token).cloned())
            .collect()
    }

    fn reset(&mut self) {
        self.removed.clear();
        for (token, snapshot) in &self.snapshots {
            if let Some(entity) = self.objects.get(token) {
                self.recovery_point.restore(entity, snapshot);
            }
        }
    }
}
