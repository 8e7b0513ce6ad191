//! Unit-of-work orchestrator.

use crate::command::{Command, CommandBus, EditCommand, NewCommand, RemoveCommand};
use crate::entity::{ChangeBuilder, Comparer, DefinitionIdentifier, Definitions, Identifier};
use crate::error::{UowError, UowResult};
use crate::object::{Entity, InMemoryRegistry, Registry};
use crate::state::EntityState;
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Tracks entity mutations between two points in time and translates the
/// observed differences into persistence commands.
///
/// Entities are registered with a baseline snapshot, mutated freely by
/// application code and later committed, at which point the engine
/// classifies each tracked entity as new, edited, removed or unchanged and
/// dispatches exactly one corresponding command per entity that changed.
///
/// The engine is defined for single-threaded, synchronous use within one
/// logical transaction scope. Partial commits are not supported: a dispatch
/// failure propagates immediately, leaving already-processed entities
/// committed and unprocessed ones at their pre-commit snapshots — callers
/// own that half-applied state.
pub struct UnitOfWork {
    registry: Box<dyn Registry>,
    identifier: Arc<dyn Identifier>,
    change_builder: ChangeBuilder,
    comparer: Comparer,
    bus: Box<dyn CommandBus>,
}

impl UnitOfWork {
    /// Creates a unit of work with explicit collaborators.
    #[must_use]
    pub fn new(
        registry: Box<dyn Registry>,
        identifier: Arc<dyn Identifier>,
        change_builder: ChangeBuilder,
        comparer: Comparer,
        bus: Box<dyn CommandBus>,
    ) -> Self {
        Self {
            registry,
            identifier,
            change_builder,
            comparer,
            bus,
        }
    }

    /// Creates a unit of work with the default registry, identifier,
    /// change builder and comparer wired over a definition repository.
    #[must_use]
    pub fn with_defaults(definitions: Arc<Definitions>, bus: Box<dyn CommandBus>) -> Self {
        let identifier: Arc<dyn Identifier> =
            Arc::new(DefinitionIdentifier::new(definitions.clone()));
        Self::new(
            Box::new(InMemoryRegistry::default()),
            identifier.clone(),
            ChangeBuilder::new(definitions.clone(), identifier),
            Comparer::new(definitions),
            bus,
        )
    }

    /// Registers an entity and takes its baseline snapshot.
    ///
    /// # Errors
    ///
    /// Returns an argument error when the value is not an object or not an
    /// entity type known to the identifier.
    pub fn register(&mut self, value: &Value) -> UowResult<()> {
        let Some(entity) = value.as_entity() else {
            return Err(UowError::invalid_argument(
                "only objects can be registered in the unit of work",
            ));
        };
        if !self.identifier.is_entity(value) {
            return Err(UowError::invalid_argument(
                "only entities can be registered in the unit of work",
            ));
        }

        debug!(token = %entity.token(), class = %entity.class(), "registering entity");
        self.registry.register(entity);
        Ok(())
    }

    /// Checks whether a value is a registered entity.
    #[must_use]
    pub fn is_registered(&self, value: &Value) -> bool {
        value
            .as_entity()
            .is_some_and(|entity| self.registry.is_registered(entity))
    }

    /// Flags an entity for removal on the next commit.
    ///
    /// An unregistered entity is registered first, capturing a last-known
    /// snapshot before deletion.
    ///
    /// # Errors
    ///
    /// Returns an argument error when the value is not an object, and a
    /// domain error when the entity is neither registered nor persisted.
    pub fn remove(&mut self, value: &Value) -> UowResult<()> {
        let Some(entity) = value.as_entity() else {
            return Err(UowError::invalid_argument(
                "only objects can be removed by the unit of work",
            ));
        };

        if !self.registry.is_registered(entity) && !self.identifier.is_persisted(entity)? {
            return Err(UowError::runtime(
                "unit of work can't remove not persisted entities",
            ));
        }

        debug!(token = %entity.token(), class = %entity.class(), "flagging entity as removed");
        self.registry.remove(entity);
        Ok(())
    }

    /// Commits all tracked entities.
    ///
    /// Entities are processed in registration order: each is classified and
    /// at most one command is dispatched for it. After all entities are
    /// processed, removed entities are purged and the remaining snapshots
    /// advance to the current live state.
    ///
    /// # Errors
    ///
    /// Propagates classification, diffing and dispatch errors immediately;
    /// on failure no snapshot advancement has happened.
    pub fn commit(&mut self) -> UowResult<()> {
        debug!("committing all tracked entities");
        for entity in self.registry.all() {
            self.commit_one(&entity)?;
        }

        self.registry.clean_removed();
        self.registry.make_new_snapshots();
        Ok(())
    }

    /// Commits a single entity, leaving all other tracked entities exactly
    /// as they were: no global snapshot refresh, no global removal purge.
    ///
    /// # Errors
    ///
    /// Returns an argument error when the value is not an object; otherwise
    /// same conditions as [`UnitOfWork::commit`].
    pub fn commit_entity(&mut self, value: &Value) -> UowResult<()> {
        let Some(entity) = value.as_entity().cloned() else {
            return Err(UowError::invalid_argument(
                "only objects can be committed by the unit of work",
            ));
        };

        let was_removed = self.registry.is_removed(&entity);
        self.commit_one(&entity)?;

        if was_removed {
            self.registry.clean_removed_object(&entity)?;
        } else {
            self.registry.make_new_object_snapshot(&entity);
        }
        Ok(())
    }

    /// Restores every tracked entity to its last snapshot and clears all
    /// removal flags, discarding in-memory edits made since the last
    /// commit. Registration is unaffected.
    pub fn rollback(&mut self) {
        debug!("rolling back all tracked entities");
        self.registry.reset();
    }

    fn commit_one(&mut self, entity: &Entity) -> UowResult<()> {
        let state = self.entity_state(entity)?;
        trace!(token = %entity.token(), %state, "classified entity");

        match state {
            EntityState::New => {
                let command = NewCommand::new(&entity.as_value())?;
                self.bus.dispatch(Command::New(command))?;
            }
            EntityState::Edited => {
                let snapshot = self.registry.get_snapshot(entity)?;
                let changes = self
                    .change_builder
                    .build_changes(&snapshot.as_value(), &entity.as_value())?;
                let command = EditCommand::new(&entity.as_value(), changes)?;
                self.bus.dispatch(Command::Edit(command))?;
            }
            EntityState::Removed => {
                let command = RemoveCommand::new(&entity.as_value())?;
                self.bus.dispatch(Command::Remove(command))?;
            }
            EntityState::Unchanged => {}
        }
        Ok(())
    }

    /// Classifies one entity. Removal takes precedence; an unpersisted
    /// entity is new; otherwise the snapshot comparison decides between
    /// edited and unchanged.
    fn entity_state(&self, entity: &Entity) -> UowResult<EntityState> {
        if !self.registry.is_registered(entity) {
            return Err(UowError::NotRegistered);
        }

        if self.registry.is_removed(entity) {
            return Ok(EntityState::Removed);
        }

        if !self.identifier.is_persisted(entity)? {
            return Ok(EntityState::New);
        }

        if self.is_changed(entity)? {
            return Ok(EntityState::Edited);
        }

        Ok(EntityState::Unchanged)
    }

    fn is_changed(&self, entity: &Entity) -> UowResult<bool> {
        let snapshot = self.registry.get_snapshot(entity)?;
        Ok(!self
            .comparer
            .are_equal(&entity.as_value(), &snapshot.as_value())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Definition, Property};

    #[derive(Default)]
    struct RecordingBus {
        commands: Arc<parking_lot::Mutex<Vec<Command>>>,
    }

    impl CommandBus for RecordingBus {
        fn dispatch(&mut self, command: Command) -> UowResult<()> {
            self.commands.lock().push(command);
            Ok(())
        }
    }

    fn definitions() -> Arc<Definitions> {
        Arc::new(
            [Definition::new("Person", "id")
                .observe(Property::new("firstName"))
                .observe(Property::new("lastName"))]
            .into_iter()
            .collect(),
        )
    }

    fn unit_of_work() -> (UnitOfWork, Arc<parking_lot::Mutex<Vec<Command>>>) {
        let bus = RecordingBus::default();
        let commands = bus.commands.clone();
        (
            UnitOfWork::with_defaults(definitions(), Box::new(bus)),
            commands,
        )
    }

    fn person(id: impl Into<Value>, first_name: &str) -> Entity {
        Entity::new("Person")
            .with("id", id)
            .with("firstName", first_name)
            .with("lastName", "Orzechowicz")
    }

    #[test]
    fn register_rejects_non_objects() {
        let (mut uow, _) = unit_of_work();
        let err = uow.register(&Value::from("person")).unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));
    }

    #[test]
    fn register_rejects_unknown_entity_types() {
        let (mut uow, _) = unit_of_work();
        let stranger = Entity::new("Stranger").with("id", 1i64);
        let err = uow.register(&stranger.as_value()).unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));
    }

    #[test]
    fn new_entity_dispatches_create() {
        let (mut uow, commands) = unit_of_work();
        let fresh = person(Value::Null, "Norbert");

        uow.register(&fresh.as_value()).unwrap();
        uow.commit().unwrap();

        let commands = commands.lock();
        assert_eq!(commands.len(), 1);
        assert!(matches!(&commands[0], Command::New(_)));
    }

    #[test]
    fn edited_entity_dispatches_update_with_changes() {
        let (mut uow, commands) = unit_of_work();
        let tracked = person(1i64, "Norbert");

        uow.register(&tracked.as_value()).unwrap();
        tracked.set("firstName", "Michal");
        uow.commit().unwrap();

        let commands = commands.lock();
        assert_eq!(commands.len(), 1);
        let Command::Edit(command) = &commands[0] else {
            panic!("expected edit command");
        };
        let changes = command.changes();
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            changes.change_for("firstName").unwrap(),
            crate::entity::Change::Scalar { old, new, .. }
                if *old == Value::from("Norbert") && *new == Value::from("Michal")
        ));
    }

    #[test]
    fn unchanged_entity_dispatches_nothing() {
        let (mut uow, commands) = unit_of_work();
        let tracked = person(1i64, "Norbert");

        uow.register(&tracked.as_value()).unwrap();
        uow.commit().unwrap();
        uow.commit().unwrap();

        assert!(commands.lock().is_empty());
    }

    #[test]
    fn commit_advances_the_baseline() {
        let (mut uow, commands) = unit_of_work();
        let tracked = person(1i64, "Norbert");

        uow.register(&tracked.as_value()).unwrap();
        tracked.set("firstName", "Michal");
        uow.commit().unwrap();
        uow.commit().unwrap();

        // Second commit sees the advanced snapshot: exactly one update.
        assert_eq!(commands.lock().len(), 1);
    }

    #[test]
    fn removed_entity_dispatches_delete_and_is_purged() {
        let (mut uow, commands) = unit_of_work();
        let tracked = person(1i64, "Norbert");

        uow.register(&tracked.as_value()).unwrap();
        uow.remove(&tracked.as_value()).unwrap();
        uow.commit().unwrap();

        assert!(matches!(&commands.lock()[0], Command::Remove(_)));
        assert!(!uow.is_registered(&tracked.as_value()));
    }

    #[test]
    fn remove_of_unregistered_unpersisted_entity_fails() {
        let (mut uow, _) = unit_of_work();
        let fresh = person(Value::Null, "Norbert");

        let err = uow.remove(&fresh.as_value()).unwrap_err();
        assert!(matches!(err, UowError::Runtime { .. }));
        assert!(!uow.is_registered(&fresh.as_value()));
    }

    #[test]
    fn remove_of_unregistered_persisted_entity_succeeds() {
        let (mut uow, commands) = unit_of_work();
        let persisted = person(1i64, "Norbert");

        uow.remove(&persisted.as_value()).unwrap();
        uow.commit().unwrap();

        assert!(matches!(&commands.lock()[0], Command::Remove(_)));
    }

    #[test]
    fn rollback_restores_snapshots_and_removal_flags() {
        let (mut uow, commands) = unit_of_work();
        let tracked = person(1i64, "Norbert");

        uow.register(&tracked.as_value()).unwrap();
        tracked.set("firstName", "Michal");
        uow.remove(&tracked.as_value()).unwrap();
        uow.rollback();
        uow.commit().unwrap();

        assert_eq!(tracked.get("firstName"), Some(Value::from("Norbert")));
        assert!(uow.is_registered(&tracked.as_value()));
        assert!(commands.lock().is_empty());
    }

    #[test]
    fn commit_entity_leaves_other_entities_untouched() {
        let (mut uow, commands) = unit_of_work();
        let committed = person(1i64, "Norbert");
        let untouched = person(2i64, "Dawid");

        uow.register(&committed.as_value()).unwrap();
        uow.register(&untouched.as_value()).unwrap();
        committed.set("firstName", "Michal");
        untouched.set("firstName", "Kuba");

        uow.commit_entity(&committed.as_value()).unwrap();
        assert_eq!(commands.lock().len(), 1);

        // The other entity's snapshot did not advance: a full commit still
        // sees its pending edit.
        uow.commit().unwrap();
        let commands = commands.lock();
        assert_eq!(commands.len(), 2);
        let Command::Edit(command) = &commands[1] else {
            panic!("expected edit command");
        };
        assert_eq!(command.entity().token(), untouched.token());
    }

    #[test]
    fn commit_entity_purges_removed_entity_only() {
        let (mut uow, _) = unit_of_work();
        let removed = person(1i64, "Norbert");
        let kept = person(2i64, "Dawid");

        uow.register(&removed.as_value()).unwrap();
        uow.register(&kept.as_value()).unwrap();
        uow.remove(&removed.as_value()).unwrap();

        uow.commit_entity(&removed.as_value()).unwrap();
        assert!(!uow.is_registered(&removed.as_value()));
        assert!(uow.is_registered(&kept.as_value()));
    }

    #[test]
    fn commit_entity_rejects_non_objects() {
        let (mut uow, _) = unit_of_work();
        let err = uow.commit_entity(&Value::Integer(1)).unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));
    }

    #[test]
    fn commit_entity_of_unregistered_entity_fails() {
        let (mut uow, _) = unit_of_work();
        let unregistered = person(1i64, "Norbert");

        let err = uow.commit_entity(&unregistered.as_value()).unwrap_err();
        assert!(matches!(err, UowError::NotRegistered));
    }
}
