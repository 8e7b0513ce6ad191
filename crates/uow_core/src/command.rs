//! Persistence commands and the dispatch boundary.
//!
//! The orchestrator only constructs intent objects; executing them
//! (database writes, ORM calls, transport) is entirely the command bus
//! implementation's concern.

use crate::entity::ChangeSet;
use crate::error::{UowError, UowResult};
use crate::object::Entity;
use crate::value::Value;

fn expect_object(command: &str, value: &Value) -> UowResult<Entity> {
    value.as_entity().cloned().ok_or_else(|| {
        UowError::invalid_argument(format!(
            "{command} command require object \"{}\" type passed",
            value.kind_name()
        ))
    })
}

/// Command to persist a new entity.
#[derive(Debug, Clone)]
pub struct NewCommand {
    entity: Entity,
}

impl NewCommand {
    /// Creates a command wrapping the entity to create.
    ///
    /// # Errors
    ///
    /// Returns an argument error naming the runtime kind when the value is
    /// not an object.
    pub fn new(value: &Value) -> UowResult<Self> {
        Ok(Self {
            entity: expect_object("new", value)?,
        })
    }

    /// Returns the entity to persist.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// Command to apply computed changes to an existing entity.
#[derive(Debug, Clone)]
pub struct EditCommand {
    entity: Entity,
    changes: ChangeSet,
}

impl EditCommand {
    /// Creates a command wrapping the entity and its computed change set.
    ///
    /// # Errors
    ///
    /// Returns an argument error naming the runtime kind when the value is
    /// not an object.
    pub fn new(value: &Value, changes: ChangeSet) -> UowResult<Self> {
        Ok(Self {
            entity: expect_object("edit", value)?,
            changes,
        })
    }

    /// Returns the edited entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Returns the computed change set.
    #[must_use]
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }
}

/// Command to delete a persisted entity.
#[derive(Debug, Clone)]
pub struct RemoveCommand {
    entity: Entity,
}

impl RemoveCommand {
    /// Creates a command wrapping the entity to delete.
    ///
    /// # Errors
    ///
    /// Returns an argument error naming the runtime kind when the value is
    /// not an object.
    pub fn new(value: &Value) -> UowResult<Self> {
        Ok(Self {
            entity: expect_object("remove", value)?,
        })
    }

    /// Returns the entity to delete.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// A persistence command dispatched by the unit of work.
#[derive(Debug, Clone)]
pub enum Command {
    /// Create a new entity.
    New(NewCommand),
    /// Update an existing entity with a change set.
    Edit(EditCommand),
    /// Delete a persisted entity.
    Remove(RemoveCommand),
}

impl Command {
    /// Returns the entity this command targets.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        match self {
            Command::New(command) => command.entity(),
            Command::Edit(command) => command.entity(),
            Command::Remove(command) => command.entity(),
        }
    }
}

/// Externally supplied dispatcher that persists commands.
///
/// Dispatch is synchronous and unconditional per entity; the engine never
/// retries or batches. A dispatch failure propagates immediately out of the
/// commit in progress.
pub trait CommandBus {
    /// Dispatches one command to the persistence layer.
    ///
    /// # Errors
    ///
    /// Implementations surface persistence failures as [`UowError`];
    /// the commit propagates them unchanged.
    fn dispatch(&mut self, command: Command) -> UowResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_command_wraps_object() {
        let entity = Entity::new("Person");
        let command = NewCommand::new(&entity.as_value()).unwrap();
        assert_eq!(command.entity(), &entity);
    }

    #[test]
    fn new_command_rejects_non_object() {
        let err = NewCommand::new(&Value::from("this is string")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: new command require object \"string\" type passed"
        );
    }

    #[test]
    fn edit_command_carries_change_set() {
        let entity = Entity::new("Person");
        let command = EditCommand::new(&entity.as_value(), ChangeSet::default()).unwrap();
        assert!(command.changes().is_empty());
    }

    #[test]
    fn remove_command_rejects_non_object() {
        let err = RemoveCommand::new(&Value::Integer(42)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: remove command require object \"integer\" type passed"
        );
    }
}
