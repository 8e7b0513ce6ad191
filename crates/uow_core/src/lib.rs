//! # uow_core
//!
//! An in-memory unit-of-work engine: register entities with a baseline
//! snapshot, mutate them freely, then commit — the engine computes exactly
//! what changed and dispatches the minimal set of persistence commands
//! (create, update, delete) to an externally supplied command bus.
//!
//! This crate provides:
//! - a dynamic value and entity model with token-based object identity
//! - the entity registry (snapshot storage, removal flags, rollback)
//! - identity resolution (persisted vs. new entities)
//! - deep value comparison and entity equality
//! - the recursive change builder (scalars, to-one and to-many
//!   associations)
//! - the unit-of-work orchestrator and its command dispatch boundary
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uow_core::{
//!     Command, CommandBus, Definition, Definitions, Entity, Property,
//!     UnitOfWork, UowResult, Value,
//! };
//!
//! struct PrintBus;
//!
//! impl CommandBus for PrintBus {
//!     fn dispatch(&mut self, command: Command) -> UowResult<()> {
//!         println!("dispatching for {:?}", command.entity());
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> UowResult<()> {
//! let definitions: Arc<Definitions> = Arc::new(
//!     [Definition::new("Person", "id").observe(Property::new("firstName"))]
//!         .into_iter()
//!         .collect(),
//! );
//! let mut uow = UnitOfWork::with_defaults(definitions, Box::new(PrintBus));
//!
//! let person = Entity::new("Person")
//!     .with("id", 1i64)
//!     .with("firstName", "Norbert");
//! uow.register(&person.as_value())?;
//!
//! person.set("firstName", "Michal");
//! uow.commit()?; // dispatches one update command
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod entity;
mod error;
mod object;
mod state;
mod unit_of_work;
mod value;

pub use command::{Command, CommandBus, EditCommand, NewCommand, RemoveCommand};
pub use entity::{
    Association, AssociationKind, Change, ChangeBuilder, ChangeSet, Comparer, DeepValueComparer,
    Definition, DefinitionIdentifier, Definitions, Identifier, Property, ValueComparer,
};
pub use error::{UowError, UowResult};
pub use object::{
    DeepCopySnapshotMaker, Entity, InMemoryRegistry, ObjectToken, PropertyAccess,
    PropertyAccessor, PropertyRestorer, RecoveryPoint, Registry, SnapshotMaker,
};
pub use state::EntityState;
pub use unit_of_work::UnitOfWork;
pub use value::Value;
