//! Entity layer: definitions, identity resolution, comparison and change
//! building.

mod builder;
mod change;
mod comparer;
mod definition;
mod identifier;

pub use builder::ChangeBuilder;
pub use change::{Change, ChangeSet};
pub use comparer::{Comparer, DeepValueComparer, ValueComparer};
pub use definition::{Association, AssociationKind, Definition, Definitions, Property};
pub use identifier::{DefinitionIdentifier, Identifier};
