//! Object layer: entity handles, property access, snapshots and the
//! registry.

mod accessor;
mod entity;
mod registry;
mod snapshot;

pub use accessor::{PropertyAccess, PropertyAccessor};
pub use entity::{Entity, ObjectToken};
pub use registry::{InMemoryRegistry, Registry};
pub use snapshot::{DeepCopySnapshotMaker, PropertyRestorer, RecoveryPoint, SnapshotMaker};
