//! Transient entity state classification.

use std::fmt;

/// State of a tracked entity, computed fresh at each classification.
///
/// The state is never stored; it is derived from the registry, the
/// identifier and the comparer at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Registered but not yet persisted.
    New,
    /// Persisted and differing from its snapshot.
    Edited,
    /// Persisted and flagged for removal.
    Removed,
    /// Persisted and identical to its snapshot.
    Unchanged,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityState::New => "new",
            EntityState::Edited => "edited",
            EntityState::Removed => "removed",
            EntityState::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}
