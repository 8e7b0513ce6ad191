//! Entity handles and object tokens.

use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque per-allocation identity token.
///
/// Tokens are process-unique, monotonically increasing and never reused.
/// They key the registry independently of persistence identity — entities
/// may be registered before the persistence layer assigns them one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectToken(u64);

impl ObjectToken {
    fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj:{}", self.0)
    }
}

#[derive(Debug)]
struct EntityInner {
    class: String,
    properties: HashMap<String, Value>,
}

/// A mutable, identity-bearing domain object tracked for change detection.
///
/// `Entity` is a cheap handle: clones share the same underlying state and
/// the same [`ObjectToken`]. An independent copy with fresh tokens is
/// produced by [`Entity::deep_clone`]. Equality and hashing compare tokens,
/// i.e. reference identity.
///
/// Lock guards are never held across recursion; property maps are cloned
/// out under the lock so cyclic entity graphs cannot deadlock.
#[derive(Clone)]
pub struct Entity {
    token: ObjectToken,
    inner: Arc<RwLock<EntityInner>>,
}

impl Entity {
    /// Creates a new entity of the given class with no properties.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            token: ObjectToken::next(),
            inner: Arc::new(RwLock::new(EntityInner {
                class: class.into(),
                properties: HashMap::new(),
            })),
        }
    }

    /// Returns this entity's registry token.
    #[must_use]
    pub fn token(&self) -> ObjectToken {
        self.token
    }

    /// Returns this entity's class name.
    #[must_use]
    pub fn class(&self) -> String {
        self.inner.read().class.clone()
    }

    /// Checks whether a property exists on this entity.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.inner.read().properties.contains_key(name)
    }

    /// Returns a property value, or `None` if the property does not exist.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().properties.get(name).cloned()
    }

    /// Sets a property value, creating the property if absent.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.write().properties.insert(name.into(), value.into());
    }

    /// Builder-style property assignment, for fixture construction.
    #[must_use]
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a copy of the full property map.
    #[must_use]
    pub fn properties(&self) -> HashMap<String, Value> {
        self.inner.read().properties.clone()
    }

    /// Replaces the full property map.
    pub fn replace_properties(&self, properties: HashMap<String, Value>) {
        self.inner.write().properties = properties;
    }

    /// Produces an independent deep copy of this entity.
    ///
    /// Nested entities are copied recursively and receive fresh tokens.
    /// Copying is memoized per token, so cyclic entity graphs terminate and
    /// shared references stay shared within one copy.
    #[must_use]
    pub fn deep_clone(&self) -> Entity {
        let mut memo = HashMap::new();
        self.deep_clone_memo(&mut memo)
    }

    fn deep_clone_memo(&self, memo: &mut HashMap<ObjectToken, Entity>) -> Entity {
        if let Some(copy) = memo.get(&self.token) {
            return copy.clone();
        }

        let copy = Entity::new(self.class());
        memo.insert(self.token, copy.clone());

        let properties = self.properties();
        let mut copied = HashMap::with_capacity(properties.len());
        for (name, value) in properties {
            copied.insert(name, deep_clone_value(&value, memo));
        }
        copy.replace_properties(copied);
        copy
    }

    /// Wraps this handle as a dynamic [`Value`].
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Entity(self.clone())
    }
}

fn deep_clone_value(value: &Value, memo: &mut HashMap<ObjectToken, Entity>) -> Value {
    match value {
        Value::Entity(entity) => Value::Entity(entity.deep_clone_memo(memo)),
        Value::Array(values) => {
            Value::Array(values.iter().map(|v| deep_clone_value(v, memo)).collect())
        }
        scalar => scalar.clone(),
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("class", &self.class())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let a = Entity::new("Person");
        let b = Entity::new("Person");
        assert_ne!(a.token(), b.token());
    }

    #[test]
    fn clones_share_state_and_token() {
        let a = Entity::new("Person").with("name", "Norbert");
        let b = a.clone();
        b.set("name", "Michal");
        assert_eq!(a.get("name"), Some(Value::from("Michal")));
        assert_eq!(a.token(), b.token());
        assert_eq!(a, b);
    }

    #[test]
    fn deep_clone_is_independent() {
        let address = Entity::new("Address").with("city", "Warsaw");
        let person = Entity::new("Person")
            .with("name", "Norbert")
            .with("address", address.clone());

        let copy = person.deep_clone();
        assert_ne!(copy.token(), person.token());

        // Mutating the original must not leak into the copy.
        person.set("name", "Michal");
        address.set("city", "Krakow");
        assert_eq!(copy.get("name"), Some(Value::from("Norbert")));
        let copied_address = match copy.get("address") {
            Some(Value::Entity(entity)) => entity,
            other => panic!("expected entity, got {other:?}"),
        };
        assert_eq!(copied_address.get("city"), Some(Value::from("Warsaw")));
    }

    #[test]
    fn deep_clone_terminates_on_cycles() {
        let a = Entity::new("Node");
        let b = Entity::new("Node").with("next", a.clone());
        a.set("next", b.clone());

        let copy = a.deep_clone();
        let copy_b = match copy.get("next") {
            Some(Value::Entity(entity)) => entity,
            other => panic!("expected entity, got {other:?}"),
        };
        let copy_a = match copy_b.get("next") {
            Some(Value::Entity(entity)) => entity,
            other => panic!("expected entity, got {other:?}"),
        };
        // The cycle is preserved within the copy and stays off the originals.
        assert_eq!(copy_a, copy);
        assert_ne!(copy_b, b);
    }

    #[test]
    fn deep_clone_preserves_shared_references() {
        let shared = Entity::new("Tag").with("name", "shared");
        let root = Entity::new("Doc")
            .with("first", shared.clone())
            .with("second", shared);

        let copy = root.deep_clone();
        let first = copy.get("first").and_then(|v| v.as_entity().cloned());
        let second = copy.get("second").and_then(|v| v.as_entity().cloned());
        assert_eq!(first, second);
    }
}
