//! Dynamic property value type.

use crate::object::Entity;

/// A dynamic value held by an entity property.
///
/// This type represents everything the engine can observe on a tracked
/// entity: scalars, byte strings, arrays and references to other entities.
/// Floats are intentionally not supported — identity keys and snapshot maps
/// require `Eq` and `Hash`.
///
/// Derived equality compares [`Entity`] values by object token (reference
/// identity). Deep structural comparison is the value comparer's job, see
/// [`crate::entity::DeepValueComparer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Text string (UTF-8).
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Array of values; a to-many association holds an array of entities.
    Array(Vec<Value>),
    /// Reference to another entity.
    Entity(Entity),
}

impl Value {
    /// Returns the runtime kind of this value, used in argument-error
    /// messages (`new command require object "string" type passed`).
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Text(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Entity(_) => "object",
        }
    }

    /// Checks whether this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Checks whether this value is an entity reference.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Entity(_))
    }

    /// Returns the entity reference, if this value holds one.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Returns the array elements, if this value is traversable.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::Bool(true).kind_name(), "boolean");
        assert_eq!(Value::Integer(1).kind_name(), "integer");
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::Bytes(vec![0]).kind_name(), "bytes");
        assert_eq!(Value::Array(vec![]).kind_name(), "array");
        assert_eq!(Value::Entity(Entity::new("Person")).kind_name(), "object");
    }

    #[test]
    fn scalar_equality_is_structural() {
        assert_eq!(Value::from("abc"), Value::from("abc"));
        assert_ne!(Value::from(1), Value::from(2));
        assert_eq!(
            Value::from(vec![1i64, 2, 3]),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn entity_equality_is_by_reference() {
        let a = Entity::new("Person");
        assert_eq!(Value::Entity(a.clone()), Value::Entity(a));
        assert_ne!(
            Value::Entity(Entity::new("Person")),
            Value::Entity(Entity::new("Person"))
        );
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }
}
