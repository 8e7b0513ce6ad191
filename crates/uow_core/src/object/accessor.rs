//! Generic property access.

use crate::error::{UowError, UowResult};
use crate::value::Value;

/// Capability for reading and writing entity properties by name.
///
/// This trait abstracts the reflective property access the engine relies
/// on, allowing alternative accessors (computed properties, mock access for
/// testing, etc.).
pub trait PropertyAccess {
    /// Reads a named property from an object.
    ///
    /// # Errors
    ///
    /// Returns an argument error when `object` is not an entity, and a
    /// not-found error when the property does not exist on its class.
    fn get_value(&self, object: &Value, property: &str) -> UowResult<Value>;

    /// Writes a named property on an object.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PropertyAccess::get_value`].
    fn set_value(&self, object: &Value, property: &str, value: Value) -> UowResult<()>;
}

/// Default accessor backed by the entity's property map.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAccessor;

impl PropertyAccessor {
    /// Creates a new property accessor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PropertyAccess for PropertyAccessor {
    fn get_value(&self, object: &Value, property: &str) -> UowResult<Value> {
        let entity = expect_object(object)?;
        entity
            .get(property)
            .ok_or_else(|| UowError::property_not_found(property, entity.class()))
    }

    fn set_value(&self, object: &Value, property: &str, value: Value) -> UowResult<()> {
        let entity = expect_object(object)?;
        if !entity.has_property(property) {
            return Err(UowError::property_not_found(property, entity.class()));
        }
        entity.set(property, value);
        Ok(())
    }
}

fn expect_object(value: &Value) -> UowResult<&crate::object::Entity> {
    value.as_entity().ok_or_else(|| {
        UowError::invalid_argument(format!(
            "property accessor requires an object to access a property, \"{}\" passed",
            value.kind_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Entity;

    #[test]
    fn reads_existing_property() {
        let person = Entity::new("Person").with("firstName", "Norbert");
        let accessor = PropertyAccessor::new();

        let value = accessor.get_value(&person.as_value(), "firstName").unwrap();
        assert_eq!(value, Value::from("Norbert"));
    }

    #[test]
    fn writes_existing_property() {
        let person = Entity::new("Person").with("firstName", "Norbert");
        let accessor = PropertyAccessor::new();

        accessor
            .set_value(&person.as_value(), "firstName", Value::from("Michal"))
            .unwrap();
        assert_eq!(person.get("firstName"), Some(Value::from("Michal")));
    }

    #[test]
    fn missing_property_is_not_found() {
        let person = Entity::new("Person").with("firstName", "Norbert");
        let accessor = PropertyAccessor::new();

        let err = accessor
            .get_value(&person.as_value(), "title")
            .unwrap_err();
        assert!(matches!(
            err,
            UowError::PropertyNotFound { property, class }
                if property == "title" && class == "Person"
        ));
    }

    #[test]
    fn non_object_is_invalid_argument() {
        let accessor = PropertyAccessor::new();

        let err = accessor
            .get_value(&Value::from("fake entity"), "firstName")
            .unwrap_err();
        assert!(err.to_string().contains("\"string\" passed"));
    }
}
