//! Value and entity comparison.

use crate::entity::definition::{Definitions, Property};
use crate::error::{UowError, UowResult};
use crate::object::{Entity, ObjectToken, PropertyAccess, PropertyAccessor};
use crate::value::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Determines whether a named property differs between two entity
/// instances of the same class.
///
/// This is the atomic building block both the equality [`Comparer`] and the
/// change builder rely on.
pub trait ValueComparer {
    /// Checks whether `property` holds different values on the two objects.
    ///
    /// # Errors
    ///
    /// Returns an argument error when either value is not an object or when
    /// the two are not instances of the same class, and a not-found error
    /// when the property does not exist.
    fn has_different_value(
        &self,
        property: &Property,
        first: &Value,
        second: &Value,
    ) -> UowResult<bool>;
}

/// Default comparer performing deep structural equality.
///
/// Scalars compare by value, entities by class plus all properties
/// recursively, arrays element-wise. A visited-pair guard treats re-entered
/// entity pairs as equal, so cyclic graphs terminate.
pub struct DeepValueComparer {
    accessor: Box<dyn PropertyAccess>,
}

impl DeepValueComparer {
    /// Creates a comparer with the default property accessor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accessor: Box::new(PropertyAccessor::new()),
        }
    }

    /// Creates a comparer with an explicit property accessor.
    #[must_use]
    pub fn with_accessor(accessor: Box<dyn PropertyAccess>) -> Self {
        Self { accessor }
    }

    fn validate(&self, first: &Value, second: &Value) -> UowResult<()> {
        let (Some(a), Some(b)) = (first.as_entity(), second.as_entity()) else {
            return Err(UowError::invalid_argument(
                "compared values need to be valid objects",
            ));
        };
        if a.class() != b.class() {
            return Err(UowError::invalid_argument(
                "compared values need to be instances of the same class",
            ));
        }
        Ok(())
    }
}

impl Default for DeepValueComparer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueComparer for DeepValueComparer {
    fn has_different_value(
        &self,
        property: &Property,
        first: &Value,
        second: &Value,
    ) -> UowResult<bool> {
        self.validate(first, second)?;

        let first_value = self.accessor.get_value(first, property.name())?;
        let second_value = self.accessor.get_value(second, property.name())?;

        let mut visiting = HashSet::new();
        Ok(!deep_equals(&first_value, &second_value, &mut visiting))
    }
}

/// Deep structural equality over dynamic values.
pub(crate) fn deep_equals(
    first: &Value,
    second: &Value,
    visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
) -> bool {
    match (first, second) {
        (Value::Entity(a), Value::Entity(b)) => entities_equal(a, b, visiting),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| deep_equals(x, y, visiting))
        }
        _ => first == second,
    }
}

fn entities_equal(
    a: &Entity,
    b: &Entity,
    visiting: &mut HashSet<(ObjectToken, ObjectToken)>,
) -> bool {
    if a.token() == b.token() {
        return true;
    }
    if a.class() != b.class() {
        return false;
    }
    // Re-entering a pair already under comparison means the structures agree
    // up to the cycle; treat the back edge as equal.
    if !visiting.insert((a.token(), b.token())) {
        return true;
    }
    visiting.insert((b.token(), a.token()));

    let first = a.properties();
    let second = b.properties();
    if first.len() != second.len() {
        return false;
    }
    first.iter().all(|(name, value)| {
        second
            .get(name)
            .is_some_and(|other| deep_equals(value, other, visiting))
    })
}

/// Coarse-grained entity equality over all observed properties.
///
/// Used by the orchestrator to classify edited vs. unchanged entities
/// without building a full change set; returns `false` as soon as any
/// observed property differs.
pub struct Comparer {
    definitions: Arc<Definitions>,
    value_comparer: Box<dyn ValueComparer>,
}

impl Comparer {
    /// Creates a comparer with the default deep value comparer.
    #[must_use]
    pub fn new(definitions: Arc<Definitions>) -> Self {
        Self::with_value_comparer(definitions, Box::new(DeepValueComparer::new()))
    }

    /// Creates a comparer with an explicit value comparer.
    #[must_use]
    pub fn with_value_comparer(
        definitions: Arc<Definitions>,
        value_comparer: Box<dyn ValueComparer>,
    ) -> Self {
        Self {
            definitions,
            value_comparer,
        }
    }

    /// Checks whether two entity states are equal on every observed
    /// property.
    ///
    /// # Errors
    ///
    /// Returns an argument error when the two values do not share a
    /// compatible entity definition.
    pub fn are_equal(&self, first: &Value, second: &Value) -> UowResult<bool> {
        let (Some(a), Some(b)) = (first.as_entity(), second.as_entity()) else {
            return Err(UowError::invalid_argument(
                "compared values need to be valid objects",
            ));
        };

        let definition = self.definitions.get(a)?;
        if !definition.fits(b) {
            return Err(UowError::invalid_argument(
                "you can't compare entities of different type",
            ));
        }

        for property in definition.observed_properties() {
            if self
                .value_comparer
                .has_different_value(property, first, second)?
            {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::definition::{Association, Definition};

    fn person_definitions() -> Arc<Definitions> {
        Arc::new(
            [
                Definition::new("Person", "id")
                    .observe(Property::new("firstName"))
                    .observe(Property::associated(
                        "address",
                        Association::to_single("Address"),
                    )),
                Definition::new("Address", "id").observe(Property::new("city")),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn person(first_name: &str) -> Entity {
        Entity::new("Person")
            .with("id", 1i64)
            .with("firstName", first_name)
            .with("address", Value::Null)
    }

    #[test]
    fn identical_property_is_not_different() {
        let comparer = DeepValueComparer::new();
        let a = person("Norbert");
        let b = person("Norbert");

        let different = comparer
            .has_different_value(&Property::new("firstName"), &a.as_value(), &b.as_value())
            .unwrap();
        assert!(!different);
    }

    #[test]
    fn changed_property_is_different() {
        let comparer = DeepValueComparer::new();
        let a = person("Norbert");
        let b = person("Michal");

        let different = comparer
            .has_different_value(&Property::new("firstName"), &a.as_value(), &b.as_value())
            .unwrap();
        assert!(different);
    }

    #[test]
    fn non_object_argument_fails() {
        let comparer = DeepValueComparer::new();
        let person = person("Norbert");

        let err = comparer
            .has_different_value(
                &Property::new("firstName"),
                &Value::from("fake entity"),
                &person.as_value(),
            )
            .unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));

        let err = comparer
            .has_different_value(
                &Property::new("firstName"),
                &person.as_value(),
                &Value::from("fake entity"),
            )
            .unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));
    }

    #[test]
    fn different_classes_fail() {
        let comparer = DeepValueComparer::new();
        let err = comparer
            .has_different_value(
                &Property::new("firstName"),
                &Entity::new("Person").as_value(),
                &Entity::new("Address").as_value(),
            )
            .unwrap_err();
        assert!(matches!(err, UowError::InvalidArgument { .. }));
    }

    #[test]
    fn missing_property_fails() {
        let comparer = DeepValueComparer::new();
        let a = person("Norbert");
        let b = person("Norbert");

        let err = comparer
            .has_different_value(&Property::new("title"), &a.as_value(), &b.as_value())
            .unwrap_err();
        assert!(matches!(err, UowError::PropertyNotFound { .. }));
    }

    #[test]
    fn nested_entities_compare_structurally() {
        let comparer = DeepValueComparer::new();
        let a = person("Norbert");
        a.set("address", Entity::new("Address").with("city", "Warsaw"));
        let b = person("Norbert");
        b.set("address", Entity::new("Address").with("city", "Warsaw"));

        let different = comparer
            .has_different_value(&Property::new("address"), &a.as_value(), &b.as_value())
            .unwrap();
        assert!(!different);

        b.get("address")
            .and_then(|v| v.as_entity().cloned())
            .unwrap()
            .set("city", "Krakow");
        let different = comparer
            .has_different_value(&Property::new("address"), &a.as_value(), &b.as_value())
            .unwrap();
        assert!(different);
    }

    #[test]
    fn cyclic_graphs_terminate() {
        let comparer = DeepValueComparer::new();
        let a = Entity::new("Node").with("value", 1i64);
        let a_next = Entity::new("Node").with("value", 2i64).with("next", a.clone());
        a.set("next", a_next);

        let b = Entity::new("Node").with("value", 1i64);
        let b_next = Entity::new("Node").with("value", 2i64).with("next", b.clone());
        b.set("next", b_next);

        let different = comparer
            .has_different_value(&Property::new("next"), &a.as_value(), &b.as_value())
            .unwrap();
        assert!(!different);
    }

    #[test]
    fn are_equal_short_circuits_on_observed_difference() {
        let comparer = Comparer::new(person_definitions());
        let a = person("Norbert");
        let b = person("Michal");

        assert!(!comparer.are_equal(&a.as_value(), &b.as_value()).unwrap());
        assert!(comparer.are_equal(&a.as_value(), &a.as_value()).unwrap());
    }

    #[test]
    fn are_equal_is_symmetric() {
        let comparer = Comparer::new(person_definitions());
        let a = person("Norbert");
        let b = person("Michal");

        assert_eq!(
            comparer.are_equal(&a.as_value(), &b.as_value()).unwrap(),
            comparer.are_equal(&b.as_value(), &a.as_value()).unwrap()
        );
    }

    #[test]
    fn are_equal_rejects_incompatible_definitions() {
        let comparer = Comparer::new(person_definitions());
        let person = person("Norbert");
        let address = Entity::new("Address").with("id", 1i64).with("city", "Warsaw");

        for (first, second) in [(&person, &address), (&address, &person)] {
            let err = comparer
                .are_equal(&first.as_value(), &second.as_value())
                .unwrap_err();
            assert!(matches!(err, UowError::InvalidArgument { .. }));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::Integer),
                "[a-z]{0,8}".prop_map(Value::Text),
            ]
        }

        proptest! {
            #[test]
            fn deep_equality_is_reflexive_and_symmetric(
                a in proptest::collection::vec(scalar(), 0..6),
                b in proptest::collection::vec(scalar(), 0..6),
            ) {
                let a = Value::Array(a);
                let b = Value::Array(b);
                prop_assert!(deep_equals(&a, &a, &mut HashSet::new()));
                prop_assert_eq!(
                    deep_equals(&a, &b, &mut HashSet::new()),
                    deep_equals(&b, &a, &mut HashSet::new())
                );
            }
        }
    }

    #[test]
    fn are_equal_ignores_unobserved_properties() {
        let comparer = Comparer::new(person_definitions());
        let a = person("Norbert").with("nickname", "norzech");
        let b = person("Norbert").with("nickname", "other");

        assert!(comparer.are_equal(&a.as_value(), &b.as_value()).unwrap());
    }
}
