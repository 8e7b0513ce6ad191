//! Entity fixtures: a small store domain (people, addresses, orders,
//! items) with definitions covering scalars, to-one and to-many
//! associations.

use std::sync::Arc;
use uow_core::{Association, Definition, Definitions, Entity, Property, Value};

/// Definitions for the store domain:
///
/// - `Person` observes `firstName`, `lastName` and a to-one `address`
/// - `Address` observes `street` and `city`
/// - `Order` observes `note`, a to-one `customer` and a to-many `items`
/// - `Item` observes `name` and `quantity`
#[must_use]
pub fn store_definitions() -> Arc<Definitions> {
    Arc::new(
        [
            Definition::new("Person", "id")
                .observe(Property::new("firstName"))
                .observe(Property::new("lastName"))
                .observe(Property::associated(
                    "address",
                    Association::to_single("Address"),
                )),
            Definition::new("Address", "id")
                .observe(Property::new("street"))
                .observe(Property::new("city")),
            Definition::new("Order", "id")
                .observe(Property::new("note"))
                .observe(Property::associated(
                    "customer",
                    Association::to_single("Person"),
                ))
                .observe(Property::associated("items", Association::to_many("Item"))),
            Definition::new("Item", "id")
                .observe(Property::new("name"))
                .observe(Property::new("quantity")),
        ]
        .into_iter()
        .collect(),
    )
}

/// Creates a person. Pass `Value::Null` as `id` for an unpersisted one.
#[must_use]
pub fn person(id: impl Into<Value>, first_name: &str, last_name: &str) -> Entity {
    Entity::new("Person")
        .with("id", id)
        .with("firstName", first_name)
        .with("lastName", last_name)
        .with("address", Value::Null)
}

/// Creates an address.
#[must_use]
pub fn address(id: impl Into<Value>, street: &str, city: &str) -> Entity {
    Entity::new("Address")
        .with("id", id)
        .with("street", street)
        .with("city", city)
}

/// Creates an order with no customer and an empty item collection.
#[must_use]
pub fn order(id: impl Into<Value>, note: &str) -> Entity {
    Entity::new("Order")
        .with("id", id)
        .with("note", note)
        .with("customer", Value::Null)
        .with("items", Value::Array(vec![]))
}

/// Creates an item.
#[must_use]
pub fn item(id: impl Into<Value>, name: &str, quantity: i64) -> Entity {
    Entity::new("Item")
        .with("id", id)
        .with("name", name)
        .with("quantity", quantity)
}
