//! Proptest generators for dynamic values and entities.

use proptest::prelude::*;
use uow_core::{Entity, Value};

/// Strategy producing arbitrary scalar values (no entities, no arrays).
pub fn arbitrary_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

/// Strategy producing persisted `Person` entities compatible with
/// [`crate::store_definitions`].
pub fn arbitrary_person() -> impl Strategy<Value = Entity> {
    (1i64..1_000_000, "[A-Z][a-z]{1,10}", "[A-Z][a-z]{1,10}").prop_map(
        |(id, first_name, last_name)| {
            crate::fixtures::person(id, &first_name, &last_name)
        },
    )
}
