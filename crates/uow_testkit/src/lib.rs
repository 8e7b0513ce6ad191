//! # uow_testkit
//!
//! Shared fixtures, command-bus test doubles and proptest generators for
//! exercising the unit-of-work engine. The cross-component integration
//! suite lives in this crate's `tests/` directory.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bus;
mod fixtures;
mod generators;

pub use bus::{FailingBus, RecordingBus};
pub use fixtures::{address, item, order, person, store_definitions};
pub use generators::{arbitrary_person, arbitrary_scalar};
