//! Error types for the unit-of-work engine.

use thiserror::Error;

/// Result type for unit-of-work operations.
pub type UowResult<T> = Result<T, UowError>;

/// Errors that can occur in unit-of-work operations.
///
/// All errors are raised synchronously at the point of detection and
/// propagate unchanged to the caller; the engine performs no retries and no
/// silent recovery. The only recovery mechanism is an explicit rollback.
#[derive(Debug, Error)]
pub enum UowError {
    /// A value of the wrong runtime kind was passed where an object or a
    /// comparable entity was required.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// A declared or requested property does not exist on the entity class.
    #[error("property \"{property}\" does not exist in \"{class}\" class")]
    PropertyNotFound {
        /// Name of the missing property.
        property: String,
        /// Class of the entity that was inspected.
        class: String,
    },

    /// No entity definition is registered for a class.
    #[error("there is no definition for \"{class}\" entities")]
    MissingDefinition {
        /// Class that has no definition.
        class: String,
    },

    /// A to-many association property received a value that is not a
    /// traversable collection.
    #[error(
        "property \"{property}\" is marked as associated with many entities \
         and requires a traversable collection as a value"
    )]
    NotTraversable {
        /// Name of the to-many property.
        property: String,
    },

    /// An associated value is not an instance of the declared target class.
    #[error("property \"{property}\" expects an instance of \"{expected}\" as a value")]
    AssociationMismatch {
        /// Name of the association property.
        property: String,
        /// Declared target class of the association.
        expected: String,
    },

    /// A single-property change was requested for identical values.
    ///
    /// Reaching this error through the single-property path signals a caller
    /// bug: `build_change` must only be invoked after `is_different`
    /// confirmed a difference.
    #[error("there are no differences between object properties")]
    NoDifference,

    /// An entity was classified or committed before being registered.
    #[error("object needs to be registered in the unit of work first")]
    NotRegistered,

    /// Domain rule violation.
    #[error("runtime error: {message}")]
    Runtime {
        /// Description of the violation.
        message: String,
    },
}

impl UowError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a property not found error.
    pub fn property_not_found(property: impl Into<String>, class: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            property: property.into(),
            class: class.into(),
        }
    }

    /// Creates a missing definition error.
    pub fn missing_definition(class: impl Into<String>) -> Self {
        Self::MissingDefinition {
            class: class.into(),
        }
    }

    /// Creates a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}
