//! Error types for the type registry
//!
//! Three taxonomies, one per concern: registration ([`RegistryError`]),
//! field access ([`AccessError`]), and instantiation
//! ([`InstantiateError`]).

use std::sync::Arc;

/// Registration and lookup failures
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Type name is empty
    #[error("type name must not be empty")]
    EmptyName,

    /// Type already registered
    #[error("type `{name}` is already registered")]
    DuplicateType {
        /// Offending type name
        name: String,
    },

    /// Referenced type is not registered
    #[error("type `{name}` is not registered")]
    UnknownType {
        /// Missing type name
        name: String,
    },

    /// Declared parent is not registered
    #[error("type `{name}` declares unknown parent `{parent}`")]
    UnknownParent {
        /// Declaring type
        name: String,
        /// Missing parent name
        parent: String,
    },

    /// Parent is an enum type
    #[error("type `{name}` cannot extend enum type `{parent}`")]
    EnumParent {
        /// Declaring type
        name: String,
        /// Enum parent name
        parent: String,
    },

    /// Field name collides within the flattened inheritance chain
    #[error("type `{type_name}` declares duplicate field `{field}`")]
    DuplicateField {
        /// Declaring type
        type_name: String,
        /// Colliding field name
        field: String,
    },

    /// Spec shape is invalid for the declared type class
    #[error("invalid spec for `{name}`: {reason}")]
    InvalidSpec {
        /// Offending type name
        name: String,
        /// Human-readable reason
        reason: String,
    },
}

/// Field access failures
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No field with this name
    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField {
        /// Accessed type
        type_name: Arc<str>,
        /// Missing field name
        field: String,
    },

    /// Slot index beyond the model's field count
    #[error("slot {slot} out of range for type `{type_name}`")]
    SlotOutOfRange {
        /// Accessed type
        type_name: Arc<str>,
        /// Offending slot index
        slot: usize,
    },

    /// Instance belongs to a different type than the model
    #[error("access model for `{expected}` applied to instance of `{actual}`")]
    TypeMismatch {
        /// Model's type
        expected: Arc<str>,
        /// Instance's type
        actual: Arc<str>,
    },
}

/// Shell allocation failures
#[derive(Debug, thiserror::Error)]
pub enum InstantiateError {
    /// Target type is not registered
    #[error("cannot instantiate unregistered type `{name}`")]
    UnknownType {
        /// Missing type name
        name: String,
    },

    /// Target type is abstract, an interface analog, or an enum
    #[error("type `{name}` is not instantiable")]
    NotInstantiable {
        /// Offending type name
        name: String,
    },

    /// Raw allocation unavailable and no default constructor registered
    #[error("type `{name}` has no usable constructor and raw allocation is unavailable")]
    NoConstructor {
        /// Offending type name
        name: String,
    },

    /// Registered default constructor failed
    #[error("default constructor for `{name}` failed")]
    Constructor {
        /// Offending type name
        name: String,
        /// Underlying failure
        #[source]
        source: crate::BoxError,
    },

    /// Constructor returned a value of the wrong shape or type
    #[error("default constructor for `{name}` returned an invalid instance")]
    InvalidConstructorResult {
        /// Offending type name
        name: String,
    },
}
