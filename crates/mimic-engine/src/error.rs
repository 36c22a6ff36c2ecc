//! Error types for the clone engine
//!
//! Every failure aborts the entire top-level clone call; callers receive
//! either a fully formed deep clone or one of these errors, never a
//! half-populated graph. Field-level failures are annotated with the
//! field name and declaring type on the way up.

use mimic_registry::{AccessError, BoxError, InstantiateError, RegistryError};
use std::sync::Arc;

/// Main clone engine error type
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Shell allocation failed
    #[error("instantiation failed: {0}")]
    Instantiation(#[from] InstantiateError),

    /// A registered implementor's signature does not meet its contract
    #[error("invalid implementor registration for `{type_name}`: {reason}")]
    Configuration {
        /// Bound type of the offending registration
        type_name: String,
        /// What the contract violation is
        reason: String,
    },

    /// Attempted clone of a policy-excluded type without a retain override
    #[error("type `{0}` is excluded from cloning by policy")]
    Policy(Arc<str>),

    /// Graph recursion exceeded the configured maximum depth
    #[error("clone recursion exceeded maximum depth {0}")]
    DepthExceeded(usize),

    /// The no-clone sentinel was invoked (a defect in the calling driver)
    #[error("type `{0}` declares no clone capability")]
    Unsupported(Arc<str>),

    /// Encountered an object of an unregistered type
    #[error("type `{0}` is not registered")]
    UnknownType(Arc<str>),

    /// Registry lookup failed
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Field access failed
    #[error("field access error: {0}")]
    Access(#[from] AccessError),

    /// Clone of a field value failed; carries the field path context
    #[error("clone of `{type_name}` failed at field `{field}`")]
    Field {
        /// Declaring type of the field
        type_name: Arc<str>,
        /// Field name
        field: Arc<str>,
        /// Underlying failure
        #[source]
        source: Box<CloneError>,
    },

    /// A user-supplied constructor or factory failed with a foreign error
    #[error("implementor for `{type_name}` failed: {source}")]
    Implementor {
        /// Bound type of the implementor
        type_name: Arc<str>,
        /// Underlying failure
        #[source]
        source: BoxError,
    },
}

impl CloneError {
    /// Wrap a user-closure failure
    ///
    /// A failure that is itself a `CloneError` is propagated unwrapped so
    /// callers can pattern-match on it; anything else is wrapped with the
    /// offending type.
    pub(crate) fn from_user(type_name: &Arc<str>, err: BoxError) -> Self {
        match err.downcast::<CloneError>() {
            Ok(own) => *own,
            Err(foreign) => Self::Implementor {
                type_name: type_name.clone(),
                source: foreign,
            },
        }
    }

    /// Annotate this error with the field it occurred at
    #[must_use]
    pub(crate) fn at_field(self, type_name: &Arc<str>, field: &Arc<str>) -> Self {
        Self::Field {
            type_name: type_name.clone(),
            field: field.clone(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_clone_error_propagates_unwrapped() {
        let type_name: Arc<str> = "t.T".into();
        let inner: BoxError = Box::new(CloneError::Policy("t.Secret".into()));

        let err = CloneError::from_user(&type_name, inner);
        assert!(matches!(err, CloneError::Policy(ref t) if t.as_ref() == "t.Secret"));
    }

    #[test]
    fn foreign_error_wrapped_with_type() {
        let type_name: Arc<str> = "t.T".into();
        let inner: BoxError = "disk on fire".into();

        let err = CloneError::from_user(&type_name, inner);
        assert!(matches!(
            err,
            CloneError::Implementor { ref type_name, .. } if type_name.as_ref() == "t.T"
        ));
    }

    #[test]
    fn field_annotation_nests() {
        let base = CloneError::DepthExceeded(4);
        let annotated = base.at_field(&Arc::from("t.Outer"), &Arc::from("child"));

        let rendered = annotated.to_string();
        assert!(rendered.contains("t.Outer"));
        assert!(rendered.contains("child"));

        let CloneError::Field { source, .. } = annotated else {
            panic!("expected field annotation");
        };
        assert!(matches!(*source, CloneError::DepthExceeded(4)));
    }
}
