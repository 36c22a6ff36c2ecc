//! Shell instantiation
//!
//! [`Instantiator`] materializes empty instances of registered types. The
//! primary path allocates the shell directly with zero-initialized slots,
//! bypassing any registered constructor; when that capability is switched
//! off it degrades to the registered default constructor.

use crate::error::InstantiateError;
use crate::registry::TypeRegistry;
use mimic_value::{ObjectRef, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

// Global capability probe, evaluated once per process. The environment
// flag exists so deployments can force the constructor-based path.
static RAW_ALLOCATION: Lazy<bool> =
    Lazy::new(|| std::env::var_os("MIMIC_NO_RAW_ALLOC").is_none());

/// Whether the raw (constructor-bypassing) allocation path is available
/// in this process
#[inline]
#[must_use]
pub fn raw_allocation_available() -> bool {
    *RAW_ALLOCATION
}

/// Allocates empty shells for registered types
///
/// One instantiator is shared per engine; it holds no per-call state.
#[derive(Debug, Clone)]
pub struct Instantiator {
    registry: Arc<TypeRegistry>,
    raw_allocation: bool,
}

impl Instantiator {
    /// Create an instantiator using the process-wide capability probe
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            raw_allocation: raw_allocation_available(),
        }
    }

    /// Override the raw-allocation capability (configuration surface)
    #[inline]
    #[must_use]
    pub fn with_raw_allocation(mut self, enabled: bool) -> Self {
        self.raw_allocation = enabled;
        self
    }

    /// Whether this instantiator uses the raw path
    #[inline]
    #[must_use]
    pub fn raw_allocation(&self) -> bool {
        self.raw_allocation
    }

    /// Allocate a shell of the given type
    ///
    /// Raw path: zero-initialized slots, no constructor runs. Fallback
    /// path: the registered default constructor, which must return an
    /// object of the requested type with the full slot count.
    ///
    /// # Errors
    /// Fails for unregistered, abstract, or enum types; on the fallback
    /// path also when no constructor is registered or the constructor
    /// misbehaves.
    pub fn allocate(&self, type_name: &str) -> Result<ObjectRef, InstantiateError> {
        let descriptor =
            self.registry
                .get(type_name)
                .ok_or_else(|| InstantiateError::UnknownType {
                    name: type_name.to_string(),
                })?;

        if !descriptor.is_instantiable() || descriptor.is_enum() {
            return Err(InstantiateError::NotInstantiable {
                name: type_name.to_string(),
            });
        }

        let model = self.registry.access_model(type_name).map_err(|_| {
            InstantiateError::UnknownType {
                name: type_name.to_string(),
            }
        })?;

        if self.raw_allocation {
            return Ok(ObjectRef::new(descriptor.name().clone(), model.new_slots()));
        }

        let constructor =
            self.registry
                .constructor(type_name)
                .ok_or_else(|| InstantiateError::NoConstructor {
                    name: type_name.to_string(),
                })?;

        let value = constructor().map_err(|source| InstantiateError::Constructor {
            name: type_name.to_string(),
            source,
        })?;

        match value {
            Value::Object(obj)
                if obj.type_name() == *descriptor.name() && obj.field_count() == model.len() =>
            {
                Ok(obj)
            }
            _ => Err(InstantiateError::InvalidConstructorResult {
                name: type_name.to_string(),
            }),
        }
    }
}
